pub mod controllers;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

use std::sync::Arc;

use service::TourRatingService;
use store::TourStore;

/// Shared per-worker application state handed to every controller.
#[derive(Clone)]
pub struct AppState {
    pub rating_service: TourRatingService,
    pub tour_store: Arc<dyn TourStore>,
}
