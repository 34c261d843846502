use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::JsonConfig;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;

use tour_booking_backend::controllers;
use tour_booking_backend::db;
use tour_booking_backend::service::TourRatingService;
use tour_booking_backend::store::mysql::{MySqlRatingStore, MySqlTourStore};
use tour_booking_backend::store::{RatingStore, TourStore};
use tour_booking_backend::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("starting up...");

    let pool = match db::establish_connection().await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("failed to initialise database pool: {:?}", e);
            std::process::exit(1);
        }
    };

    let tour_store: Arc<dyn TourStore> = Arc::new(MySqlTourStore::new(pool.clone()));
    let rating_store: Arc<dyn RatingStore> = Arc::new(MySqlRatingStore::new(pool));
    let state = AppState {
        rating_service: TourRatingService::new(tour_store.clone(), rating_store),
        tour_store,
    };

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    log::info!("listening on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .supports_credentials()
            .max_age(3600);

        let json_config = JsonConfig::default().error_handler(|err, _req| {
            log::error!("JSON payload error: {}", err);
            actix_web::error::ErrorBadRequest(format!("Payload error: {}", err))
        });

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(controllers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
