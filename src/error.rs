use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::store::StoreError;

/// Domain error taxonomy surfaced by the rating service. The service never
/// maps these to HTTP itself; the `ResponseError` impl below is the single
/// place status codes are decided.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Tour does not exist: {0}")]
    TourNotFound(i32),

    #[error("no rating for tour {tour_id} by customer {customer_id}")]
    RatingNotFound { tour_id: i32, customer_id: i32 },

    #[error("customer {customer_id} has already rated tour {tour_id}")]
    DuplicateRating { tour_id: i32, customer_id: i32 },

    #[error("Tour has no Ratings: {0}")]
    NoRatings(i32),

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate {
                tour_id,
                customer_id,
            } => ServiceError::DuplicateRating {
                tour_id,
                customer_id,
            },
            other => ServiceError::Storage(other),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::TourNotFound(_)
            | ServiceError::RatingNotFound { .. }
            | ServiceError::NoRatings(_) => StatusCode::NOT_FOUND,
            ServiceError::DuplicateRating { .. } => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Storage(err) => {
                log::error!("unable to complete request: {:?}", err);
                HttpResponse::InternalServerError().body("internal server error")
            }
            other => HttpResponse::build(other.status_code()).body(other.to_string()),
        }
    }
}
