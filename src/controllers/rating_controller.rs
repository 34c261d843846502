use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ServiceError;
use crate::models::RatingDto;
use crate::store::PageRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RateManyParams {
    customers: String,
}

fn check_score(score: i32) -> Result<(), ServiceError> {
    if (1..=5).contains(&score) {
        Ok(())
    } else {
        Err(ServiceError::Validation(
            "score must be between 1 and 5".to_string(),
        ))
    }
}

/// Parse the comma-separated `customers` query parameter.
fn parse_customers(raw: &str) -> Result<Vec<i32>, ServiceError> {
    let customers = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| ServiceError::Validation(format!("invalid customer id: {s}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if customers.is_empty() {
        return Err(ServiceError::Validation(
            "customers must not be empty".to_string(),
        ));
    }
    Ok(customers)
}

#[post("/tours/{tour_id}/ratings")]
pub async fn create_rating(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<RatingDto>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("POST /tours/{}/ratings", tour_id);

    let dto = body.into_inner();
    let score = dto
        .score
        .ok_or_else(|| ServiceError::Validation("score is required".to_string()))?;
    check_score(score)?;

    state
        .rating_service
        .create_rating(tour_id, dto.customer_id, score, dto.comment.as_deref())
        .await?;
    Ok(HttpResponse::Created().finish())
}

#[post("/tours/{tour_id}/ratings/{score}")]
pub async fn create_many_ratings(
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
    query: web::Query<RateManyParams>,
) -> Result<HttpResponse, ServiceError> {
    let (tour_id, score) = path.into_inner();
    log::info!("POST /tours/{}/ratings/{}", tour_id, score);

    check_score(score)?;
    let customers = parse_customers(&query.customers)?;

    state
        .rating_service
        .rate_many(tour_id, score, &customers)
        .await?;
    Ok(HttpResponse::Created().finish())
}

#[get("/tours/{tour_id}/ratings")]
pub async fn get_ratings(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    query: web::Query<PageRequest>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("GET /tours/{}/ratings", tour_id);

    let page = state
        .rating_service
        .ratings_page(tour_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "ratings": page.items,
        "pagination": page.pagination,
    })))
}

#[get("/tours/{tour_id}/ratings/average")]
pub async fn get_average(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("GET /tours/{}/ratings/average", tour_id);

    let average = state.rating_service.average_score(tour_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "average": average })))
}

#[put("/tours/{tour_id}/ratings")]
pub async fn update_rating(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<RatingDto>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("PUT /tours/{}/ratings", tour_id);

    let dto = body.into_inner();
    if let Some(score) = dto.score {
        check_score(score)?;
    }
    let rating = state
        .rating_service
        .find_rating(tour_id, dto.customer_id)
        .await?;
    let updated = state.rating_service.update(rating, &dto).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[patch("/tours/{tour_id}/ratings")]
pub async fn patch_rating(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<RatingDto>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("PATCH /tours/{}/ratings", tour_id);

    let dto = body.into_inner();
    if let Some(score) = dto.score {
        check_score(score)?;
    }
    let rating = state
        .rating_service
        .find_rating(tour_id, dto.customer_id)
        .await?;
    let updated = state.rating_service.update_with_patch(rating, &dto).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/tours/{tour_id}/ratings/{customer_id}")]
pub async fn delete_rating(
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (tour_id, customer_id) = path.into_inner();
    log::info!("DELETE /tours/{}/ratings/{}", tour_id, customer_id);

    let rating = state
        .rating_service
        .find_rating(tour_id, customer_id)
        .await?;
    state.rating_service.delete(rating, customer_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
