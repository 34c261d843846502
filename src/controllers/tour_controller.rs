use actix_web::{get, web, HttpResponse};
use serde_json::json;

use crate::error::ServiceError;
use crate::store::PageRequest;
use crate::AppState;

#[get("/tours")]
pub async fn get_tours(
    state: web::Data<AppState>,
    query: web::Query<PageRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /tours");

    let page = state
        .tour_store
        .find_all(query.into_inner())
        .await
        .map_err(ServiceError::from)?;
    Ok(HttpResponse::Ok().json(json!({
        "tours": page.items,
        "pagination": page.pagination,
    })))
}

#[get("/tours/{tour_id}")]
pub async fn get_tour(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let tour_id = path.into_inner();
    log::info!("GET /tours/{}", tour_id);

    let tour = state.rating_service.verify_tour(tour_id).await?;
    Ok(HttpResponse::Ok().json(tour))
}
