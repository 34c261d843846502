pub mod rating_controller;
pub mod tour_controller;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(rating_controller::create_rating)
        .service(rating_controller::create_many_ratings)
        .service(rating_controller::get_ratings)
        .service(rating_controller::get_average)
        .service(rating_controller::update_rating)
        .service(rating_controller::patch_rating)
        .service(rating_controller::delete_rating)
        .service(tour_controller::get_tours)
        .service(tour_controller::get_tour);
}
