pub mod rating;
pub mod tour;

pub use rating::{score_to_default_comment, RatingDto, TourRating};
pub use tour::{Difficulty, Region, Tour, TourPackage};
