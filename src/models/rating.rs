use serde::{Deserialize, Serialize};

use crate::models::tour::Tour;

/// Comment applied when a rating is created without one. Total over all
/// scores: the five star buckets have fixed strings, anything else falls
/// back to the decimal form of the score.
pub fn score_to_default_comment(score: i32) -> String {
    match score {
        1 => "Terrible".to_string(),
        2 => "Poor".to_string(),
        3 => "Fair".to_string(),
        4 => "Good".to_string(),
        5 => "Great".to_string(),
        other => other.to_string(),
    }
}

/// A customer's score and comment for one tour. At most one rating may
/// exist per (tour, customer) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRating {
    pub id: i32,
    pub tour: Tour,
    pub customer_id: i32,
    pub score: i32,
    pub comment: String,
}

impl TourRating {
    /// Build a not-yet-persisted rating (`id` 0 until the store assigns
    /// one). A missing comment is derived from the score.
    pub fn new(tour: Tour, customer_id: i32, score: i32, comment: Option<&str>) -> Self {
        let comment = match comment {
            Some(text) => text.to_string(),
            None => score_to_default_comment(score),
        };
        TourRating {
            id: 0,
            tour,
            customer_id,
            score,
            comment,
        }
    }
}

/// Wire projection of a rating: no rating id, no tour id (the tour rides on
/// the URL path). Serves as both request and response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub customer_id: i32,
}

impl From<&TourRating> for RatingDto {
    fn from(rating: &TourRating) -> Self {
        RatingDto {
            score: Some(rating.score),
            comment: Some(rating.comment.clone()),
            customer_id: rating.customer_id,
        }
    }
}
