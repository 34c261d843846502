use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::{RatingDto, Tour, TourRating};
use crate::store::{Page, PageRequest, RatingStore, TourStore};

/// Business logic for creating, validating, updating, deleting and
/// summarizing tour ratings. Owns every rating invariant that is not a
/// database constraint; holds no state beyond the stores it delegates to.
#[derive(Clone)]
pub struct TourRatingService {
    tour_store: Arc<dyn TourStore>,
    rating_store: Arc<dyn RatingStore>,
}

impl TourRatingService {
    pub fn new(tour_store: Arc<dyn TourStore>, rating_store: Arc<dyn RatingStore>) -> Self {
        TourRatingService {
            tour_store,
            rating_store,
        }
    }

    /// Verify and return the tour for an id.
    pub async fn verify_tour(&self, tour_id: i32) -> Result<Tour, ServiceError> {
        self.tour_store
            .find_by_id(tour_id)
            .await?
            .ok_or(ServiceError::TourNotFound(tour_id))
    }

    /// Create one rating. A missing comment is derived from the score.
    pub async fn create_rating(
        &self,
        tour_id: i32,
        customer_id: i32,
        score: i32,
        comment: Option<&str>,
    ) -> Result<(), ServiceError> {
        log::info!("create rating for tour {} by customer {}", tour_id, customer_id);
        let tour = self.verify_tour(tour_id).await?;
        self.rating_store
            .save(TourRating::new(tour, customer_id, score, comment))
            .await?;
        Ok(())
    }

    /// Give the same score to a tour on behalf of many customers. The batch
    /// is persisted in one unit of work: a duplicate for any customer rolls
    /// back every insert.
    pub async fn rate_many(
        &self,
        tour_id: i32,
        score: i32,
        customers: &[i32],
    ) -> Result<(), ServiceError> {
        log::info!(
            "rate tour {} with score {} for customers {:?}",
            tour_id,
            score,
            customers
        );
        let tour = self.verify_tour(tour_id).await?;
        let ratings = customers
            .iter()
            .map(|&customer_id| TourRating::new(tour.clone(), customer_id, score, None))
            .collect();
        self.rating_store.save_all(ratings).await?;
        Ok(())
    }

    /// All ratings of a tour, in store order, as DTOs.
    pub async fn ratings_for_tour(&self, tour_id: i32) -> Result<Vec<RatingDto>, ServiceError> {
        log::info!("lookup ratings for tour {}", tour_id);
        let tour = self.verify_tour(tour_id).await?;
        let ratings = self.rating_store.find_by_tour_id(tour.id).await?;
        Ok(ratings.iter().map(RatingDto::from).collect())
    }

    /// One page of a tour's ratings; the page total reflects the unpaged
    /// result size.
    pub async fn ratings_page(
        &self,
        tour_id: i32,
        page: PageRequest,
    ) -> Result<Page<RatingDto>, ServiceError> {
        log::info!("lookup rating page for tour {}", tour_id);
        let tour = self.verify_tour(tour_id).await?;
        let ratings = self
            .rating_store
            .find_by_tour_id_paged(tour.id, page)
            .await?;
        Ok(ratings.map(|rating| RatingDto::from(&rating)))
    }

    /// Arithmetic mean of a tour's scores. A tour without ratings is an
    /// error, distinct from the tour itself being absent.
    pub async fn average_score(&self, tour_id: i32) -> Result<f64, ServiceError> {
        log::info!("average rating for tour {}", tour_id);
        let tour = self.verify_tour(tour_id).await?;
        let ratings = self.rating_store.find_by_tour_id(tour.id).await?;
        if ratings.is_empty() {
            return Err(ServiceError::NoRatings(tour_id));
        }
        let sum: i64 = ratings.iter().map(|r| i64::from(r.score)).sum();
        Ok(sum as f64 / ratings.len() as f64)
    }

    /// Verify and return the rating a customer gave a tour; the resolution
    /// step before update, patch and delete.
    pub async fn find_rating(
        &self,
        tour_id: i32,
        customer_id: i32,
    ) -> Result<TourRating, ServiceError> {
        self.rating_store
            .find_by_tour_and_customer(tour_id, customer_id)
            .await?
            .ok_or(ServiceError::RatingNotFound {
                tour_id,
                customer_id,
            })
    }

    pub async fn lookup_rating_by_id(&self, id: i32) -> Result<Option<TourRating>, ServiceError> {
        Ok(self.rating_store.find_by_id(id).await?)
    }

    /// Full replace: score and comment are both required and both
    /// overwritten.
    pub async fn update(
        &self,
        mut rating: TourRating,
        dto: &RatingDto,
    ) -> Result<RatingDto, ServiceError> {
        log::info!(
            "update rating for tour {} by customer {}",
            rating.tour.id,
            rating.customer_id
        );
        rating.score = dto
            .score
            .ok_or_else(|| ServiceError::Validation("score is required for a full update".into()))?;
        rating.comment = dto
            .comment
            .clone()
            .ok_or_else(|| ServiceError::Validation("comment is required for a full update".into()))?;
        let saved = self.rating_store.save(rating).await?;
        Ok(RatingDto::from(&saved))
    }

    /// Partial update: only the fields present in the DTO are overwritten.
    pub async fn update_with_patch(
        &self,
        mut rating: TourRating,
        dto: &RatingDto,
    ) -> Result<RatingDto, ServiceError> {
        log::info!(
            "patch rating for tour {} by customer {}",
            rating.tour.id,
            rating.customer_id
        );
        if let Some(score) = dto.score {
            rating.score = score;
        }
        if let Some(comment) = &dto.comment {
            rating.comment = comment.clone();
        }
        let saved = self.rating_store.save(rating).await?;
        Ok(RatingDto::from(&saved))
    }

    /// Delete a customer's rating. Fails closed when the caller-supplied
    /// customer id does not match the rating being deleted.
    pub async fn delete(&self, rating: TourRating, customer_id: i32) -> Result<(), ServiceError> {
        if rating.customer_id != customer_id {
            log::warn!(
                "refusing to delete rating {} owned by customer {} on behalf of customer {}",
                rating.id,
                rating.customer_id,
                customer_id
            );
            return Err(ServiceError::RatingNotFound {
                tour_id: rating.tour.id,
                customer_id,
            });
        }
        log::info!(
            "delete rating for tour {} by customer {}",
            rating.tour.id,
            customer_id
        );
        self.rating_store.delete(&rating).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Region, TourPackage};
    use crate::store::memory::{InMemoryRatingStore, InMemoryTourStore};

    const TOUR_ID: i32 = 1;
    const CUSTOMER_ID: i32 = 123;
    const NOT_A_TOUR_ID: i32 = 999;

    fn tour(id: i32) -> Tour {
        Tour {
            id,
            title: "Big Sur Retreat".to_string(),
            description: "description".to_string(),
            blurb: "blurb".to_string(),
            price: 750,
            duration: "3 days".to_string(),
            bullets: "bullets".to_string(),
            keywords: "keywords".to_string(),
            tour_package: TourPackage::new("BC", "Backpack Cal"),
            difficulty: Difficulty::Medium,
            region: Region::CentralCoast,
        }
    }

    fn service() -> TourRatingService {
        TourRatingService::new(
            Arc::new(InMemoryTourStore::with_tours(vec![tour(TOUR_ID)])),
            Arc::new(InMemoryRatingStore::new()),
        )
    }

    fn service_with_ratings() -> (TourRatingService, Arc<InMemoryRatingStore>) {
        let ratings = Arc::new(InMemoryRatingStore::new());
        let service = TourRatingService::new(
            Arc::new(InMemoryTourStore::with_tours(vec![tour(TOUR_ID)])),
            ratings.clone(),
        );
        (service, ratings)
    }

    #[actix_web::test]
    async fn created_rating_is_found_with_matching_fields() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 4, Some("nice"))
            .await
            .unwrap();

        let found = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(found.score, 4);
        assert_eq!(found.comment, "nice");
        assert_eq!(found.customer_id, CUSTOMER_ID);
        assert_eq!(found.tour.id, TOUR_ID);
    }

    #[actix_web::test]
    async fn create_defaults_comment_from_score() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 1, None)
            .await
            .unwrap();

        let found = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(found.comment, "Terrible");
    }

    #[actix_web::test]
    async fn create_for_unknown_tour_fails() {
        let svc = service();
        let err = svc
            .create_rating(NOT_A_TOUR_ID, CUSTOMER_ID, 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TourNotFound(NOT_A_TOUR_ID)));
    }

    #[actix_web::test]
    async fn second_create_for_same_pair_is_a_duplicate() {
        let (svc, ratings) = service_with_ratings();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, None)
            .await
            .unwrap();

        let err = svc
            .create_rating(TOUR_ID, CUSTOMER_ID, 3, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateRating { .. }));
        // failed create mutates nothing
        assert_eq!(ratings.count().await.unwrap(), 1);
        let kept = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(kept.score, 5);
    }

    #[actix_web::test]
    async fn average_of_two_and_four_is_three() {
        let svc = service();
        svc.create_rating(TOUR_ID, 100, 2, None).await.unwrap();
        svc.create_rating(TOUR_ID, 101, 4, None).await.unwrap();

        let average = svc.average_score(TOUR_ID).await.unwrap();
        assert_eq!(average, 3.0);
    }

    #[actix_web::test]
    async fn average_without_ratings_is_an_error_not_zero() {
        let svc = service();
        let err = svc.average_score(TOUR_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoRatings(TOUR_ID)));
    }

    #[actix_web::test]
    async fn average_distinguishes_missing_tour_from_unrated_tour() {
        let svc = service();
        let err = svc.average_score(NOT_A_TOUR_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::TourNotFound(NOT_A_TOUR_ID)));
    }

    #[actix_web::test]
    async fn rate_many_adds_one_default_rating_per_customer() {
        let (svc, ratings) = service_with_ratings();
        let before = ratings.count().await.unwrap();

        svc.rate_many(TOUR_ID, 5, &[100, 101, 102]).await.unwrap();

        assert_eq!(ratings.count().await.unwrap(), before + 3);
        for customer in [100, 101, 102] {
            let rating = svc.find_rating(TOUR_ID, customer).await.unwrap();
            assert_eq!(rating.score, 5);
            assert_eq!(rating.comment, "Great");
        }
    }

    #[actix_web::test]
    async fn rate_many_rolls_back_on_duplicate() {
        let (svc, ratings) = service_with_ratings();
        svc.rate_many(TOUR_ID, 5, &[100, 101, 102]).await.unwrap();

        let err = svc.rate_many(TOUR_ID, 3, &[100, 101, 102]).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateRating { .. }));
        // no partial inserts survive the failed batch
        assert_eq!(ratings.count().await.unwrap(), 3);
    }

    #[actix_web::test]
    async fn patch_with_only_score_keeps_comment() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, Some("Great"))
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let dto = RatingDto {
            score: Some(2),
            comment: None,
            customer_id: CUSTOMER_ID,
        };
        let updated = svc.update_with_patch(rating, &dto).await.unwrap();
        assert_eq!(updated.score, Some(2));
        assert_eq!(updated.comment.as_deref(), Some("Great"));

        let stored = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(stored.score, 2);
        assert_eq!(stored.comment, "Great");
    }

    #[actix_web::test]
    async fn patch_with_only_comment_keeps_score() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, Some("Great"))
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let dto = RatingDto {
            score: None,
            comment: Some("still great".to_string()),
            customer_id: CUSTOMER_ID,
        };
        svc.update_with_patch(rating, &dto).await.unwrap();

        let stored = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(stored.score, 5);
        assert_eq!(stored.comment, "still great");
    }

    #[actix_web::test]
    async fn patch_with_both_overwrites_both() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, Some("Great"))
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let dto = RatingDto {
            score: Some(1),
            comment: Some("awful".to_string()),
            customer_id: CUSTOMER_ID,
        };
        svc.update_with_patch(rating, &dto).await.unwrap();

        let stored = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(stored.score, 1);
        assert_eq!(stored.comment, "awful");
    }

    #[actix_web::test]
    async fn full_update_requires_both_fields() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, Some("Great"))
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let dto = RatingDto {
            score: Some(3),
            comment: None,
            customer_id: CUSTOMER_ID,
        };
        let err = svc.update(rating, &dto).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // nothing was written
        let stored = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();
        assert_eq!(stored.score, 5);
    }

    #[actix_web::test]
    async fn full_update_overwrites_both_fields() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 5, Some("Great"))
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let dto = RatingDto {
            score: Some(3),
            comment: Some("fine".to_string()),
            customer_id: CUSTOMER_ID,
        };
        let updated = svc.update(rating, &dto).await.unwrap();
        assert_eq!(updated.score, Some(3));
        assert_eq!(updated.comment.as_deref(), Some("fine"));
    }

    #[actix_web::test]
    async fn delete_removes_the_rating() {
        let (svc, ratings) = service_with_ratings();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 4, None)
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        svc.delete(rating, CUSTOMER_ID).await.unwrap();
        assert_eq!(ratings.count().await.unwrap(), 0);
        let err = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::RatingNotFound { .. }));
    }

    #[actix_web::test]
    async fn delete_of_absent_rating_fails_at_lookup() {
        let svc = service();
        let err = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::RatingNotFound {
                tour_id: TOUR_ID,
                customer_id: CUSTOMER_ID
            }
        ));
    }

    #[actix_web::test]
    async fn delete_with_mismatched_customer_fails_closed() {
        let (svc, ratings) = service_with_ratings();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 4, None)
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let err = svc.delete(rating, CUSTOMER_ID + 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::RatingNotFound { .. }));
        assert_eq!(ratings.count().await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn paged_ratings_report_unpaged_total() {
        let svc = service();
        for customer in 0..25 {
            svc.create_rating(TOUR_ID, customer, 3, None).await.unwrap();
        }

        let page = svc
            .ratings_page(
                TOUR_ID,
                PageRequest {
                    page: Some(2),
                    limit: Some(10),
                },
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.pagination.total, 25);
        assert!(page.pagination.has_prev);
        assert!(page.pagination.has_next);
    }

    #[actix_web::test]
    async fn dtos_carry_no_identifiers() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 3, None)
            .await
            .unwrap();

        let dtos = svc.ratings_for_tour(TOUR_ID).await.unwrap();
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].customer_id, CUSTOMER_ID);
        assert_eq!(dtos[0].score, Some(3));
    }

    #[actix_web::test]
    async fn rating_can_be_looked_up_by_store_id() {
        let svc = service();
        svc.create_rating(TOUR_ID, CUSTOMER_ID, 3, None)
            .await
            .unwrap();
        let rating = svc.find_rating(TOUR_ID, CUSTOMER_ID).await.unwrap();

        let by_id = svc.lookup_rating_by_id(rating.id).await.unwrap();
        assert_eq!(by_id, Some(rating));
        assert_eq!(svc.lookup_rating_by_id(9999).await.unwrap(), None);
    }
}
