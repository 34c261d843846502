//! In-memory store backends honoring the same contracts as the MySQL ones,
//! including all-or-nothing batch inserts. They back the test suites and
//! database-less local runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{Tour, TourRating};
use crate::store::{Page, PageInfo, PageRequest, RatingStore, StoreError, TourStore};

#[derive(Default)]
pub struct InMemoryTourStore {
    tours: Mutex<Vec<Tour>>,
}

impl InMemoryTourStore {
    pub fn with_tours(tours: Vec<Tour>) -> Self {
        InMemoryTourStore {
            tours: Mutex::new(tours),
        }
    }
}

#[async_trait]
impl TourStore for InMemoryTourStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tour>, StoreError> {
        let tours = self.tours.lock().unwrap();
        Ok(tours.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Tour>, StoreError> {
        let tours = self.tours.lock().unwrap();
        let total = tours.len() as i64;
        let items = tours
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            pagination: PageInfo::new(&page, total),
        })
    }
}

#[derive(Default)]
struct RatingsInner {
    ratings: Vec<TourRating>,
    next_id: i32,
}

impl RatingsInner {
    fn insert(&mut self, mut rating: TourRating) -> Result<TourRating, StoreError> {
        if self
            .ratings
            .iter()
            .any(|r| r.tour.id == rating.tour.id && r.customer_id == rating.customer_id)
        {
            return Err(StoreError::Duplicate {
                tour_id: rating.tour.id,
                customer_id: rating.customer_id,
            });
        }
        self.next_id += 1;
        rating.id = self.next_id;
        self.ratings.push(rating.clone());
        Ok(rating)
    }
}

#[derive(Default)]
pub struct InMemoryRatingStore {
    inner: Mutex<RatingsInner>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        InMemoryRatingStore::default()
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<TourRating>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.ratings.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_tour_id(&self, tour_id: i32) -> Result<Vec<TourRating>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ratings
            .iter()
            .filter(|r| r.tour.id == tour_id)
            .cloned()
            .collect())
    }

    async fn find_by_tour_id_paged(
        &self,
        tour_id: i32,
        page: PageRequest,
    ) -> Result<Page<TourRating>, StoreError> {
        let all = self.find_by_tour_id(tour_id).await?;
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page {
            items,
            pagination: PageInfo::new(&page, total),
        })
    }

    async fn find_by_tour_and_customer(
        &self,
        tour_id: i32,
        customer_id: i32,
    ) -> Result<Option<TourRating>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ratings
            .iter()
            .find(|r| r.tour.id == tour_id && r.customer_id == customer_id)
            .cloned())
    }

    async fn save(&self, rating: TourRating) -> Result<TourRating, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if rating.id == 0 {
            return inner.insert(rating);
        }
        if let Some(stored) = inner.ratings.iter_mut().find(|r| r.id == rating.id) {
            stored.score = rating.score;
            stored.comment = rating.comment.clone();
        }
        Ok(rating)
    }

    async fn save_all(&self, ratings: Vec<TourRating>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        // validate the whole batch before touching the store so a duplicate
        // anywhere leaves no partial insert behind
        for (index, rating) in ratings.iter().enumerate() {
            let duplicate_in_store = inner
                .ratings
                .iter()
                .any(|r| r.tour.id == rating.tour.id && r.customer_id == rating.customer_id);
            let duplicate_in_batch = ratings[..index]
                .iter()
                .any(|r| r.tour.id == rating.tour.id && r.customer_id == rating.customer_id);
            if duplicate_in_store || duplicate_in_batch {
                return Err(StoreError::Duplicate {
                    tour_id: rating.tour.id,
                    customer_id: rating.customer_id,
                });
            }
        }
        for rating in ratings {
            inner.insert(rating)?;
        }
        Ok(())
    }

    async fn delete(&self, rating: &TourRating) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.ratings.retain(|r| r.id != rating.id);
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.ratings.len() as i64)
    }
}
