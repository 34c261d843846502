pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Tour, TourRating};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rating for tour {tour_id} by customer {customer_id} already exists")]
    Duplicate { tour_id: i32, customer_id: i32 },

    #[error("invalid stored value: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Requested page, straight off the query string. Page numbers start at 1;
/// the limit is clamped to 1..=100.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let page = request.page();
        let limit = request.limit();
        let total_pages = (total as f64 / limit as f64).ceil() as i64;
        PageInfo {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One bounded slice of a result set. `pagination.total` always reflects the
/// unpaged result size.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[async_trait]
pub trait TourStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tour>, StoreError>;

    async fn find_all(&self, page: PageRequest) -> Result<Page<Tour>, StoreError>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<TourRating>, StoreError>;

    async fn find_by_tour_id(&self, tour_id: i32) -> Result<Vec<TourRating>, StoreError>;

    async fn find_by_tour_id_paged(
        &self,
        tour_id: i32,
        page: PageRequest,
    ) -> Result<Page<TourRating>, StoreError>;

    async fn find_by_tour_and_customer(
        &self,
        tour_id: i32,
        customer_id: i32,
    ) -> Result<Option<TourRating>, StoreError>;

    /// Insert when `rating.id` is 0, otherwise update score and comment.
    /// Inserting a second rating for the same (tour, customer) pair fails
    /// with [`StoreError::Duplicate`].
    async fn save(&self, rating: TourRating) -> Result<TourRating, StoreError>;

    /// Persist a batch inside a single unit of work: either every rating is
    /// inserted or none is.
    async fn save_all(&self, ratings: Vec<TourRating>) -> Result<(), StoreError>;

    async fn delete(&self, rating: &TourRating) -> Result<(), StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults_and_clamps() {
        let defaults = PageRequest::default();
        assert_eq!(defaults.page(), 1);
        assert_eq!(defaults.limit(), 20);
        assert_eq!(defaults.offset(), 0);

        let wild = PageRequest {
            page: Some(-3),
            limit: Some(1000),
        };
        assert_eq!(wild.page(), 1);
        assert_eq!(wild.limit(), 100);

        let third = PageRequest {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(third.offset(), 20);
    }

    #[test]
    fn page_info_totals() {
        let request = PageRequest {
            page: Some(2),
            limit: Some(10),
        };
        let info = PageInfo::new(&request, 25);
        assert_eq!(info.total, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(info.has_prev);

        let empty = PageInfo::new(&PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
