use async_trait::async_trait;
use sqlx::mysql::MySql;
use sqlx::{Executor, FromRow, MySqlPool};

use crate::models::{Difficulty, Region, Tour, TourPackage, TourRating};
use crate::store::{Page, PageInfo, PageRequest, RatingStore, StoreError, TourStore};

const TOUR_COLUMNS: &str = "t.id, t.title, t.description, t.blurb, t.price, t.duration, \
     t.bullets, t.keywords, p.code AS package_code, p.name AS package_name, \
     t.difficulty, t.region";

const RATING_COLUMNS: &str = "r.id, r.customer_id, r.score, r.comment, \
     t.id AS tour_id, t.title, t.description, t.blurb, t.price, t.duration, \
     t.bullets, t.keywords, p.code AS package_code, p.name AS package_name, \
     t.difficulty, t.region";

const RATING_FROM: &str = "FROM tour_ratings r \
     JOIN tours t ON t.id = r.tour_id \
     JOIN tour_packages p ON p.code = t.tour_package_code";

#[derive(Debug, FromRow)]
struct TourRow {
    id: i32,
    title: String,
    description: String,
    blurb: String,
    price: u32,
    duration: String,
    bullets: String,
    keywords: String,
    package_code: String,
    package_name: String,
    difficulty: String,
    region: String,
}

impl TryFrom<TourRow> for Tour {
    type Error = StoreError;

    fn try_from(row: TourRow) -> Result<Self, StoreError> {
        let difficulty: Difficulty = row
            .difficulty
            .parse()
            .map_err(StoreError::Invalid)?;
        let region = Region::find_by_label(&row.region)
            .ok_or_else(|| StoreError::Invalid(format!("unknown region: {}", row.region)))?;
        Ok(Tour {
            id: row.id,
            title: row.title,
            description: row.description,
            blurb: row.blurb,
            price: row.price,
            duration: row.duration,
            bullets: row.bullets,
            keywords: row.keywords,
            tour_package: TourPackage {
                code: row.package_code,
                name: row.package_name,
            },
            difficulty,
            region,
        })
    }
}

#[derive(Debug, FromRow)]
struct RatingRow {
    id: i32,
    customer_id: i32,
    score: i32,
    comment: String,
    tour_id: i32,
    title: String,
    description: String,
    blurb: String,
    price: u32,
    duration: String,
    bullets: String,
    keywords: String,
    package_code: String,
    package_name: String,
    difficulty: String,
    region: String,
}

impl TryFrom<RatingRow> for TourRating {
    type Error = StoreError;

    fn try_from(row: RatingRow) -> Result<Self, StoreError> {
        let tour = Tour::try_from(TourRow {
            id: row.tour_id,
            title: row.title,
            description: row.description,
            blurb: row.blurb,
            price: row.price,
            duration: row.duration,
            bullets: row.bullets,
            keywords: row.keywords,
            package_code: row.package_code,
            package_name: row.package_name,
            difficulty: row.difficulty,
            region: row.region,
        })?;
        Ok(TourRating {
            id: row.id,
            tour,
            customer_id: row.customer_id,
            score: row.score,
            comment: row.comment,
        })
    }
}

pub struct MySqlTourStore {
    pool: MySqlPool,
}

impl MySqlTourStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTourStore { pool }
    }
}

#[async_trait]
impl TourStore for MySqlTourStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Tour>, StoreError> {
        let sql = format!(
            "SELECT {TOUR_COLUMNS} FROM tours t \
             JOIN tour_packages p ON p.code = t.tour_package_code WHERE t.id = ?"
        );
        let row: Option<TourRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tour::try_from).transpose()
    }

    async fn find_all(&self, page: PageRequest) -> Result<Page<Tour>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tours")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {TOUR_COLUMNS} FROM tours t \
             JOIN tour_packages p ON p.code = t.tour_package_code \
             ORDER BY t.id LIMIT ? OFFSET ?"
        );
        let rows: Vec<TourRow> = sqlx::query_as(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(Tour::try_from)
                .collect::<Result<_, _>>()?,
            pagination: PageInfo::new(&page, total),
        })
    }
}

pub struct MySqlRatingStore {
    pool: MySqlPool,
}

impl MySqlRatingStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRatingStore { pool }
    }
}

/// Insert one rating on the given executor, translating a unique-key
/// violation on (tour_id, customer_id) into [`StoreError::Duplicate`].
async fn insert_rating<'e, E>(executor: E, rating: &TourRating) -> Result<i32, StoreError>
where
    E: Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        "INSERT INTO tour_ratings (tour_id, customer_id, score, comment) VALUES (?, ?, ?, ?)",
    )
    .bind(rating.tour.id)
    .bind(rating.customer_id)
    .bind(rating.score)
    .bind(&rating.comment)
    .execute(executor)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate {
            tour_id: rating.tour.id,
            customer_id: rating.customer_id,
        },
        _ => StoreError::Database(e),
    })?;

    Ok(result.last_insert_id() as i32)
}

#[async_trait]
impl RatingStore for MySqlRatingStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<TourRating>, StoreError> {
        let sql = format!("SELECT {RATING_COLUMNS} {RATING_FROM} WHERE r.id = ?");
        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TourRating::try_from).transpose()
    }

    async fn find_by_tour_id(&self, tour_id: i32) -> Result<Vec<TourRating>, StoreError> {
        let sql = format!("SELECT {RATING_COLUMNS} {RATING_FROM} WHERE r.tour_id = ? ORDER BY r.id");
        let rows: Vec<RatingRow> = sqlx::query_as(&sql)
            .bind(tour_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TourRating::try_from).collect()
    }

    async fn find_by_tour_id_paged(
        &self,
        tour_id: i32,
        page: PageRequest,
    ) -> Result<Page<TourRating>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_ratings WHERE tour_id = ?")
            .bind(tour_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {RATING_COLUMNS} {RATING_FROM} \
             WHERE r.tour_id = ? ORDER BY r.id LIMIT ? OFFSET ?"
        );
        let rows: Vec<RatingRow> = sqlx::query_as(&sql)
            .bind(tour_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(TourRating::try_from)
                .collect::<Result<_, _>>()?,
            pagination: PageInfo::new(&page, total),
        })
    }

    async fn find_by_tour_and_customer(
        &self,
        tour_id: i32,
        customer_id: i32,
    ) -> Result<Option<TourRating>, StoreError> {
        let sql = format!("SELECT {RATING_COLUMNS} {RATING_FROM} WHERE r.tour_id = ? AND r.customer_id = ?");
        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(tour_id)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TourRating::try_from).transpose()
    }

    async fn save(&self, mut rating: TourRating) -> Result<TourRating, StoreError> {
        if rating.id == 0 {
            rating.id = insert_rating(&self.pool, &rating).await?;
        } else {
            sqlx::query("UPDATE tour_ratings SET score = ?, comment = ? WHERE id = ?")
                .bind(rating.score)
                .bind(&rating.comment)
                .bind(rating.id)
                .execute(&self.pool)
                .await?;
        }
        Ok(rating)
    }

    async fn save_all(&self, ratings: Vec<TourRating>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for rating in &ratings {
            // any failure drops the transaction and rolls the batch back
            insert_rating(&mut *tx, rating).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, rating: &TourRating) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tour_ratings WHERE id = ?")
            .bind(rating.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_ratings")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
