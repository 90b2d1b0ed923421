//! PostgreSQL-backed `ReviewRepository` implementation.
//!
//! Reviews are read joined with `users` so the author's username travels with
//! every row. The `(author_id, title_id)` unique constraint backs the
//! one-review-per-title rule.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{Listing, ReviewRepository, ReviewRepositoryError};
use crate::domain::{NewReview, Review, ReviewChanges, ReviewId, TitleId, UserId};

use super::diesel_helpers::{
    collect_rows, count_to_total, map_basic_diesel_error, map_basic_pool_error, page_bounds,
    unique_violation,
};
use super::models::{NewReviewRow, ReviewRow, ReviewUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{reviews, users};

const ONE_REVIEW_PER_TITLE: &str = "reviews_author_title_key";

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewRepositoryError {
    match unique_violation(&error) {
        Some(ONE_REVIEW_PER_TITLE) => ReviewRepositoryError::duplicate_review(),
        _ => map_basic_diesel_error(
            error,
            ReviewRepositoryError::query,
            ReviewRepositoryError::connection,
        ),
    }
}

fn to_review((row, author): (ReviewRow, String)) -> Result<Review, String> {
    row.into_domain(author)
}

async fn load_review(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<Review>, ReviewRepositoryError> {
    let row: Option<(ReviewRow, String)> = reviews::table
        .inner_join(users::table)
        .filter(reviews::id.eq(id))
        .select((ReviewRow::as_select(), users::username))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    row.map(|row| to_review(row).map_err(ReviewRepositoryError::query))
        .transpose()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn list(
        &self,
        title: TitleId,
        page: PageRequest,
    ) -> Result<Listing<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_bounds(page);

        let total: i64 = reviews::table
            .filter(reviews::title_id.eq(title.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::title_id.eq(title.get()))
            .order((reviews::pub_date.desc(), reviews::id.desc()))
            .offset(offset)
            .limit(limit)
            .select((ReviewRow::as_select(), users::username))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(rows.into_iter().map(to_review), ReviewRepositoryError::query)?;
        Ok(Listing::new(items, count_to_total(total)))
    }

    async fn find(
        &self,
        title: TitleId,
        id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let review = load_review(&mut conn, id.get()).await?;
        Ok(review.filter(|review| review.title_id == title))
    }

    async fn find_by_author(
        &self,
        title: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(ReviewRow, String)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::title_id.eq(title.get()))
            .filter(reviews::author_id.eq(author.get()))
            .select((ReviewRow::as_select(), users::username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| to_review(row).map_err(ReviewRepositoryError::query))
            .transpose()
    }

    async fn insert(&self, review: &NewReview) -> Result<Review, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewReviewRow {
            title_id: review.title_id.get(),
            author_id: review.author_id.get(),
            text: review.text.as_str(),
            score: i32::from(review.score.get()),
            pub_date: review.pub_date,
        };
        let id: i64 = diesel::insert_into(reviews::table)
            .values(&new_row)
            .returning(reviews::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_review(&mut conn, id)
            .await?
            .ok_or_else(|| ReviewRepositoryError::query("inserted review vanished"))
    }

    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = ReviewUpdate {
            text: changes.text.as_ref().map(|text| text.as_str()),
            score: changes.score.map(|score| i32::from(score.get())),
        };
        if update.text.is_some() || update.score.is_some() {
            let updated = diesel::update(reviews::table.find(id.get()))
                .set(&update)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if updated == 0 {
                return Ok(None);
            }
        }
        load_review(&mut conn, id.get()).await
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(reviews::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
