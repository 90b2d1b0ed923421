//! PostgreSQL-backed `CommentRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{CommentRepository, CommentRepositoryError, Listing};
use crate::domain::{Comment, CommentId, ContentText, NewComment, ReviewId};

use super::diesel_helpers::{
    collect_rows, count_to_total, map_basic_diesel_error, map_basic_pool_error, page_bounds,
};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, users};

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentRepositoryError {
    map_basic_pool_error(error, CommentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_basic_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

fn to_comment((row, author): (CommentRow, String)) -> Result<Comment, String> {
    row.into_domain(author)
}

async fn load_comment(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<Comment>, CommentRepositoryError> {
    let row: Option<(CommentRow, String)> = comments::table
        .inner_join(users::table)
        .filter(comments::id.eq(id))
        .select((CommentRow::as_select(), users::username))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    row.map(|row| to_comment(row).map_err(CommentRepositoryError::query))
        .transpose()
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> Result<Listing<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_bounds(page);

        let total: i64 = comments::table
            .filter(comments::review_id.eq(review.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::review_id.eq(review.get()))
            .order((comments::pub_date.desc(), comments::id.desc()))
            .offset(offset)
            .limit(limit)
            .select((CommentRow::as_select(), users::username))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(rows.into_iter().map(to_comment), CommentRepositoryError::query)?;
        Ok(Listing::new(items, count_to_total(total)))
    }

    async fn find(
        &self,
        review: ReviewId,
        id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let comment = load_comment(&mut conn, id.get()).await?;
        Ok(comment.filter(|comment| comment.review_id == review))
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: i64 = diesel::insert_into(comments::table)
            .values(&NewCommentRow {
                review_id: comment.review_id.get(),
                author_id: comment.author_id.get(),
                text: comment.text.as_str(),
                pub_date: comment.pub_date,
            })
            .returning(comments::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_comment(&mut conn, id)
            .await?
            .ok_or_else(|| CommentRepositoryError::query("inserted comment vanished"))
    }

    async fn update(
        &self,
        id: CommentId,
        text: &ContentText,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(comments::table.find(id.get()))
            .set(comments::text.eq(text.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        load_comment(&mut conn, id.get()).await
    }

    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
