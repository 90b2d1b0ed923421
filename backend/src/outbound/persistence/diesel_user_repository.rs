//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Accounts live in the `users` table together with the digest and expiry of
//! any outstanding confirmation code. Deleting a user relies on the foreign
//! keys to cascade to tokens, reviews and comments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{Listing, UserRepository, UserRepositoryError};
use crate::domain::{
    Email, NewUser, PendingConfirmation, SecretDigest, User, UserChanges, UserId, Username,
};

use super::diesel_helpers::{
    collect_rows, count_to_total, like_pattern, map_basic_diesel_error, map_basic_pool_error,
    page_bounds, unique_violation,
};
use super::models::{ConfirmationColumns, NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    match unique_violation(&error) {
        Some("users_username_key") => UserRepositoryError::duplicate_username(),
        Some("users_email_key") => UserRepositoryError::duplicate_email(),
        _ => map_basic_diesel_error(
            error,
            UserRepositoryError::query,
            UserRepositoryError::connection,
        ),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    row.into_domain().map_err(UserRepositoryError::query)
}

fn changeset(changes: &UserChanges) -> UserUpdate<'_> {
    UserUpdate {
        username: changes.username.as_ref().map(Username::as_str),
        email: changes.email.as_ref().map(Email::as_str),
        role: changes.role.map(|role| role.as_str()),
        first_name: changes.first_name.as_deref(),
        last_name: changes.last_name.as_deref(),
        bio: changes.bio.as_deref(),
    }
}

fn searched(pattern: Option<&str>) -> users::BoxedQuery<'_, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(pattern) = pattern {
        query = query.filter(users::username.ilike(pattern));
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = search.as_deref().map(like_pattern);
        let (offset, limit) = page_bounds(page);

        let total: i64 = searched(pattern.as_deref())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<UserRow> = searched(pattern.as_deref())
            .order(users::username.asc())
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = collect_rows(
            rows.into_iter().map(UserRow::into_domain),
            UserRepositoryError::query,
        )?;
        Ok(Listing::new(items, count_to_total(total)))
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            username: user.username.as_str(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            first_name: &user.profile.first_name,
            last_name: &user.profile.last_name,
            bio: &user.profile.bio,
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(row)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let update = changeset(changes);
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set(&update)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn store_confirmation(
        &self,
        id: UserId,
        confirmation: &PendingConfirmation,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.get()))
            .set(&ConfirmationColumns::from(confirmation))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::query(format!("user {id} not found")));
        }
        Ok(())
    }

    async fn consume_confirmation(
        &self,
        id: UserId,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outstanding = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::confirmation_digest.eq(digest.as_str()))
            .filter(users::confirmation_expires_at.gt(now));
        let consumed = diesel::update(outstanding)
            .set((
                users::verified.eq(true),
                users::confirmation_digest.eq(None::<String>),
                users::confirmation_expires_at.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(consumed == 1)
    }
}
