//! PostgreSQL-backed `AccessTokenRepository` implementation.
//!
//! Only token digests are stored. Resolution joins the owning user so a
//! single round trip authenticates a request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccessTokenRepository, AccessTokenRepositoryError};
use crate::domain::{SecretDigest, User, UserId};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewAccessTokenRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{access_tokens, users};

/// Diesel-backed implementation of the `AccessTokenRepository` port.
#[derive(Clone)]
pub struct DieselAccessTokenRepository {
    pool: DbPool,
}

impl DieselAccessTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccessTokenRepositoryError {
    map_basic_pool_error(error, AccessTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccessTokenRepositoryError {
    map_basic_diesel_error(
        error,
        AccessTokenRepositoryError::query,
        AccessTokenRepositoryError::connection,
    )
}

#[async_trait]
impl AccessTokenRepository for DieselAccessTokenRepository {
    async fn store(
        &self,
        user: UserId,
        digest: &SecretDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(access_tokens::table)
            .values(&NewAccessTokenRow {
                user_id: user.get(),
                token_digest: digest.as_str(),
                expires_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn resolve(
        &self,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AccessTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = access_tokens::table
            .inner_join(users::table)
            .filter(access_tokens::token_digest.eq(digest.as_str()))
            .filter(access_tokens::expires_at.gt(now))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_domain().map_err(AccessTokenRepositoryError::query))
            .transpose()
    }
}
