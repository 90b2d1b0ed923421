//! Port abstraction for bearer token storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SecretDigest, User, UserId};

use super::{define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by access token adapters.
    pub enum AccessTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

port_error_into_domain!(AccessTokenRepositoryError {});

/// Storage for issued bearer tokens. Only digests are persisted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Record a token digest for `user` valid until `expires_at`.
    async fn store(
        &self,
        user: UserId,
        digest: &SecretDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenRepositoryError>;

    /// Resolve an unexpired token digest to its owner.
    async fn resolve(
        &self,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AccessTokenRepositoryError>;
}
