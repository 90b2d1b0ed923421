//! Port abstraction for account persistence and confirmation-code storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{
    Email, Error, NewUser, PendingConfirmation, SecretDigest, User, UserChanges, UserId, Username,
};

use super::{Listing, define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername => "username already taken",
        /// Another account already uses the email address.
        DuplicateEmail => "email already registered",
    }
}

port_error_into_domain!(UserRepositoryError {
    UserRepositoryError::DuplicateUsername => {
        Error::field("username", "a user with that username already exists")
    },
    UserRepositoryError::DuplicateEmail => {
        Error::field("email", "a user with that email already exists")
    },
});

/// Storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError>;

    /// List users ordered by username, optionally filtered by a
    /// case-insensitive username substring.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<User>, UserRepositoryError>;

    /// Create an account.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Apply a partial update; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Delete an account and everything it authored. Returns `false` when
    /// the user did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;

    /// Replace the user's outstanding confirmation code.
    async fn store_confirmation(
        &self,
        id: UserId,
        confirmation: &PendingConfirmation,
    ) -> Result<(), UserRepositoryError>;

    /// Consume the outstanding code when it hashes to `digest` and is still
    /// valid at `now`, marking the account verified.
    ///
    /// The check and the clear happen as one step, so a code is accepted at
    /// most once even under concurrent exchanges. Returns `false` and leaves
    /// the account untouched when no such code is outstanding.
    async fn consume_confirmation(
        &self,
        id: UserId,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError>;
}
