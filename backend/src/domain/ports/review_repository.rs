//! Port abstraction for review persistence.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Error, NewReview, Review, ReviewChanges, ReviewId, TitleId, UserId,
};

use super::{Listing, define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by review adapters.
    pub enum ReviewRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// The author has already reviewed the title.
        DuplicateReview => "review already exists for this title and author",
    }
}

port_error_into_domain!(ReviewRepositoryError {
    ReviewRepositoryError::DuplicateReview => {
        Error::field("non_field_errors", "you have already reviewed this title")
    },
});

/// Storage for reviews, scoped by title.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List a title's reviews, newest first.
    async fn list(
        &self,
        title: TitleId,
        page: PageRequest,
    ) -> Result<Listing<Review>, ReviewRepositoryError>;

    /// Fetch a review that belongs to `title`.
    async fn find(
        &self,
        title: TitleId,
        id: ReviewId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Fetch `author`'s review of `title`, if any.
    async fn find_by_author(
        &self,
        title: TitleId,
        author: UserId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Create a review. Fails with [`ReviewRepositoryError::DuplicateReview`]
    /// when the author already reviewed the title.
    async fn insert(&self, review: &NewReview) -> Result<Review, ReviewRepositoryError>;

    /// Apply a partial update; `None` when the review does not exist.
    async fn update(
        &self,
        id: ReviewId,
        changes: &ReviewChanges,
    ) -> Result<Option<Review>, ReviewRepositoryError>;

    /// Delete a review and its comments.
    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewRepositoryError>;
}
