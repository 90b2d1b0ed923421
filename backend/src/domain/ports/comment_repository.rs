//! Port abstraction for comment persistence.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Comment, CommentId, ContentText, NewComment, ReviewId};

use super::{Listing, define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by comment adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
    }
}

port_error_into_domain!(CommentRepositoryError {});

/// Storage for comments, scoped by review.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// List a review's comments, newest first.
    async fn list(
        &self,
        review: ReviewId,
        page: PageRequest,
    ) -> Result<Listing<Comment>, CommentRepositoryError>;

    /// Fetch a comment that belongs to `review`.
    async fn find(
        &self,
        review: ReviewId,
        id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Create a comment.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Replace a comment's text; `None` when the comment does not exist.
    async fn update(
        &self,
        id: CommentId,
        text: &ContentText,
    ) -> Result<Option<Comment>, CommentRepositoryError>;

    /// Delete a comment.
    async fn delete(&self, id: CommentId) -> Result<bool, CommentRepositoryError>;
}
