//! Port abstraction for title persistence.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, NewTitle, TaxonomyKind, Title, TitleChanges, TitleFilter, TitleId};

use super::{Listing, define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by title adapters.
    pub enum TitleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "title repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "title repository query failed: {message}",
        /// A linked category or genre does not exist, typically because it
        /// was deleted after the slug was resolved.
        MissingTaxon { kind: TaxonomyKind } => "linked {kind} does not exist",
    }
}

port_error_into_domain!(TitleRepositoryError {
    TitleRepositoryError::MissingTaxon { kind } => {
        Error::field(kind.noun(), format!("{kind} no longer exists"))
    },
});

/// Storage for titles. Returned titles carry their resolved category,
/// genres and a rating derived from the current reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleRepository: Send + Sync {
    /// List titles matching `filter`, newest year first then by name.
    async fn list(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Listing<Title>, TitleRepositoryError>;

    /// Fetch a title by identifier.
    async fn find(&self, id: TitleId) -> Result<Option<Title>, TitleRepositoryError>;

    /// Create a title together with its genre links.
    async fn insert(&self, title: &NewTitle) -> Result<Title, TitleRepositoryError>;

    /// Apply a partial update; `None` when the title does not exist.
    async fn update(
        &self,
        id: TitleId,
        changes: &TitleChanges,
    ) -> Result<Option<Title>, TitleRepositoryError>;

    /// Delete a title with its reviews and their comments. Returns `false`
    /// when the title did not exist.
    async fn delete(&self, id: TitleId) -> Result<bool, TitleRepositoryError>;
}
