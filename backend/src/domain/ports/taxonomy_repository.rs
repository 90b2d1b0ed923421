//! Port abstraction for the category and genre taxonomies.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, Slug, Taxon, TaxonRecord, TaxonomyKind};

use super::{Listing, define_port_error, port_error_into_domain};

define_port_error! {
    /// Persistence errors raised by taxonomy adapters.
    pub enum TaxonomyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "taxonomy repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "taxonomy repository query failed: {message}",
        /// The slug is already used within the taxonomy.
        DuplicateSlug => "slug already in use",
    }
}

port_error_into_domain!(TaxonomyRepositoryError {
    TaxonomyRepositoryError::DuplicateSlug => {
        Error::field("slug", "an entry with this slug already exists")
    },
});

/// Storage for categories and genres. Both taxonomies share one shape and
/// are told apart by [`TaxonomyKind`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// List entries ordered by name, optionally filtered by a
    /// case-insensitive name substring.
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<Taxon>, TaxonomyRepositoryError>;

    /// Fetch an entry by slug.
    async fn find(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<TaxonRecord>, TaxonomyRepositoryError>;

    /// Create an entry.
    async fn insert(
        &self,
        kind: TaxonomyKind,
        taxon: &Taxon,
    ) -> Result<TaxonRecord, TaxonomyRepositoryError>;

    /// Delete an entry by slug. Titles referencing a deleted category lose
    /// it; deleted genres drop out of title genre sets. Returns `false` when
    /// nothing matched.
    async fn delete(&self, kind: TaxonomyKind, slug: &Slug)
    -> Result<bool, TaxonomyRepositoryError>;
}
