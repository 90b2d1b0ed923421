//! Category and genre use-cases.

use std::sync::Arc;

use pagination::PageRequest;
use tracing::info;

use crate::domain::ports::{Listing, TaxonomyRepository};
use crate::domain::{Actor, Capability, Error, Slug, Taxon, TaxonomyKind};

/// Taxonomy service shared by the category and genre endpoints.
#[derive(Clone)]
pub struct CatalogueService {
    taxonomies: Arc<dyn TaxonomyRepository>,
}

impl CatalogueService {
    /// Create a new service backed by `taxonomies`.
    pub fn new(taxonomies: Arc<dyn TaxonomyRepository>) -> Self {
        Self { taxonomies }
    }

    /// List entries of `kind`, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<Taxon>, Error> {
        let search = search.filter(|term| !term.trim().is_empty());
        Ok(self.taxonomies.list(kind, search, page).await?)
    }

    /// Create an entry.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageCatalogue`]; a slug already used within
    /// the taxonomy yields a field validation error.
    pub async fn create(
        &self,
        actor: &Actor,
        kind: TaxonomyKind,
        taxon: Taxon,
    ) -> Result<Taxon, Error> {
        actor.require(Capability::ManageCatalogue)?;
        let record = self.taxonomies.insert(kind, &taxon).await?;
        info!(kind = %kind, slug = %record.taxon.slug, "taxonomy entry created");
        Ok(record.taxon)
    }

    /// Delete an entry by slug.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageCatalogue`]; unknown slugs yield
    /// `not_found`.
    pub async fn delete(
        &self,
        actor: &Actor,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<(), Error> {
        actor.require(Capability::ManageCatalogue)?;
        if !self.taxonomies.delete(kind, slug).await? {
            return Err(Error::not_found(format!("{kind} {slug} not found")));
        }
        info!(kind = %kind, %slug, "taxonomy entry deleted");
        Ok(())
    }
}
