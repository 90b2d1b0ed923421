//! Title catalogue use-cases.
//!
//! Clients address categories and genres by slug; this service resolves them
//! to stored identifiers and validates the release year against the clock
//! before handing normalised records to the repository.

use std::sync::Arc;

use chrono::Datelike;
use mockable::Clock;
use pagination::PageRequest;
use tracing::info;

use crate::domain::ports::{Listing, TaxonomyRepository, TitleRepository};
use crate::domain::{
    Actor, Capability, Error, FieldErrors, NewTitle, ReleaseYear, Slug, TaxonId, TaxonomyKind,
    Title, TitleChanges, TitleFilter, TitleId, TitleName,
};

/// Title creation payload with taxonomy references by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDraft {
    /// Display name.
    pub name: TitleName,
    /// Release year, not yet checked against the clock.
    pub year: i32,
    /// Optional description.
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<Slug>,
    /// Genre slugs.
    pub genres: Vec<Slug>,
}

/// Partial title update with taxonomy references by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitlePatch {
    /// New name.
    pub name: Option<TitleName>,
    /// New release year.
    pub year: Option<i32>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New category slug; `Some(None)` clears it.
    pub category: Option<Option<Slug>>,
    /// Replacement genre slugs.
    pub genres: Option<Vec<Slug>>,
}

/// Title service.
#[derive(Clone)]
pub struct TitlesService {
    titles: Arc<dyn TitleRepository>,
    taxonomies: Arc<dyn TaxonomyRepository>,
    clock: Arc<dyn Clock>,
}

impl TitlesService {
    /// Create a new service with the given collaborators.
    pub fn new(
        titles: Arc<dyn TitleRepository>,
        taxonomies: Arc<dyn TaxonomyRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            titles,
            taxonomies,
            clock,
        }
    }

    /// List titles matching `filter`.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> Result<Listing<Title>, Error> {
        Ok(self.titles.list(&filter, page).await?)
    }

    /// Fetch one title.
    ///
    /// # Errors
    ///
    /// Unknown identifiers yield `not_found`.
    pub async fn get(&self, id: TitleId) -> Result<Title, Error> {
        self.titles
            .find(id)
            .await?
            .ok_or_else(|| Self::missing(id))
    }

    /// Create a title.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageCatalogue`]. Future years and unknown
    /// slugs yield field validation errors.
    pub async fn create(&self, actor: &Actor, draft: TitleDraft) -> Result<Title, Error> {
        actor.require(Capability::ManageCatalogue)?;

        let mut errors = FieldErrors::default();
        let year = errors.check("year", ReleaseYear::new(draft.year, self.current_year()));
        let category = match &draft.category {
            Some(slug) => self.resolve(TaxonomyKind::Category, slug, &mut errors).await?,
            None => None,
        };
        let genres = self.resolve_all(&draft.genres, &mut errors).await?;
        errors.finish()?;

        let Some(year) = year else {
            return Err(Error::internal("year validation lost its result"));
        };
        let record = NewTitle {
            name: draft.name,
            year,
            description: draft.description,
            category,
            genres,
        };
        let title = self.titles.insert(&record).await?;
        info!(title = %title.id, "title created");
        Ok(title)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageCatalogue`]; unknown identifiers yield
    /// `not_found`; invalid years and slugs yield field errors.
    pub async fn update(
        &self,
        actor: &Actor,
        id: TitleId,
        patch: TitlePatch,
    ) -> Result<Title, Error> {
        actor.require(Capability::ManageCatalogue)?;

        let mut errors = FieldErrors::default();
        let year = patch
            .year
            .and_then(|year| errors.check("year", ReleaseYear::new(year, self.current_year())));
        let category = match &patch.category {
            Some(Some(slug)) => Some(
                self.resolve(TaxonomyKind::Category, slug, &mut errors)
                    .await?,
            ),
            Some(None) => Some(None),
            None => None,
        };
        let genres = match &patch.genres {
            Some(slugs) => Some(self.resolve_all(slugs, &mut errors).await?),
            None => None,
        };
        errors.finish()?;

        let changes = TitleChanges {
            name: patch.name,
            year,
            description: patch.description,
            category,
            genres,
        };
        self.titles
            .update(id, &changes)
            .await?
            .ok_or_else(|| Self::missing(id))
    }

    /// Delete a title with its reviews and comments.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageCatalogue`]; unknown identifiers yield
    /// `not_found`.
    pub async fn delete(&self, actor: &Actor, id: TitleId) -> Result<(), Error> {
        actor.require(Capability::ManageCatalogue)?;
        if !self.titles.delete(id).await? {
            return Err(Self::missing(id));
        }
        info!(title = %id, "title deleted");
        Ok(())
    }

    fn current_year(&self) -> i32 {
        self.clock.utc().year()
    }

    async fn resolve(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
        errors: &mut FieldErrors,
    ) -> Result<Option<TaxonId>, Error> {
        let found = self.taxonomies.find(kind, slug).await?;
        if found.is_none() {
            let field = match kind {
                TaxonomyKind::Category => "category",
                TaxonomyKind::Genre => "genre",
            };
            errors.push(field, format!("{kind} {slug} does not exist"));
        }
        Ok(found.map(|record| record.id))
    }

    async fn resolve_all(
        &self,
        slugs: &[Slug],
        errors: &mut FieldErrors,
    ) -> Result<Vec<TaxonId>, Error> {
        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            if let Some(id) = self.resolve(TaxonomyKind::Genre, slug, errors).await? {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    fn missing(id: TitleId) -> Error {
        Error::not_found(format!("title {id} not found"))
    }
}

#[cfg(test)]
#[path = "titles_service_tests.rs"]
mod tests;
