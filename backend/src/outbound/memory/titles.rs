//! Titles with their taxonomy links and derived rating.

use std::collections::BTreeSet;

use async_trait::async_trait;
use pagination::PageRequest;

use super::{InMemoryStore, Tables, TitleRow, contains_ignore_case, paginate};
use crate::domain::ports::{Listing, TitleRepository, TitleRepositoryError};
use crate::domain::{
    NewTitle, Rating, ScoreTally, Taxon, TaxonId, TaxonomyKind, Title, TitleChanges, TitleFilter,
    TitleId,
};

impl Tables {
    fn assemble_title(&self, id: i64, row: &TitleRow) -> Title {
        let category = row
            .category
            .and_then(|category| self.categories.get(&category.get()).cloned());
        let mut genres: Vec<Taxon> = row
            .genres
            .iter()
            .filter_map(|genre| self.genres.get(&genre.get()).cloned())
            .collect();
        genres.sort_by(|a, b| a.slug.cmp(&b.slug));
        Title {
            id: TitleId::new(id),
            name: row.name.clone(),
            year: row.year,
            description: row.description.clone(),
            category,
            genres,
            rating: Rating::from_tally(self.tally(id)),
        }
    }

    fn tally(&self, title_id: i64) -> ScoreTally {
        ScoreTally::from_scores(
            self.reviews
                .values()
                .filter(|review| review.title_id == title_id)
                .map(|review| review.score.get()),
        )
    }

    fn matches(&self, row: &TitleRow, filter: &TitleFilter) -> bool {
        let slug_of = |kind: TaxonomyKind, id: TaxonId| {
            self.taxa(kind).get(&id.get()).map(|taxon| &taxon.slug)
        };
        let category_ok = filter.category.as_ref().is_none_or(|wanted| {
            row.category
                .and_then(|id| slug_of(TaxonomyKind::Category, id))
                .is_some_and(|slug| slug == wanted)
        });
        let genre_ok = filter.genre.as_ref().is_none_or(|wanted| {
            row.genres
                .iter()
                .filter_map(|id| slug_of(TaxonomyKind::Genre, *id))
                .any(|slug| slug == wanted)
        });
        let name_ok = filter
            .name
            .as_deref()
            .is_none_or(|term| contains_ignore_case(row.name.as_str(), term));
        let year_ok = filter.year.is_none_or(|year| row.year.get() == year);
        category_ok && genre_ok && name_ok && year_ok
    }

    fn known_links(
        &self,
        category: Option<TaxonId>,
        genres: &[TaxonId],
    ) -> Result<(), TitleRepositoryError> {
        if category.is_some_and(|id| !self.categories.contains_key(&id.get())) {
            return Err(TitleRepositoryError::missing_taxon(TaxonomyKind::Category));
        }
        if genres.iter().any(|id| !self.genres.contains_key(&id.get())) {
            return Err(TitleRepositoryError::missing_taxon(TaxonomyKind::Genre));
        }
        Ok(())
    }
}

/// Genre links as a set: sorted, each genre once.
fn distinct(genres: &[TaxonId]) -> Vec<TaxonId> {
    genres
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[async_trait]
impl TitleRepository for InMemoryStore {
    async fn list(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Listing<Title>, TitleRepositoryError> {
        let tables = self.tables().await;
        let mut titles: Vec<Title> = tables
            .titles
            .iter()
            .filter(|(_, row)| tables.matches(row, filter))
            .map(|(id, row)| tables.assemble_title(*id, row))
            .collect();
        titles.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(paginate(titles, page))
    }

    async fn find(&self, id: TitleId) -> Result<Option<Title>, TitleRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .titles
            .get(&id.get())
            .map(|row| tables.assemble_title(id.get(), row)))
    }

    async fn insert(&self, title: &NewTitle) -> Result<Title, TitleRepositoryError> {
        let mut tables = self.tables().await;
        tables.known_links(title.category, &title.genres)?;
        let id = tables.title_ids.next();
        let row = TitleRow {
            name: title.name.clone(),
            year: title.year,
            description: title.description.clone(),
            category: title.category,
            genres: distinct(&title.genres),
        };
        let created = tables.assemble_title(id, &row);
        tables.titles.insert(id, row);
        Ok(created)
    }

    async fn update(
        &self,
        id: TitleId,
        changes: &TitleChanges,
    ) -> Result<Option<Title>, TitleRepositoryError> {
        let mut tables = self.tables().await;
        let Some(mut row) = tables.titles.get(&id.get()).cloned() else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(year) = changes.year {
            row.year = year;
        }
        if let Some(description) = &changes.description {
            row.description.clone_from(description);
        }
        if let Some(category) = changes.category {
            row.category = category;
        }
        if let Some(genres) = &changes.genres {
            row.genres = distinct(genres);
        }
        tables.known_links(row.category, &row.genres)?;
        let updated = tables.assemble_title(id.get(), &row);
        tables.titles.insert(id.get(), row);
        Ok(Some(updated))
    }

    async fn delete(&self, id: TitleId) -> Result<bool, TitleRepositoryError> {
        let mut tables = self.tables().await;
        if tables.titles.remove(&id.get()).is_none() {
            return Ok(false);
        }
        let reviews: Vec<i64> = tables
            .reviews
            .iter()
            .filter(|(_, review)| review.title_id == id.get())
            .map(|(review_id, _)| *review_id)
            .collect();
        for review_id in reviews {
            tables.drop_review(review_id);
        }
        Ok(true)
    }
}
