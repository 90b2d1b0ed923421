//! Categories and genres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use pagination::PageRequest;

use super::{InMemoryStore, Sequence, Tables, contains_ignore_case, paginate};
use crate::domain::ports::{Listing, TaxonomyRepository, TaxonomyRepositoryError};
use crate::domain::{Slug, Taxon, TaxonId, TaxonRecord, TaxonomyKind};

impl Tables {
    pub(super) fn taxa(&self, kind: TaxonomyKind) -> &BTreeMap<i64, Taxon> {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Genre => &self.genres,
        }
    }

    fn taxa_mut(&mut self, kind: TaxonomyKind) -> (&mut BTreeMap<i64, Taxon>, &mut Sequence) {
        match kind {
            TaxonomyKind::Category => (&mut self.categories, &mut self.category_ids),
            TaxonomyKind::Genre => (&mut self.genres, &mut self.genre_ids),
        }
    }

    fn find_taxon(&self, kind: TaxonomyKind, slug: &Slug) -> Option<TaxonRecord> {
        self.taxa(kind)
            .iter()
            .find(|(_, taxon)| &taxon.slug == slug)
            .map(|(id, taxon)| TaxonRecord {
                id: TaxonId::new(*id),
                taxon: taxon.clone(),
            })
    }

    fn delete_taxon(&mut self, kind: TaxonomyKind, slug: &Slug) -> bool {
        let Some(record) = self.find_taxon(kind, slug) else {
            return false;
        };
        self.taxa_mut(kind).0.remove(&record.id.get());
        for title in self.titles.values_mut() {
            match kind {
                TaxonomyKind::Category => {
                    if title.category == Some(record.id) {
                        title.category = None;
                    }
                }
                TaxonomyKind::Genre => title.genres.retain(|genre| *genre != record.id),
            }
        }
        true
    }
}

#[async_trait]
impl TaxonomyRepository for InMemoryStore {
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<Taxon>, TaxonomyRepositoryError> {
        let tables = self.tables().await;
        let mut taxa: Vec<Taxon> = tables
            .taxa(kind)
            .values()
            .filter(|taxon| {
                search
                    .as_deref()
                    .is_none_or(|term| contains_ignore_case(taxon.name.as_str(), term))
            })
            .cloned()
            .collect();
        taxa.sort_by(|a, b| {
            a.name
                .as_str()
                .cmp(b.name.as_str())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(paginate(taxa, page))
    }

    async fn find(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<TaxonRecord>, TaxonomyRepositoryError> {
        Ok(self.tables().await.find_taxon(kind, slug))
    }

    async fn insert(
        &self,
        kind: TaxonomyKind,
        taxon: &Taxon,
    ) -> Result<TaxonRecord, TaxonomyRepositoryError> {
        let mut tables = self.tables().await;
        if tables.find_taxon(kind, &taxon.slug).is_some() {
            return Err(TaxonomyRepositoryError::duplicate_slug());
        }
        let (rows, ids) = tables.taxa_mut(kind);
        let id = ids.next();
        rows.insert(id, taxon.clone());
        Ok(TaxonRecord {
            id: TaxonId::new(id),
            taxon: taxon.clone(),
        })
    }

    async fn delete(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<bool, TaxonomyRepositoryError> {
        Ok(self.tables().await.delete_taxon(kind, slug))
    }
}
