//! PostgreSQL-backed `TaxonomyRepository` implementation.
//!
//! Categories and genres share a shape but live in separate tables. The
//! [`with_taxonomy_table`] macro binds the right table module for a kind so
//! each query is written once.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{Listing, TaxonomyRepository, TaxonomyRepositoryError};
use crate::domain::{Slug, Taxon, TaxonRecord, TaxonomyKind};

use super::diesel_helpers::{
    collect_rows, count_to_total, like_pattern, map_basic_diesel_error, map_basic_pool_error,
    page_bounds, unique_violation,
};
use super::models::TaxonRow;
use super::pool::{DbPool, PoolError};

/// Evaluate `$body` with `$table` bound to the schema module for `$kind`.
macro_rules! with_taxonomy_table {
    ($kind:expr, $table:ident => $body:expr) => {
        match $kind {
            TaxonomyKind::Category => {
                use super::schema::categories as $table;
                $body
            }
            TaxonomyKind::Genre => {
                use super::schema::genres as $table;
                $body
            }
        }
    };
}

/// Diesel-backed implementation of the `TaxonomyRepository` port.
#[derive(Clone)]
pub struct DieselTaxonomyRepository {
    pool: DbPool,
}

impl DieselTaxonomyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TaxonomyRepositoryError {
    map_basic_pool_error(error, TaxonomyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TaxonomyRepositoryError {
    match unique_violation(&error) {
        Some(_) => TaxonomyRepositoryError::duplicate_slug(),
        None => map_basic_diesel_error(
            error,
            TaxonomyRepositoryError::query,
            TaxonomyRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl TaxonomyRepository for DieselTaxonomyRepository {
    async fn list(
        &self,
        kind: TaxonomyKind,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<Taxon>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pattern = like_pattern(search.as_deref().unwrap_or_default());
        let (offset, limit) = page_bounds(page);

        let (total, rows): (i64, Vec<TaxonRow>) = with_taxonomy_table!(kind, table => {
            let total = table::table
                .filter(table::name.ilike(pattern.as_str()))
                .count()
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let rows = table::table
                .filter(table::name.ilike(pattern.as_str()))
                .order((table::name.asc(), table::slug.asc()))
                .offset(offset)
                .limit(limit)
                .select((table::id, table::name, table::slug))
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            (total, rows)
        });

        let items = collect_rows(
            rows.into_iter().map(TaxonRow::into_taxon),
            TaxonomyRepositoryError::query,
        )?;
        Ok(Listing::new(items, count_to_total(total)))
    }

    async fn find(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<Option<TaxonRecord>, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaxonRow> = with_taxonomy_table!(kind, table => {
            table::table
                .filter(table::slug.eq(slug.as_str()))
                .select((table::id, table::name, table::slug))
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
        });
        row.map(|row| row.into_record().map_err(TaxonomyRepositoryError::query))
            .transpose()
    }

    async fn insert(
        &self,
        kind: TaxonomyKind,
        taxon: &Taxon,
    ) -> Result<TaxonRecord, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: TaxonRow = with_taxonomy_table!(kind, table => {
            diesel::insert_into(table::table)
                .values((
                    table::name.eq(taxon.name.as_str()),
                    table::slug.eq(taxon.slug.as_str()),
                ))
                .returning((table::id, table::name, table::slug))
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?
        });
        row.into_record().map_err(TaxonomyRepositoryError::query)
    }

    async fn delete(
        &self,
        kind: TaxonomyKind,
        slug: &Slug,
    ) -> Result<bool, TaxonomyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = with_taxonomy_table!(kind, table => {
            diesel::delete(table::table.filter(table::slug.eq(slug.as_str())))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?
        });
        Ok(deleted > 0)
    }
}
