//! PostgreSQL-backed `TitleRepository` implementation.
//!
//! A title is spread over `titles`, `title_genres` and the two taxonomy
//! tables, and its rating is aggregated from `reviews` on every read. Loaded
//! rows are hydrated in three batched queries regardless of page size.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{count, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{Listing, TitleRepository, TitleRepositoryError};
use crate::domain::{
    NewTitle, Rating, ScoreTally, Taxon, TaxonId, TaxonomyKind, Title, TitleChanges, TitleFilter,
    TitleId,
};

use super::diesel_helpers::{
    count_to_total, foreign_key_violation, like_pattern, map_basic_diesel_error,
    map_basic_pool_error, page_bounds,
};
use super::models::{NewTitleRow, TaxonRow, TitleGenreRow, TitleRow, TitleUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, genres, reviews, title_genres, titles};

/// Diesel-backed implementation of the `TitleRepository` port.
#[derive(Clone)]
pub struct DieselTitleRepository {
    pool: DbPool,
}

impl DieselTitleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TitleRepositoryError {
    map_basic_pool_error(error, TitleRepositoryError::connection)
}

const CATEGORY_LINK: &str = "titles_category_id_fkey";
const GENRE_LINK: &str = "title_genres_genre_id_fkey";

fn map_diesel_error(error: diesel::result::Error) -> TitleRepositoryError {
    match foreign_key_violation(&error) {
        Some(CATEGORY_LINK) => TitleRepositoryError::missing_taxon(TaxonomyKind::Category),
        Some(GENRE_LINK) => TitleRepositoryError::missing_taxon(TaxonomyKind::Genre),
        _ => map_basic_diesel_error(
            error,
            TitleRepositoryError::query,
            TitleRepositoryError::connection,
        ),
    }
}

// Required by `AsyncConnection::transaction`.
impl From<diesel::result::Error> for TitleRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

/// Filter values after slugs have been resolved to identifiers.
struct ResolvedFilter {
    category_id: Option<i64>,
    genre_id: Option<i64>,
    name_pattern: Option<String>,
    year: Option<i32>,
}

impl ResolvedFilter {
    fn query(&self) -> titles::BoxedQuery<'_, Pg> {
        let mut query = titles::table.into_boxed();
        if let Some(category_id) = self.category_id {
            query = query.filter(titles::category_id.eq(category_id));
        }
        if let Some(genre_id) = self.genre_id {
            let tagged = title_genres::table
                .filter(title_genres::genre_id.eq(genre_id))
                .select(title_genres::title_id);
            query = query.filter(titles::id.eq_any(tagged));
        }
        if let Some(pattern) = &self.name_pattern {
            query = query.filter(titles::name.ilike(pattern.as_str()));
        }
        if let Some(year) = self.year {
            query = query.filter(titles::year.eq(year));
        }
        query
    }
}

/// Resolve the slug filters; `None` when a slug names no taxon, in which case
/// nothing can match.
async fn resolve_filter(
    conn: &mut AsyncPgConnection,
    filter: &TitleFilter,
) -> Result<Option<ResolvedFilter>, TitleRepositoryError> {
    let category_id = match &filter.category {
        Some(slug) => {
            let found: Option<i64> = categories::table
                .filter(categories::slug.eq(slug.as_str()))
                .select(categories::id)
                .first(conn)
                .await
                .optional()?;
            match found {
                Some(id) => Some(id),
                None => return Ok(None),
            }
        }
        None => None,
    };
    let genre_id = match &filter.genre {
        Some(slug) => {
            let found: Option<i64> = genres::table
                .filter(genres::slug.eq(slug.as_str()))
                .select(genres::id)
                .first(conn)
                .await
                .optional()?;
            match found {
                Some(id) => Some(id),
                None => return Ok(None),
            }
        }
        None => None,
    };
    Ok(Some(ResolvedFilter {
        category_id,
        genre_id,
        name_pattern: filter.name.as_deref().map(like_pattern),
        year: filter.year,
    }))
}

fn taxon(row: TaxonRow) -> Result<Taxon, TitleRepositoryError> {
    row.into_taxon().map_err(TitleRepositoryError::query)
}

/// Attach categories, genres and ratings to `rows`, preserving their order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<TitleRow>,
) -> Result<Vec<Title>, TitleRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let title_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let category_ids: Vec<i64> = rows.iter().filter_map(|row| row.category_id).collect();

    let category_rows: Vec<TaxonRow> = categories::table
        .filter(categories::id.eq_any(&category_ids))
        .select((categories::id, categories::name, categories::slug))
        .load(conn)
        .await?;
    let mut categories_by_id = HashMap::new();
    for row in category_rows {
        categories_by_id.insert(row.id, taxon(row)?);
    }

    let genre_rows: Vec<(i64, TaxonRow)> = title_genres::table
        .inner_join(genres::table)
        .filter(title_genres::title_id.eq_any(&title_ids))
        .order(genres::slug.asc())
        .select((title_genres::title_id, (genres::id, genres::name, genres::slug)))
        .load(conn)
        .await?;
    let mut genres_by_title: HashMap<i64, Vec<Taxon>> = HashMap::new();
    for (title_id, row) in genre_rows {
        genres_by_title.entry(title_id).or_default().push(taxon(row)?);
    }

    let tallies: Vec<(i64, Option<i64>, i64)> = reviews::table
        .filter(reviews::title_id.eq_any(&title_ids))
        .group_by(reviews::title_id)
        .select((reviews::title_id, sum(reviews::score), count(reviews::id)))
        .load(conn)
        .await?;
    let ratings: HashMap<i64, Rating> = tallies
        .into_iter()
        .filter_map(|(title_id, total, reviews)| {
            let tally = ScoreTally {
                total: total.unwrap_or_default(),
                count: reviews,
            };
            Rating::from_tally(tally).map(|rating| (title_id, rating))
        })
        .collect();

    rows.into_iter()
        .map(|row| {
            let (name, year) = row.parts().map_err(TitleRepositoryError::query)?;
            Ok(Title {
                id: row.title_id(),
                name,
                year,
                description: row.description,
                category: row
                    .category_id
                    .and_then(|id| categories_by_id.get(&id).cloned()),
                genres: genres_by_title.remove(&row.id).unwrap_or_default(),
                rating: ratings.get(&row.id).copied(),
            })
        })
        .collect()
}

async fn load_one(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> Result<Option<Title>, TitleRepositoryError> {
    let row: Option<TitleRow> = titles::table
        .find(id)
        .select(TitleRow::as_select())
        .first(conn)
        .await
        .optional()?;
    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn link_genres(
    conn: &mut AsyncPgConnection,
    title_id: i64,
    genre_ids: &[TaxonId],
) -> Result<(), TitleRepositoryError> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    let links: Vec<TitleGenreRow> = genre_ids
        .iter()
        .map(|genre| TitleGenreRow {
            title_id,
            genre_id: genre.get(),
        })
        .collect();
    diesel::insert_into(title_genres::table)
        .values(&links)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;
    Ok(())
}

fn changeset(changes: &TitleChanges) -> TitleUpdate<'_> {
    TitleUpdate {
        name: changes.name.as_ref().map(|name| name.as_str()),
        year: changes.year.map(|year| year.get()),
        description: changes.description.as_ref().map(Option::as_deref),
        category_id: changes.category.map(|category| category.map(TaxonId::get)),
    }
}

#[async_trait]
impl TitleRepository for DieselTitleRepository {
    async fn list(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> Result<Listing<Title>, TitleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(resolved) = resolve_filter(&mut conn, filter).await? else {
            return Ok(Listing::empty());
        };
        let (offset, limit) = page_bounds(page);

        let total: i64 = resolved
            .query()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<TitleRow> = resolved
            .query()
            .order((titles::year.desc(), titles::name.asc(), titles::id.asc()))
            .offset(offset)
            .limit(limit)
            .select(TitleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = hydrate(&mut conn, rows).await?;
        Ok(Listing::new(items, count_to_total(total)))
    }

    async fn find(&self, id: TitleId) -> Result<Option<Title>, TitleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_one(&mut conn, id.get()).await
    }

    async fn insert(&self, title: &NewTitle) -> Result<Title, TitleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewTitleRow {
            name: title.name.as_str(),
            year: title.year.get(),
            description: title.description.as_deref(),
            category_id: title.category.map(TaxonId::get),
        };

        let created = conn
            .transaction::<_, TitleRepositoryError, _>(|conn| {
                async move {
                    let row: TitleRow = diesel::insert_into(titles::table)
                        .values(&new_row)
                        .returning(TitleRow::as_returning())
                        .get_result(conn)
                        .await?;
                    link_genres(conn, row.id, &title.genres).await?;
                    load_one(conn, row.id).await
                }
                .scope_boxed()
            })
            .await?;

        created.ok_or_else(|| TitleRepositoryError::query("inserted title vanished"))
    }

    async fn update(
        &self,
        id: TitleId,
        changes: &TitleChanges,
    ) -> Result<Option<Title>, TitleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = changeset(changes);

        conn.transaction::<_, TitleRepositoryError, _>(|conn| {
            async move {
                let exists = if update.is_empty() {
                    let found: Option<i64> = titles::table
                        .find(id.get())
                        .select(titles::id)
                        .first(conn)
                        .await
                        .optional()?;
                    found.is_some()
                } else {
                    let updated = diesel::update(titles::table.find(id.get()))
                        .set(&update)
                        .execute(conn)
                        .await?;
                    updated > 0
                };
                if !exists {
                    return Ok(None);
                }
                if let Some(genre_ids) = &changes.genres {
                    diesel::delete(title_genres::table.filter(title_genres::title_id.eq(id.get())))
                        .execute(conn)
                        .await?;
                    link_genres(conn, id.get(), genre_ids).await?;
                }
                load_one(conn, id.get()).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: TitleId) -> Result<bool, TitleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(titles::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
