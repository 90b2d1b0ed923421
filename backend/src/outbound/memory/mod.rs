//! In-process store implementing every repository port.
//!
//! Used when no database is configured and by the HTTP and behaviour test
//! suites. Tables mirror the relational schema: identifiers are allocated
//! from per-table sequences, uniqueness constraints are checked on write and
//! deletes cascade (or null out) exactly as the foreign keys in the
//! migrations do. All access is serialised through one async mutex.

mod content;
mod taxonomy;
mod titles;
mod users;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::ports::Listing;
use crate::domain::{
    ContentText, PendingConfirmation, ReleaseYear, Score, SecretDigest, Taxon, TaxonId,
    TitleName, User, UserId, Username,
};

#[derive(Debug, Clone)]
struct UserRow {
    user: User,
    confirmation: Option<PendingConfirmation>,
}

#[derive(Debug, Clone)]
struct TokenRow {
    digest: SecretDigest,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TitleRow {
    name: TitleName,
    year: ReleaseYear,
    description: Option<String>,
    category: Option<TaxonId>,
    genres: Vec<TaxonId>,
}

#[derive(Debug, Clone)]
struct ReviewRow {
    title_id: i64,
    author_id: UserId,
    text: ContentText,
    score: Score,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    review_id: i64,
    author_id: UserId,
    text: ContentText,
    pub_date: DateTime<Utc>,
}

/// Monotonic identifier sequence starting at 1.
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, UserRow>,
    user_ids: Sequence,
    tokens: Vec<TokenRow>,
    categories: BTreeMap<i64, Taxon>,
    category_ids: Sequence,
    genres: BTreeMap<i64, Taxon>,
    genre_ids: Sequence,
    titles: BTreeMap<i64, TitleRow>,
    title_ids: Sequence,
    reviews: BTreeMap<i64, ReviewRow>,
    review_ids: Sequence,
    comments: BTreeMap<i64, CommentRow>,
    comment_ids: Sequence,
}

impl Tables {
    /// Username of `id`, as a join on the users table would produce.
    fn username_of(&self, id: UserId) -> Option<Username> {
        self.users
            .get(&id.get())
            .map(|row| row.user.username().clone())
    }

    /// Remove a review and the comments attached to it.
    fn drop_review(&mut self, review_id: i64) -> bool {
        let existed = self.reviews.remove(&review_id).is_some();
        self.comments.retain(|_, comment| comment.review_id != review_id);
        existed
    }
}

/// Shared in-memory database.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use yamdb::outbound::memory::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let _users: Arc<dyn yamdb::domain::ports::UserRepository> = store.clone();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }
}

/// Slice `items` to the requested page and wrap it with the total.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> Listing<T> {
    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Listing::new(items, total)
}

/// Case-insensitive substring match used by the `search` filters.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests;
