//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Repositories speak in validated domain types and report failures through
//! per-port error enums; each enum converts into the HTTP-facing
//! [`crate::domain::Error`] so services can propagate with `?`.

mod macros;
pub(crate) use macros::{define_port_error, port_error_into_domain};

mod access_token_repository;
mod comment_repository;
mod mailer;
mod review_repository;
mod taxonomy_repository;
mod title_repository;
mod user_repository;

#[cfg(test)]
pub use access_token_repository::MockAccessTokenRepository;
pub use access_token_repository::{AccessTokenRepository, AccessTokenRepositoryError};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{Mailer, MailerError, OutgoingMail};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::{TaxonomyRepository, TaxonomyRepositoryError};
#[cfg(test)]
pub use title_repository::MockTitleRepository;
pub use title_repository::{TitleRepository, TitleRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};

/// One page of repository results together with the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// Number of items matching the query across all pages.
    pub total: u64,
}

impl<T> Listing<T> {
    /// Wrap a page of items.
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// An empty result set.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Convert each item while keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
