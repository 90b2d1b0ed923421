//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel, with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Validation and permission checks live in the services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraint-backed invariants**: uniqueness and cascades are enforced by
//!   the migrations; adapters translate constraint violations into port
//!   errors.
//!
//! # Example
//!
//! ```no_run
//! use yamdb::outbound::persistence::{DbPool, DieselTitleRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), yamdb::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/yamdb")).await?;
//! let titles = DieselTitleRepository::new(pool);
//! # let _ = titles;
//! # Ok(())
//! # }
//! ```

mod diesel_access_token_repository;
mod diesel_comment_repository;
pub(crate) mod diesel_helpers;
mod diesel_review_repository;
mod diesel_taxonomy_repository;
mod diesel_title_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_access_token_repository::DieselAccessTokenRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_taxonomy_repository::DieselTaxonomyRepository;
pub use diesel_title_repository::DieselTitleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
