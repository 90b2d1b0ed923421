//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process store with the same referential rules, used when
//!   no database is configured and by the test suites
//! - **mailer**: log-backed and recording mail adapters
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod mailer;
pub mod memory;
pub mod persistence;
