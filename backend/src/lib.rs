//! YaMDb backend library: domain model, HTTP adapter and persistence.
//!
//! The crate follows a hexagonal layout. [`domain`] owns the entities,
//! permission rules and use-case services; [`inbound::http`] exposes them
//! over Actix Web; [`outbound`] provides PostgreSQL and in-memory
//! repositories plus the mail adapter.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
