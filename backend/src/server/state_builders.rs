//! Builders for the HTTP state from server configuration.
//!
//! A configured database pool selects the Diesel repositories; without one
//! every port is served by a single in-memory store.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use yamdb::domain::ports::Mailer;
use yamdb::inbound::http::state::{HttpState, HttpStatePorts};
use yamdb::outbound::mailer::TracingMailer;
use yamdb::outbound::memory::InMemoryStore;
use yamdb::outbound::persistence::{
    DbPool, DieselAccessTokenRepository, DieselCommentRepository, DieselReviewRepository,
    DieselTaxonomyRepository, DieselTitleRepository, DieselUserRepository,
};

use super::ServerConfig;

fn diesel_ports(pool: &DbPool, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tokens: Arc::new(DieselAccessTokenRepository::new(pool.clone())),
        taxonomies: Arc::new(DieselTaxonomyRepository::new(pool.clone())),
        titles: Arc::new(DieselTitleRepository::new(pool.clone())),
        reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        mailer,
        clock,
    }
}

/// Select repository adapters for `config`.
fn build_ports(config: &ServerConfig) -> HttpStatePorts {
    let mailer: Arc<dyn Mailer> = Arc::new(TracingMailer);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => diesel_ports(pool, mailer, clock),
        None => HttpStatePorts::from_store(Arc::new(InMemoryStore::new()), mailer, clock),
    }
}

/// Build the shared HTTP state.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        build_ports(config),
        config.auth.clone(),
        config.page_size,
    ))
}
