//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;
use pagination::DEFAULT_PAGE_SIZE;

use crate::domain::ports::{
    AccessTokenRepository, CommentRepository, Mailer, ReviewRepository, TaxonomyRepository,
    TitleRepository, UserRepository,
};
use crate::domain::{
    AuthService, AuthSettings, CatalogueService, ReviewsService, TitlesService, UsersService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn AccessTokenRepository>,
    pub taxonomies: Arc<dyn TaxonomyRepository>,
    pub titles: Arc<dyn TitleRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl HttpStatePorts {
    /// Use one store for every repository port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use yamdb::inbound::http::state::HttpStatePorts;
    /// use yamdb::outbound::mailer::TracingMailer;
    /// use yamdb::outbound::memory::InMemoryStore;
    ///
    /// let ports = HttpStatePorts::from_store(
    ///     Arc::new(InMemoryStore::new()),
    ///     Arc::new(TracingMailer),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = ports;
    /// ```
    pub fn from_store<S>(store: Arc<S>, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> Self
    where
        S: UserRepository
            + AccessTokenRepository
            + TaxonomyRepository
            + TitleRepository
            + ReviewRepository
            + CommentRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            tokens: store.clone(),
            taxonomies: store.clone(),
            titles: store.clone(),
            reviews: store.clone(),
            comments: store,
            mailer,
            clock,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UsersService>,
    pub catalogue: Arc<CatalogueService>,
    pub titles: Arc<TitlesService>,
    pub reviews: Arc<ReviewsService>,
    /// Page size applied when a list request omits `page_size`.
    pub page_size: u32,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(ports: HttpStatePorts, auth: AuthSettings, page_size: u32) -> Self {
        let HttpStatePorts {
            users,
            tokens,
            taxonomies,
            titles,
            reviews,
            comments,
            mailer,
            clock,
        } = ports;

        Self {
            auth: Arc::new(AuthService::new(
                users.clone(),
                tokens,
                mailer,
                clock.clone(),
                auth,
            )),
            users: Arc::new(UsersService::new(users)),
            catalogue: Arc::new(CatalogueService::new(taxonomies.clone())),
            titles: Arc::new(TitlesService::new(
                titles.clone(),
                taxonomies,
                clock.clone(),
            )),
            reviews: Arc::new(ReviewsService::new(titles, reviews, comments, clock)),
            page_size,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, AuthSettings::default(), DEFAULT_PAGE_SIZE)
    }
}
