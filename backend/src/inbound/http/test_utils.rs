//! Test helpers for inbound HTTP components.
//!
//! [`TestHarness`] wires the real domain services over the in-memory store
//! with a settable clock and a recording mailer, so handler tests exercise
//! the same code paths as the server without a database.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, test as actix_test, web};
use chrono::TimeDelta;
use serde_json::Value;

use crate::domain::ports::{
    AccessTokenRepository, ReviewRepository, TaxonomyRepository, TitleRepository, UserRepository,
};
use crate::domain::{
    AccessToken, AuthSettings, ContentText, NewReview, NewTitle, NewUser, ReleaseYear, Role, Score,
    Slug, Taxon, TaxonId, TaxonName, TaxonomyKind, TitleId, TitleName, User,
};
use crate::outbound::mailer::RecordingMailer;
use crate::outbound::memory::InMemoryStore;
use crate::test_support::{MutableClock, fixed_now, sample_email, sample_username};

use super::error::{configure_extractors, route_not_found};
use super::state::{HttpState, HttpStatePorts};

/// Page size used by handler tests so pagination is easy to trigger.
pub const TEST_PAGE_SIZE: u32 = 5;

/// In-memory backend plus handles for inspecting side effects.
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<MutableClock>,
    state: web::Data<HttpState>,
}

impl TestHarness {
    /// Fresh store with the clock at [`fixed_now`].
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let ports = HttpStatePorts::from_store(store.clone(), mailer.clone(), clock.clone());
        let state = HttpState::new(ports, AuthSettings::default(), TEST_PAGE_SIZE);
        Self {
            store,
            mailer,
            clock,
            state: web::Data::new(state),
        }
    }

    /// Shared handler state.
    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    /// Full `/api/v1` application over this harness.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state())
            .configure(configure_extractors)
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .service(web::scope("/api/v1").configure(super::configure))
            .default_service(web::to(route_not_found))
    }

    /// Send one request through a fresh app; empty bodies read as `null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let app = actix_test::init_service(self.app()).await;
        let mut request = actix_test::TestRequest::default().method(method).uri(uri);
        if let Some(token) = token {
            request = request.insert_header(bearer(token));
        }
        if let Some(body) = body {
            request = request.set_json(body);
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status().as_u16();
        let bytes = actix_test::read_body(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    /// Create a verified account with `role` and return it.
    pub async fn user(&self, username: &str, role: Role) -> User {
        let mut account = NewUser::signup(
            sample_username(username),
            sample_email(&format!("{username}@example.com")),
        );
        account.role = role;
        UserRepository::insert(self.store.as_ref(), &account)
            .await
            .expect("fixture user inserted")
    }

    /// Issue a bearer token for an existing user.
    pub async fn token_of(&self, user: &User) -> String {
        let token = AccessToken::generate();
        AccessTokenRepository::store(
            self.store.as_ref(),
            user.id(),
            &token.digest(),
            fixed_now() + TimeDelta::days(1),
        )
        .await
        .expect("fixture token stored");
        token.expose().to_owned()
    }

    /// Create an account and return a bearer token for it.
    pub async fn token_for(&self, username: &str, role: Role) -> String {
        let user = self.user(username, role).await;
        self.token_of(&user).await
    }

    /// Latest confirmation code mailed to `email`.
    pub fn mailed_code(&self, email: &str) -> String {
        let mail = self
            .mailer
            .last_to(&sample_email(email))
            .expect("confirmation mail sent");
        mail.body
            .strip_prefix("Your confirmation code: ")
            .expect("body carries the code")
            .trim()
            .to_owned()
    }

    /// Insert a category or genre.
    pub async fn taxon(&self, kind: TaxonomyKind, slug: &str) -> TaxonId {
        let taxon = Taxon {
            name: TaxonName::new(slug.to_uppercase()).expect("fixture name"),
            slug: Slug::new(slug).expect("fixture slug"),
        };
        TaxonomyRepository::insert(self.store.as_ref(), kind, &taxon)
            .await
            .expect("fixture taxon inserted")
            .id
    }

    /// Insert a title without taxonomy links.
    pub async fn title(&self, name: &str, year: i32) -> TitleId {
        let title = NewTitle {
            name: TitleName::new(name).expect("fixture title name"),
            year: ReleaseYear::from_stored(year),
            description: None,
            category: None,
            genres: Vec::new(),
        };
        TitleRepository::insert(self.store.as_ref(), &title)
            .await
            .expect("fixture title inserted")
            .id
    }

    /// Insert a review by `author` directly into the store.
    pub async fn review(&self, title: TitleId, author: &User, score: u8) -> i64 {
        let review = NewReview {
            title_id: title,
            author_id: author.id(),
            text: ContentText::new(format!("{} says {score}", author.username())).expect("text"),
            score: Score::new(score).expect("fixture score"),
            pub_date: fixed_now(),
        };
        ReviewRepository::insert(self.store.as_ref(), &review)
            .await
            .expect("fixture review inserted")
            .id
            .get()
    }
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Messages recorded against `field` in an error body.
pub fn field_errors<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get("details")
        .and_then(|details| details.get("fields"))
        .and_then(|fields| fields.get(field))
}
