//! Scenario world driving the full `/api/v1` application in memory.
//!
//! Each world owns an Actix system runner so synchronous step functions can
//! drive async handlers. Requests go through a freshly initialised app over
//! shared state, mirroring what the server wires at startup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{App, test as actix_test, web};
use chrono::TimeDelta;
use serde_json::Value;
use yamdb::Trace;
use yamdb::domain::AuthSettings;
use yamdb::inbound::http::error::{configure_extractors, route_not_found};
use yamdb::inbound::http::state::{HttpState, HttpStatePorts};
use yamdb::outbound::mailer::RecordingMailer;
use yamdb::outbound::memory::InMemoryStore;
use yamdb::test_support::{MutableClock, fixed_now, sample_email};

/// Status and JSON body of one response; empty bodies read as `null`.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

/// Shared state for one scenario.
pub struct ApiWorld {
    runner: actix_rt::SystemRunner,
    mailer: Arc<RecordingMailer>,
    clock: Arc<MutableClock>,
    state: web::Data<HttpState>,
    tokens: RefCell<HashMap<String, String>>,
    last: RefCell<Option<Reply>>,
}

impl Default for ApiWorld {
    fn default() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let ports = HttpStatePorts::from_store(store, mailer.clone(), clock.clone());
        Self {
            runner: actix_rt::System::new(),
            mailer,
            clock,
            state: web::Data::new(HttpState::new(ports, AuthSettings::default(), 10)),
            tokens: RefCell::new(HashMap::new()),
            last: RefCell::new(None),
        }
    }
}

impl ApiWorld {
    /// Send a request, optionally as a user whose token was recorded.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        as_user: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let token = as_user.map(|username| self.token_of(username));
        let state = self.state.clone();
        let reply = self.runner.block_on(async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(state)
                    .configure(configure_extractors)
                    .wrap(NormalizePath::new(TrailingSlash::Trim))
                    .wrap(Trace)
                    .service(web::scope("/api/v1").configure(yamdb::inbound::http::configure))
                    .default_service(web::to(route_not_found)),
            )
            .await;
            let mut request = actix_test::TestRequest::default().method(method).uri(path);
            if let Some(token) = token {
                request = request.insert_header(("Authorization", format!("Bearer {token}")));
            }
            if let Some(body) = body {
                request = request.set_json(body);
            }
            let response = actix_test::call_service(&app, request.to_request()).await;
            let status = response.status().as_u16();
            let bytes = actix_test::read_body(response).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON response body")
            };
            Reply { status, body }
        });
        self.last.replace(Some(reply.clone()));
        reply
    }

    /// The most recent reply.
    pub fn last(&self) -> Reply {
        self.last.borrow().clone().expect("a request was sent")
    }

    /// Remember the bearer token issued to `username`.
    pub fn remember_token(&self, username: &str, token: String) {
        self.tokens.borrow_mut().insert(username.to_owned(), token);
    }

    fn token_of(&self, username: &str) -> String {
        self.tokens
            .borrow()
            .get(username)
            .cloned()
            .unwrap_or_else(|| panic!("no token recorded for {username}"))
    }

    /// Latest confirmation code mailed to `email`.
    pub fn mailed_code(&self, email: &str) -> String {
        let mail = self
            .mailer
            .last_to(&sample_email(email))
            .expect("confirmation mail sent");
        mail.body
            .strip_prefix("Your confirmation code: ")
            .expect("mail carries the code")
            .trim()
            .to_owned()
    }

    /// Move the shared clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }

    /// Bootstrap an administrator and record a token for them.
    pub fn admin(&self, username: &str) {
        let auth = self.state.auth.clone();
        let username_value = yamdb::test_support::sample_username(username);
        let email = sample_email(&format!("{username}@example.com"));
        self.runner.block_on(async move {
            auth.bootstrap_admin(username_value, email)
                .await
                .expect("bootstrap admin");
        });
        self.sign_in(username, &format!("{username}@example.com"));
    }

    /// Sign up `username` and exchange the mailed code for a token.
    pub fn sign_in(&self, username: &str, email: &str) {
        let signup = self.send(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(serde_json::json!({"username": username, "email": email})),
        );
        assert_eq!(signup.status, 200, "{}", signup.body);
        let code = self.mailed_code(email);
        let reply = self.send(
            Method::POST,
            "/api/v1/auth/token",
            None,
            Some(serde_json::json!({"username": username, "confirmation_code": code})),
        );
        assert_eq!(reply.status, 200, "{}", reply.body);
        let token = reply
            .body
            .get("token")
            .and_then(Value::as_str)
            .expect("token in response")
            .to_owned();
        self.remember_token(username, token);
    }
}
