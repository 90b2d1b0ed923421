//! Confirmation codes stay single-use when exchanges interleave.
//!
//! The repository wrapper yields to the scheduler before every call, which
//! lets two exchanges of the same code interleave the way two requests
//! sharing a database would.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use rstest::{fixture, rstest};
use yamdb::domain::ports::{Listing, UserRepository, UserRepositoryError};
use yamdb::domain::{
    AuthService, AuthSettings, ConfirmationCode, Email, ErrorCode, NewUser, PendingConfirmation,
    SecretDigest, User, UserChanges, UserId, Username,
};
use yamdb::outbound::mailer::RecordingMailer;
use yamdb::outbound::memory::InMemoryStore;
use yamdb::test_support::{MutableClock, fixed_now, sample_email, sample_username};

/// Delegates to the in-memory store after giving other tasks a turn.
struct Interleaving(Arc<InMemoryStore>);

#[async_trait]
impl UserRepository for Interleaving {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.find_by_id(id).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.find_by_username(username).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.find_by_email(email).await
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<User>, UserRepositoryError> {
        self.0.list(search, page).await
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.insert(user).await
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.0.update(id, changes).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        self.0.delete(id).await
    }

    async fn store_confirmation(
        &self,
        id: UserId,
        confirmation: &PendingConfirmation,
    ) -> Result<(), UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.store_confirmation(id, confirmation).await
    }

    async fn consume_confirmation(
        &self,
        id: UserId,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError> {
        tokio::task::yield_now().await;
        self.0.consume_confirmation(id, digest, now).await
    }
}

struct Harness {
    service: AuthService,
    mailer: Arc<RecordingMailer>,
}

impl Harness {
    async fn signup(&self, username: &str) -> ConfirmationCode {
        let email = sample_email(&format!("{username}@example.com"));
        self.service
            .signup(sample_username(username), email.clone())
            .await
            .expect("signup succeeds");
        let mail = self.mailer.last_to(&email).expect("code mailed");
        let raw = mail
            .body
            .rsplit(' ')
            .next()
            .expect("code at end of body");
        ConfirmationCode::parse(raw).expect("mailed code parses")
    }
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let service = AuthService::new(
        Arc::new(Interleaving(store.clone())),
        store,
        mailer.clone(),
        Arc::new(MutableClock::new(fixed_now())),
        AuthSettings::default(),
    );
    Harness { service, mailer }
}

#[rstest]
#[tokio::test]
async fn concurrent_exchanges_of_one_code_mint_one_token(harness: Harness) {
    let code = harness.signup("ada").await;
    let username = sample_username("ada");

    let (first, second) = tokio::join!(
        harness.service.exchange_token(&username, &code),
        harness.service.exchange_token(&username, &code),
    );

    let outcomes = [first, second];
    let minted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(minted, 1, "one code must mint exactly one token");
    let rejected = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("the other exchange fails");
    assert_eq!(rejected.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn reissued_code_replaces_the_previous_one(harness: Harness) {
    let stale = harness.signup("ada").await;
    let fresh = harness.signup("ada").await;
    let username = sample_username("ada");

    let error = harness
        .service
        .exchange_token(&username, &stale)
        .await
        .expect_err("stale code rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    harness
        .service
        .exchange_token(&username, &fresh)
        .await
        .expect("fresh code accepted");
}
