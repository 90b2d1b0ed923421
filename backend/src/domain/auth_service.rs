//! Signup, confirmation-code exchange and bearer resolution.
//!
//! Accounts move through `unverified → code-issued → verified`. Signup issues
//! a fresh code (replacing any outstanding one) and mails it; exchanging a
//! matching, unexpired code yields a bearer token, consumes the code and
//! marks the account verified. Only digests of codes and tokens are stored.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{AccessTokenRepository, Mailer, OutgoingMail, UserRepository};
use crate::domain::{
    AccessToken, Actor, ConfirmationCode, Email, Error, NewUser, PendingConfirmation, Profile,
    Role, User, UserChanges, Username,
};

const CONFIRMATION_SUBJECT: &str = "Your YaMDb confirmation code";

/// Lifetimes and sender address used by [`AuthService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// How long an issued bearer token stays valid.
    pub token_ttl: Duration,
    /// How long a confirmation code stays valid.
    pub code_ttl: Duration,
    /// Sender address for confirmation mail.
    pub mail_from: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::days(1),
            code_ttl: Duration::hours(1),
            mail_from: "noreply@yamdb.local".to_owned(),
        }
    }
}

/// Account registration and authentication use-cases.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AccessTokenRepository>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    settings: AuthSettings,
}

impl AuthService {
    /// Create a new service with the given collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AccessTokenRepository>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            clock,
            settings,
        }
    }

    /// Register `username`/`email`, or re-issue a code for an existing pair.
    ///
    /// # Errors
    ///
    /// Returns a field validation error when the email belongs to another
    /// account or the username is registered with a different email.
    pub async fn signup(&self, username: Username, email: Email) -> Result<User, Error> {
        let email_owner = self.users.find_by_email(&email).await?;
        if email_owner.is_some_and(|owner| owner.username() != &username) {
            return Err(Error::field(
                "email",
                "this email is registered to a different username",
            ));
        }

        let user = match self.users.find_by_username(&username).await? {
            Some(existing) if existing.email() != &email => {
                return Err(Error::field(
                    "username",
                    "this username is registered with a different email",
                ));
            }
            Some(existing) => existing,
            None => self.users.insert(&NewUser::signup(username, email)).await?,
        };

        let code = ConfirmationCode::generate();
        let pending = PendingConfirmation::issue(&code, self.clock.utc(), self.settings.code_ttl);
        self.users.store_confirmation(user.id(), &pending).await?;
        self.dispatch_code(&user, &code).await;
        Ok(user)
    }

    /// Exchange a confirmation code for a bearer token.
    ///
    /// The code is consumed before the token is minted, so of several
    /// concurrent exchanges of one code exactly one succeeds. A failure while
    /// storing the token leaves the code spent; signing up again issues a
    /// new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::not_found`] for an unknown username and a field
    /// validation error when no matching, unexpired code is outstanding.
    pub async fn exchange_token(
        &self,
        username: &Username,
        code: &ConfirmationCode,
    ) -> Result<AccessToken, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))?;

        let now = self.clock.utc();
        let consumed = self
            .users
            .consume_confirmation(user.id(), &code.digest(), now)
            .await?;
        if !consumed {
            return Err(Error::field(
                "confirmation_code",
                "invalid or expired confirmation code",
            ));
        }

        let token = AccessToken::generate();
        self.tokens
            .store(user.id(), &token.digest(), now + self.settings.token_ttl)
            .await?;
        info!(user = %user.username(), "access token issued");
        Ok(token)
    }

    /// Resolve a presented bearer token to an authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::unauthorized`] when the token is unknown or expired.
    pub async fn authenticate(&self, token: &AccessToken) -> Result<Actor, Error> {
        self.tokens
            .resolve(&token.digest(), self.clock.utc())
            .await?
            .map(Actor::Authenticated)
            .ok_or_else(|| Error::unauthorized("invalid or expired token"))
    }

    /// Ensure an administrator account exists for `username`.
    ///
    /// An existing account with that username is promoted; otherwise a new
    /// one is created with an empty profile.
    ///
    /// # Errors
    ///
    /// Propagates repository failures, including a duplicate email held by a
    /// different account.
    pub async fn bootstrap_admin(&self, username: Username, email: Email) -> Result<User, Error> {
        if let Some(existing) = self.users.find_by_username(&username).await? {
            if existing.role() == Role::Admin {
                return Ok(existing);
            }
            let changes = UserChanges {
                role: Some(Role::Admin),
                ..UserChanges::default()
            };
            let promoted = self
                .users
                .update(existing.id(), &changes)
                .await?
                .ok_or_else(|| Error::internal("bootstrap admin vanished during promotion"))?;
            info!(user = %promoted.username(), "promoted bootstrap administrator");
            return Ok(promoted);
        }

        let created = self
            .users
            .insert(&NewUser {
                username,
                email,
                role: Role::Admin,
                profile: Profile::default(),
            })
            .await?;
        info!(user = %created.username(), "created bootstrap administrator");
        Ok(created)
    }

    async fn dispatch_code(&self, user: &User, code: &ConfirmationCode) {
        let mail = OutgoingMail {
            from: self.settings.mail_from.clone(),
            to: user.email().clone(),
            subject: CONFIRMATION_SUBJECT.to_owned(),
            body: format!("Your confirmation code: {}", code.expose()),
        };
        if let Err(error) = self.mailer.send(&mail).await {
            warn!(user = %user.username(), %error, "failed to send confirmation code");
        }
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
