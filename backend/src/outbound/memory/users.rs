//! Accounts and bearer tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use super::{InMemoryStore, Tables, TokenRow, UserRow, contains_ignore_case, paginate};
use crate::domain::ports::{
    AccessTokenRepository, AccessTokenRepositoryError, Listing, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Email, NewUser, PendingConfirmation, SecretDigest, User, UserChanges, UserId, Username,
};

impl Tables {
    fn check_unique(
        &self,
        skip: Option<UserId>,
        username: &Username,
        email: &Email,
    ) -> Result<(), UserRepositoryError> {
        let others = self
            .users
            .values()
            .filter(|row| Some(row.user.id()) != skip);
        for row in others {
            if row.user.username() == username {
                return Err(UserRepositoryError::duplicate_username());
            }
            if row.user.email() == email {
                return Err(UserRepositoryError::duplicate_email());
            }
        }
        Ok(())
    }

    fn delete_user(&mut self, id: UserId) -> bool {
        if self.users.remove(&id.get()).is_none() {
            return false;
        }
        self.tokens.retain(|token| token.user_id != id);
        let authored: Vec<i64> = self
            .reviews
            .iter()
            .filter(|(_, review)| review.author_id == id)
            .map(|(review_id, _)| *review_id)
            .collect();
        for review_id in authored {
            self.drop_review(review_id);
        }
        self.comments.retain(|_, comment| comment.author_id != id);
        true
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.tables().await;
        Ok(tables.users.get(&id.get()).map(|row| row.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .users
            .values()
            .find(|row| row.user.username() == username)
            .map(|row| row.user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .users
            .values()
            .find(|row| row.user.email() == email)
            .map(|row| row.user.clone()))
    }

    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<User>, UserRepositoryError> {
        let tables = self.tables().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|row| {
                search
                    .as_deref()
                    .is_none_or(|term| contains_ignore_case(row.user.username().as_str(), term))
            })
            .map(|row| row.user.clone())
            .collect();
        users.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(paginate(users, page))
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut tables = self.tables().await;
        tables.check_unique(None, &user.username, &user.email)?;
        let id = UserId::new(tables.user_ids.next());
        let created = User::new(id, user.username.clone(), user.email.clone(), user.role)
            .with_profile(user.profile.clone());
        tables.users.insert(
            id.get(),
            UserRow {
                user: created.clone(),
                confirmation: None,
            },
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut tables = self.tables().await;
        let Some(current) = tables.users.get(&id.get()).map(|row| row.user.clone()) else {
            return Ok(None);
        };
        let updated = changes.apply_to(&current);
        tables.check_unique(Some(id), updated.username(), updated.email())?;
        if let Some(row) = tables.users.get_mut(&id.get()) {
            row.user = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        Ok(self.tables().await.delete_user(id))
    }

    async fn store_confirmation(
        &self,
        id: UserId,
        confirmation: &PendingConfirmation,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.tables().await;
        let row = tables
            .users
            .get_mut(&id.get())
            .ok_or_else(|| UserRepositoryError::query(format!("user {id} does not exist")))?;
        row.confirmation = Some(confirmation.clone());
        Ok(())
    }

    async fn consume_confirmation(
        &self,
        id: UserId,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<bool, UserRepositoryError> {
        let mut tables = self.tables().await;
        let Some(row) = tables.users.get_mut(&id.get()) else {
            return Ok(false);
        };
        let matches = row
            .confirmation
            .as_ref()
            .is_some_and(|pending| pending.accepts(digest, now));
        if matches {
            row.confirmation = None;
            row.user = row.user.clone().with_verified(true);
        }
        Ok(matches)
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryStore {
    async fn store(
        &self,
        user: UserId,
        digest: &SecretDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccessTokenRepositoryError> {
        let mut tables = self.tables().await;
        if !tables.users.contains_key(&user.get()) {
            return Err(AccessTokenRepositoryError::query(format!(
                "user {user} does not exist"
            )));
        }
        tables.tokens.push(TokenRow {
            digest: digest.clone(),
            user_id: user,
            expires_at,
        });
        Ok(())
    }

    async fn resolve(
        &self,
        digest: &SecretDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AccessTokenRepositoryError> {
        let tables = self.tables().await;
        Ok(tables
            .tokens
            .iter()
            .find(|token| &token.digest == digest && token.expires_at > now)
            .and_then(|token| tables.users.get(&token.user_id.get()))
            .map(|row| row.user.clone()))
    }
}
