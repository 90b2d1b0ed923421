//! Account administration and self-service profile use-cases.

use std::sync::Arc;

use pagination::PageRequest;
use tracing::info;

use crate::domain::ports::{Listing, UserRepository};
use crate::domain::{Actor, Capability, Error, NewUser, User, UserChanges, Username};

/// User management service.
#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserRepository>,
}

impl UsersService {
    /// Create a new service backed by `users`.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// List accounts, optionally filtered by a username substring.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageUsers`].
    pub async fn list(
        &self,
        actor: &Actor,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Listing<User>, Error> {
        actor.require(Capability::ManageUsers)?;
        let search = search.filter(|term| !term.trim().is_empty());
        Ok(self.users.list(search, page).await?)
    }

    /// Create an account on behalf of an administrator.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageUsers`]; duplicate usernames or emails
    /// surface as field validation errors.
    pub async fn create(&self, actor: &Actor, user: NewUser) -> Result<User, Error> {
        let admin = actor.require_user(Capability::ManageUsers)?;
        let created = self.users.insert(&user).await?;
        info!(admin = %admin.username(), user = %created.username(), "user created");
        Ok(created)
    }

    /// Fetch an account by username.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageUsers`]; unknown usernames yield
    /// `not_found`.
    pub async fn get(&self, actor: &Actor, username: &Username) -> Result<User, Error> {
        actor.require(Capability::ManageUsers)?;
        self.lookup(username).await
    }

    /// Apply a partial update to an account.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageUsers`]; unknown usernames yield
    /// `not_found`.
    pub async fn update(
        &self,
        actor: &Actor,
        username: &Username,
        changes: UserChanges,
    ) -> Result<User, Error> {
        actor.require(Capability::ManageUsers)?;
        let existing = self.lookup(username).await?;
        self.users
            .update(existing.id(), &changes)
            .await?
            .ok_or_else(|| Self::missing(username))
    }

    /// Delete an account together with its content and tokens.
    ///
    /// # Errors
    ///
    /// Requires [`Capability::ManageUsers`]; unknown usernames yield
    /// `not_found`.
    pub async fn delete(&self, actor: &Actor, username: &Username) -> Result<(), Error> {
        let admin = actor.require_user(Capability::ManageUsers)?;
        let existing = self.lookup(username).await?;
        if !self.users.delete(existing.id()).await? {
            return Err(Self::missing(username));
        }
        info!(admin = %admin.username(), user = %username, "user deleted");
        Ok(())
    }

    /// The caller's own account.
    ///
    /// # Errors
    ///
    /// Anonymous callers get `unauthorized`.
    pub async fn me(&self, actor: &Actor) -> Result<User, Error> {
        let user = actor.require_user(Capability::ManageOwnProfile)?;
        self.users
            .find_by_id(user.id())
            .await?
            .ok_or_else(|| Self::missing(user.username()))
    }

    /// Update the caller's own account. The role cannot be changed here.
    ///
    /// # Errors
    ///
    /// Anonymous callers get `unauthorized`.
    pub async fn update_me(&self, actor: &Actor, changes: UserChanges) -> Result<User, Error> {
        let user = actor.require_user(Capability::ManageOwnProfile)?;
        let changes = UserChanges {
            role: None,
            ..changes
        };
        self.users
            .update(user.id(), &changes)
            .await?
            .ok_or_else(|| Self::missing(user.username()))
    }

    async fn lookup(&self, username: &Username) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Self::missing(username))
    }

    fn missing(username: &Username) -> Error {
        Error::not_found(format!("user {username} not found"))
    }
}

#[cfg(test)]
#[path = "users_service_tests.rs"]
mod tests;
