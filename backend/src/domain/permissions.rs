//! Role-based capability policy.
//!
//! Every protected operation names the [`Capability`] it needs; the
//! [`Actor`] performing the request either holds it or receives a 401 (no
//! credentials) or 403 (insufficient role).

use super::{Error, Role, User, UserId};

/// Something an actor may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Browse public data.
    ReadPublic,
    /// View and edit one's own account.
    ManageOwnProfile,
    /// Create reviews and comments, and edit one's own.
    AuthorContent,
    /// Edit or remove anyone's reviews and comments.
    ModerateContent,
    /// Create and remove categories, genres and titles.
    ManageCatalogue,
    /// Administer user accounts.
    ManageUsers,
}

/// Capability table: which tiers hold which capabilities.
///
/// `None` stands for the anonymous tier.
const fn tier_allows(tier: Option<Role>, capability: Capability) -> bool {
    match capability {
        Capability::ReadPublic => true,
        Capability::ManageOwnProfile | Capability::AuthorContent => tier.is_some(),
        Capability::ModerateContent => matches!(tier, Some(Role::Moderator | Role::Admin)),
        Capability::ManageCatalogue | Capability::ManageUsers => matches!(tier, Some(Role::Admin)),
    }
}

impl Role {
    /// Whether this role holds `capability`.
    ///
    /// # Examples
    /// ```
    /// use yamdb::domain::{Capability, Role};
    ///
    /// assert!(Role::Moderator.allows(Capability::ModerateContent));
    /// assert!(!Role::Moderator.allows(Capability::ManageCatalogue));
    /// ```
    pub const fn allows(self, capability: Capability) -> bool {
        tier_allows(Some(self), capability)
    }
}

/// The party performing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No credentials were presented.
    Anonymous,
    /// A bearer token resolved to this user.
    Authenticated(User),
}

impl Actor {
    /// Whether the actor holds `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        tier_allows(self.role(), capability)
    }

    /// Role of the authenticated user, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user.role()),
        }
    }

    /// Authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Require `capability`, returning the acting user when authenticated.
    ///
    /// # Errors
    ///
    /// Anonymous actors lacking the capability get `unauthorized`;
    /// authenticated ones get `forbidden`.
    pub fn require(&self, capability: Capability) -> Result<Option<&User>, Error> {
        if self.can(capability) {
            return Ok(self.user());
        }
        Err(self.denial())
    }

    /// Require an authenticated user holding `capability`.
    ///
    /// # Errors
    ///
    /// As [`Actor::require`]; anonymous actors are always rejected.
    pub fn require_user(&self, capability: Capability) -> Result<&User, Error> {
        match self.require(capability)? {
            Some(user) => Ok(user),
            None => Err(self.denial()),
        }
    }

    /// Permit changes to content owned by `author`.
    ///
    /// Authors may change their own content; moderators and admins may
    /// change anyone's.
    ///
    /// # Errors
    ///
    /// `unauthorized` for anonymous actors, `forbidden` for other users.
    pub fn require_owner_or_moderator(&self, author: UserId) -> Result<&User, Error> {
        let user = self.require_user(Capability::AuthorContent)?;
        if user.id() == author || self.can(Capability::ModerateContent) {
            return Ok(user);
        }
        Err(Error::forbidden(
            "only the author or a moderator may change this content",
        ))
    }

    fn denial(&self) -> Error {
        match self {
            Self::Anonymous => Error::unauthorized("authentication credentials were not provided"),
            Self::Authenticated(_) => {
                Error::forbidden("you do not have permission to perform this action")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Capability table coverage.
    use super::*;
    use crate::domain::{Email, ErrorCode, Username};
    use rstest::rstest;

    fn actor(role: Option<Role>, id: i64) -> Actor {
        match role {
            None => Actor::Anonymous,
            Some(role) => Actor::Authenticated(User::new(
                UserId::new(id),
                Username::new(format!("user{id}")).expect("username"),
                Email::new(format!("user{id}@example.org")).expect("email"),
                role,
            )),
        }
    }

    #[rstest]
    #[case(Capability::ReadPublic, [true, true, true, true])]
    #[case(Capability::ManageOwnProfile, [false, true, true, true])]
    #[case(Capability::AuthorContent, [false, true, true, true])]
    #[case(Capability::ModerateContent, [false, false, true, true])]
    #[case(Capability::ManageCatalogue, [false, false, false, true])]
    #[case(Capability::ManageUsers, [false, false, false, true])]
    fn capability_table(#[case] capability: Capability, #[case] expected: [bool; 4]) {
        let tiers = [None, Some(Role::User), Some(Role::Moderator), Some(Role::Admin)];
        for (tier, allowed) in tiers.into_iter().zip(expected) {
            assert_eq!(actor(tier, 1).can(capability), allowed, "{tier:?} / {capability:?}");
        }
    }

    #[rstest]
    #[case(None, ErrorCode::Unauthorized)]
    #[case(Some(Role::User), ErrorCode::Forbidden)]
    fn denials_distinguish_anonymous_from_insufficient(
        #[case] tier: Option<Role>,
        #[case] expected: ErrorCode,
    ) {
        let err = actor(tier, 1)
            .require(Capability::ManageCatalogue)
            .expect_err("capability missing");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    fn anonymous_reads_are_permitted_without_a_user() {
        let granted = Actor::Anonymous
            .require(Capability::ReadPublic)
            .expect("public reads allowed");
        assert!(granted.is_none());
    }

    #[rstest]
    #[case(Some(Role::User), 7, true)]
    #[case(Some(Role::User), 8, false)]
    #[case(Some(Role::Moderator), 8, true)]
    #[case(Some(Role::Admin), 8, true)]
    fn ownership_rules(#[case] tier: Option<Role>, #[case] actor_id: i64, #[case] allowed: bool) {
        let acting = actor(tier, actor_id);
        let result = acting.require_owner_or_moderator(UserId::new(7));
        assert_eq!(result.is_ok(), allowed);
    }

    #[rstest]
    fn anonymous_cannot_change_content() {
        let err = Actor::Anonymous
            .require_owner_or_moderator(UserId::new(7))
            .expect_err("anonymous rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
