//! User identity, profile fields, and roles.
//!
//! Field validation mirrors the account rules clients are told about: a
//! username of at most 150 word characters or `.@+-`, never the reserved
//! word `me`; an email address of at most 254 characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest accepted username.
pub const USERNAME_MAX: usize = 150;
/// Longest accepted email address.
pub const EMAIL_MAX: usize = 254;
/// Longest accepted first or last name.
pub const PERSON_NAME_MAX: usize = 150;
/// Username reserved for the "current user" routes.
pub const RESERVED_USERNAME: &str = "me";

/// Validation errors raised by user field constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The username was empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username exceeded [`USERNAME_MAX`] characters.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum length.
        max: usize,
    },
    /// The username contained a character outside the allowed set.
    #[error("username may contain only letters, digits and @/./+/-/_ characters")]
    InvalidUsernameCharacters,
    /// The username was the reserved word.
    #[error("username \"{RESERVED_USERNAME}\" is reserved")]
    ReservedUsername,
    /// The email was malformed.
    #[error("enter a valid email address")]
    InvalidEmail,
    /// The email exceeded [`EMAIL_MAX`] characters.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum length.
        max: usize,
    },
    /// A first or last name exceeded [`PERSON_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum length.
        max: usize,
    },
    /// The role was not one of `user`, `moderator`, `admin`.
    #[error("role must be one of user, moderator, admin")]
    UnknownRole,
}

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated username.
///
/// # Examples
/// ```
/// use yamdb::domain::{Username, UserValidationError};
///
/// assert!(Username::new("ada.l+reviews@home").is_ok());
/// assert_eq!(Username::new("Me"), Err(UserValidationError::ReservedUsername));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Username(String);

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')
}

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = raw.into();
        if value.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if value.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !value.chars().all(is_username_char) {
            return Err(UserValidationError::InvalidUsernameCharacters);
        }
        if value.eq_ignore_ascii_case(RESERVED_USERNAME) {
            return Err(UserValidationError::ReservedUsername);
        }
        Ok(Self(value))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Validated email address.
///
/// Only the overall shape is checked: a single `@` separating a non-empty
/// local part from a dotted domain, with no whitespace. The domain is
/// lower-cased so lookups are case-insensitive on that half.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Validate and construct an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let (local, domain) = trimmed
            .split_once('@')
            .ok_or(UserValidationError::InvalidEmail)?;
        let well_formed = !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !trimmed.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Access tier of an authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account: may author reviews and comments.
    #[default]
    User,
    /// May edit or remove anyone's reviews and comments.
    Moderator,
    /// Full access, including the catalogue and user management.
    Admin,
}

impl Role {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a first or last name against [`PERSON_NAME_MAX`].
pub fn validate_person_name(name: &str) -> Result<(), UserValidationError> {
    if name.chars().count() > PERSON_NAME_MAX {
        return Err(UserValidationError::NameTooLong {
            max: PERSON_NAME_MAX,
        });
    }
    Ok(())
}

/// Optional descriptive profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Given name, possibly empty.
    pub first_name: String,
    /// Family name, possibly empty.
    pub last_name: String,
    /// Free-form biography.
    pub bio: String,
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: Email,
    role: Role,
    profile: Profile,
    verified: bool,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(id: UserId, username: Username, email: Email, role: Role) -> Self {
        Self {
            id,
            username,
            email,
            role,
            profile: Profile::default(),
            verified: false,
        }
    }

    /// Attach profile fields.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the verified flag.
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Database identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Unique email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Access tier.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Descriptive fields.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Whether the user has exchanged a confirmation code at least once.
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

/// Data needed to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique username.
    pub username: Username,
    /// Unique email address.
    pub email: Email,
    /// Initial role.
    pub role: Role,
    /// Initial profile fields.
    pub profile: Profile,
}

impl NewUser {
    /// A regular account with an empty profile, as created by signup.
    pub fn signup(username: Username, email: Email) -> Self {
        Self {
            username,
            email,
            role: Role::User,
            profile: Profile::default(),
        }
    }
}

/// Partial update of an account; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New username.
    pub username: Option<Username>,
    /// New email address.
    pub email: Option<Email>,
    /// New role.
    pub role: Option<Role>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
}

impl UserChanges {
    /// Apply the changes to `user`, returning the updated copy.
    pub fn apply_to(&self, user: &User) -> User {
        let mut updated = user.clone();
        if let Some(username) = &self.username {
            updated.username = username.clone();
        }
        if let Some(email) = &self.email {
            updated.email = email.clone();
        }
        if let Some(role) = self.role {
            updated.role = role;
        }
        if let Some(first_name) = &self.first_name {
            updated.profile.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            updated.profile.last_name.clone_from(last_name);
        }
        if let Some(bio) = &self.bio {
            updated.profile.bio.clone_from(bio);
        }
        updated
    }
}
