//! Authentication secrets: confirmation codes and bearer tokens.
//!
//! Secrets are generated here, handed to the caller exactly once, and only
//! their SHA-256 digests are persisted. Plain values are held in
//! [`Zeroizing`] buffers so they are wiped when dropped.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of generated confirmation codes.
pub const CONFIRMATION_CODE_LEN: usize = 12;
/// Number of random bytes in a bearer token before hex encoding.
const TOKEN_BYTES: usize = 32;
/// Longest confirmation code accepted from clients.
pub const CONFIRMATION_CODE_MAX: usize = 64;

/// Validation errors for caller-supplied secrets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretValidationError {
    /// The value was blank.
    #[error("this field may not be blank")]
    Blank,
    /// The value exceeded the accepted length.
    #[error("value must be at most {max} characters")]
    TooLong {
        /// Maximum length.
        max: usize,
    },
}

/// Hex-encoded SHA-256 digest of a secret, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretDigest(String);

impl SecretDigest {
    /// Digest `secret`.
    ///
    /// # Examples
    /// ```
    /// use yamdb::domain::SecretDigest;
    ///
    /// let digest = SecretDigest::of("abc");
    /// assert_eq!(
    ///     digest.as_str(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    pub fn of(secret: &str) -> Self {
        Self(hex::encode(Sha256::digest(secret.as_bytes())))
    }

    /// Borrow the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One-time code mailed to a user during signup.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationCode(Zeroizing<String>);

impl ConfirmationCode {
    /// Generate a fresh random alphanumeric code.
    pub fn generate() -> Self {
        let code: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CONFIRMATION_CODE_LEN)
            .map(char::from)
            .collect();
        Self(Zeroizing::new(code))
    }

    /// Accept a code presented by a client.
    pub fn parse(raw: &str) -> Result<Self, SecretValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SecretValidationError::Blank);
        }
        if trimmed.chars().count() > CONFIRMATION_CODE_MAX {
            return Err(SecretValidationError::TooLong {
                max: CONFIRMATION_CODE_MAX,
            });
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Plain code, for delivery to the user.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest for storage and comparison.
    pub fn digest(&self) -> SecretDigest {
        SecretDigest::of(self.expose())
    }
}

impl fmt::Debug for ConfirmationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfirmationCode(**redacted**)")
    }
}

/// Opaque bearer token issued after a successful code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = thread_rng().r#gen();
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Accept a token presented in an `Authorization` header.
    pub fn parse(raw: &str) -> Result<Self, SecretValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SecretValidationError::Blank);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Plain token, for returning to the client.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Digest for storage and lookup.
    pub fn digest(&self) -> SecretDigest {
        SecretDigest::of(self.expose())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

/// Stored confirmation code awaiting exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    /// Digest of the mailed code.
    pub digest: SecretDigest,
    /// Moment after which the code is rejected.
    pub expires_at: DateTime<Utc>,
}

impl PendingConfirmation {
    /// Pending confirmation for `code`, valid for `ttl` from `now`.
    pub fn issue(code: &ConfirmationCode, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            digest: code.digest(),
            expires_at: now + ttl,
        }
    }

    /// Whether a code hashing to `digest` matches and has not expired at
    /// `now`.
    pub fn accepts(&self, digest: &SecretDigest, now: DateTime<Utc>) -> bool {
        now < self.expires_at && &self.digest == digest
    }
}
