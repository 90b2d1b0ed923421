//! Canonical domain values for tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Email, Role, User, UserId, Username};

/// Instant used as "now" across test suites: 2024-06-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0) {
        chrono::LocalResult::Single(instant) => instant,
        _ => panic!("fixed test instant is unambiguous"),
    }
}

/// Parse a username, panicking on invalid fixtures.
pub fn sample_username(raw: &str) -> Username {
    match Username::new(raw) {
        Ok(username) => username,
        Err(error) => panic!("invalid fixture username {raw}: {error}"),
    }
}

/// Parse an email, panicking on invalid fixtures.
pub fn sample_email(raw: &str) -> Email {
    match Email::new(raw) {
        Ok(email) => email,
        Err(error) => panic!("invalid fixture email {raw}: {error}"),
    }
}

/// A user named `username` with a derived `@example.com` address.
pub fn sample_user(id: i64, username: &str, role: Role) -> User {
    User::new(
        UserId::new(id),
        sample_username(username),
        sample_email(&format!("{username}@example.com")),
        role,
    )
}
