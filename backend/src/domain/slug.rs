//! Slug validation for catalogue taxonomies.
//!
//! Slugs are non-empty identifiers of at most 50 ASCII letters, digits,
//! hyphens, or underscores.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest accepted slug.
pub const SLUG_MAX: usize = 50;

/// Validation errors for [`Slug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    /// The slug was empty.
    #[error("slug must not be empty")]
    Empty,
    /// The slug exceeded [`SLUG_MAX`] characters.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum length.
        max: usize,
    },
    /// The slug contained a disallowed character.
    #[error("slug may contain only letters, digits, hyphens and underscores")]
    InvalidCharacters,
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// URL-safe unique key of a category or genre.
///
/// # Examples
/// ```
/// use yamdb::domain::Slug;
///
/// assert!(Slug::new("sci-fi_2").is_ok());
/// assert!(Slug::new("sci fi").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a slug.
    pub fn new(raw: impl Into<String>) -> Result<Self, SlugValidationError> {
        let value = raw.into();
        if value.is_empty() {
            return Err(SlugValidationError::Empty);
        }
        if value.len() > SLUG_MAX {
            return Err(SlugValidationError::TooLong { max: SLUG_MAX });
        }
        if !has_allowed_slug_chars(&value) {
            return Err(SlugValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Borrow the slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
