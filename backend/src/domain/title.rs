//! Titles: the creative works users review.

use std::fmt;

use serde::Serialize;

use super::{Rating, Slug, Taxon, TaxonId};

/// Longest accepted title name.
pub const TITLE_NAME_MAX: usize = 256;

/// Validation errors for title fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TitleValidationError {
    /// The name was blank.
    #[error("name must not be blank")]
    BlankName,
    /// The name exceeded [`TITLE_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum length.
        max: usize,
    },
    /// The year lies after the current year.
    #[error("year must not be later than {current}")]
    YearInFuture {
        /// The current year at validation time.
        current: i32,
    },
    /// The year was negative.
    #[error("year must not be negative")]
    NegativeYear,
}

/// Database identifier of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TitleId(i64);

impl TitleId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated title name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TitleName(String);

impl TitleName {
    /// Validate and construct a name.
    pub fn new(raw: impl Into<String>) -> Result<Self, TitleValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(TitleValidationError::BlankName);
        }
        if value.chars().count() > TITLE_NAME_MAX {
            return Err(TitleValidationError::NameTooLong {
                max: TITLE_NAME_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Release year, never later than the year it was validated in.
///
/// # Examples
/// ```
/// use yamdb::domain::ReleaseYear;
///
/// assert!(ReleaseYear::new(1994, 2026).is_ok());
/// assert!(ReleaseYear::new(2027, 2026).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReleaseYear(i32);

impl ReleaseYear {
    /// Validate `year` against `current_year`.
    pub const fn new(year: i32, current_year: i32) -> Result<Self, TitleValidationError> {
        if year < 0 {
            return Err(TitleValidationError::NegativeYear);
        }
        if year > current_year {
            return Err(TitleValidationError::YearInFuture {
                current: current_year,
            });
        }
        Ok(Self(year))
    }

    /// Rehydrate a year read from storage without re-validating it.
    pub const fn from_stored(year: i32) -> Self {
        Self(year)
    }

    /// The year.
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Title with its taxonomy links and derived rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    /// Database identifier.
    pub id: TitleId,
    /// Display name.
    pub name: TitleName,
    /// Release year.
    pub year: ReleaseYear,
    /// Optional description.
    pub description: Option<String>,
    /// Category, if one is assigned.
    pub category: Option<Taxon>,
    /// Genres, ordered by slug.
    pub genres: Vec<Taxon>,
    /// Rounded average review score, absent without reviews.
    pub rating: Option<Rating>,
}

/// Data needed to store a new title; taxonomy slugs already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTitle {
    /// Display name.
    pub name: TitleName,
    /// Release year.
    pub year: ReleaseYear,
    /// Optional description.
    pub description: Option<String>,
    /// Category identifier.
    pub category: Option<TaxonId>,
    /// Genre identifiers.
    pub genres: Vec<TaxonId>,
}

/// Partial update of a title; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleChanges {
    /// New name.
    pub name: Option<TitleName>,
    /// New release year.
    pub year: Option<ReleaseYear>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New category; `Some(None)` clears it.
    pub category: Option<Option<TaxonId>>,
    /// Replacement genre set.
    pub genres: Option<Vec<TaxonId>>,
}

/// Filters accepted by the title listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    /// Only titles in this category.
    pub category: Option<Slug>,
    /// Only titles tagged with this genre.
    pub genre: Option<Slug>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    //! Field validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 2026, true)]
    #[case(2026, 2026, true)]
    #[case(2027, 2026, false)]
    #[case(-1, 2026, false)]
    fn year_bounds(#[case] year: i32, #[case] current: i32, #[case] ok: bool) {
        assert_eq!(ReleaseYear::new(year, current).is_ok(), ok);
    }

    #[rstest]
    fn future_year_error_names_the_current_year() {
        let err = ReleaseYear::new(3000, 2026).expect_err("future year");
        assert_eq!(err.to_string(), "year must not be later than 2026");
    }

    #[rstest]
    #[case("", false)]
    #[case(" ", false)]
    #[case("Solaris", true)]
    fn name_must_not_be_blank(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(TitleName::new(raw).is_ok(), ok);
    }
}
