//! Categories and genres: the two flat taxonomies titles are filed under.

use std::fmt;

use serde::Serialize;

use super::Slug;

/// Longest accepted category or genre name.
pub const TAXON_NAME_MAX: usize = 256;

/// Which taxonomy an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    /// Kind of work (film, book, music).
    Category,
    /// Genre (drama, comedy); a title may have several.
    Genre,
}

impl TaxonomyKind {
    /// Singular noun used in messages.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Genre => "genre",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Validation errors for taxonomy entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonValidationError {
    /// The name was blank.
    #[error("name must not be blank")]
    BlankName,
    /// The name exceeded [`TAXON_NAME_MAX`] characters.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum length.
        max: usize,
    },
}

/// Validated display name of a taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaxonName(String);

impl TaxonName {
    /// Validate and construct a name.
    pub fn new(raw: impl Into<String>) -> Result<Self, TaxonValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(TaxonValidationError::BlankName);
        }
        if value.chars().count() > TAXON_NAME_MAX {
            return Err(TaxonValidationError::NameTooLong {
                max: TAXON_NAME_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Database identifier of a category or genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxonId(i64);

impl TaxonId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Category or genre entry as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Taxon {
    /// Display name.
    pub name: TaxonName,
    /// Unique key within the taxonomy.
    pub slug: Slug,
}

/// Stored taxonomy entry together with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRecord {
    /// Database identifier.
    pub id: TaxonId,
    /// Public fields.
    pub taxon: Taxon,
}
