//! Reviews and their comment threads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{TitleId, UserId, Username};

/// Lowest accepted score.
pub const SCORE_MIN: u8 = 1;
/// Highest accepted score.
pub const SCORE_MAX: u8 = 10;

/// Validation errors for review and comment fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// The score was outside `[SCORE_MIN, SCORE_MAX]`.
    #[error("score must be between {SCORE_MIN} and {SCORE_MAX}")]
    ScoreOutOfRange,
    /// The text was blank.
    #[error("text must not be blank")]
    BlankText,
}

/// Review score between 1 and 10 inclusive.
///
/// # Examples
/// ```
/// use yamdb::domain::Score;
///
/// assert_eq!(Score::new(10).map(Score::get), Ok(10));
/// assert!(Score::new(0).is_err());
/// assert!(Score::new(11).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Validate a score given as any integer.
    pub fn new(raw: impl TryInto<u8>) -> Result<Self, ReviewValidationError> {
        let value: u8 = raw
            .try_into()
            .map_err(|_| ReviewValidationError::ScoreOutOfRange)?;
        if (SCORE_MIN..=SCORE_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::ScoreOutOfRange)
        }
    }

    /// The score.
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Non-blank body of a review or comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentText(String);

impl ContentText {
    /// Validate and construct the text.
    pub fn new(raw: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(ReviewValidationError::BlankText);
        }
        Ok(Self(value))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The raw identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

content_id!(
    /// Database identifier of a review.
    ReviewId
);
content_id!(
    /// Database identifier of a comment.
    CommentId
);

/// A user's scored opinion of a title. One per (author, title) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Database identifier.
    pub id: ReviewId,
    /// Reviewed title.
    pub title_id: TitleId,
    /// Author identifier.
    pub author_id: UserId,
    /// Author username, for display.
    pub author: Username,
    /// Review body.
    pub text: ContentText,
    /// Score.
    pub score: Score,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// Data needed to store a new review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed title.
    pub title_id: TitleId,
    /// Author identifier.
    pub author_id: UserId,
    /// Review body.
    pub text: ContentText,
    /// Score.
    pub score: Score,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// Partial update of a review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    /// New body.
    pub text: Option<ContentText>,
    /// New score.
    pub score: Option<Score>,
}

/// Reply attached to a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Database identifier.
    pub id: CommentId,
    /// Parent review.
    pub review_id: ReviewId,
    /// Author identifier.
    pub author_id: UserId,
    /// Author username, for display.
    pub author: Username,
    /// Comment body.
    pub text: ContentText,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// Data needed to store a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Parent review.
    pub review_id: ReviewId,
    /// Author identifier.
    pub author_id: UserId,
    /// Comment body.
    pub text: ContentText,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Score and text rules.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1_i64, true)]
    #[case(10_i64, true)]
    #[case(0_i64, false)]
    #[case(11_i64, false)]
    #[case(-3_i64, false)]
    #[case(300_i64, false)]
    fn score_bounds(#[case] raw: i64, #[case] ok: bool) {
        assert_eq!(Score::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn blank_text_is_rejected() {
        assert_eq!(ContentText::new(" \n"), Err(ReviewValidationError::BlankText));
    }
}
