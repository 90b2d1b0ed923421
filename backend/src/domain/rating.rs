//! Title rating aggregation.
//!
//! A title's rating is the mean of its current review scores rounded to the
//! nearest integer, ties to even, or absent when nobody has reviewed it.
//! Ratings are recomputed from the full review set on every read, so there is
//! no stored aggregate to drift out of date.

use serde::Serialize;

/// Sum and count of the scores currently attached to a title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    /// Sum of all scores.
    pub total: i64,
    /// Number of reviews.
    pub count: i64,
}

impl ScoreTally {
    /// Tally a sequence of scores.
    ///
    /// # Examples
    /// ```
    /// use yamdb::domain::ScoreTally;
    ///
    /// let tally = ScoreTally::from_scores([7, 8, 10]);
    /// assert_eq!(tally, ScoreTally { total: 25, count: 3 });
    /// ```
    pub fn from_scores(scores: impl IntoIterator<Item = u8>) -> Self {
        scores.into_iter().fold(Self::default(), |tally, score| Self {
            total: tally.total + i64::from(score),
            count: tally.count + 1,
        })
    }
}

/// Rounded average score of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Derive the rating from a tally; `None` when there are no reviews.
    ///
    /// # Examples
    /// ```
    /// use yamdb::domain::{Rating, ScoreTally};
    ///
    /// // 8.5 rounds to the even neighbour.
    /// let rating = Rating::from_tally(ScoreTally { total: 17, count: 2 });
    /// assert_eq!(rating.map(Rating::value), Some(8));
    /// assert_eq!(Rating::from_tally(ScoreTally::default()), None);
    /// ```
    pub fn from_tally(tally: ScoreTally) -> Option<Self> {
        if tally.count <= 0 || tally.total < 0 {
            return None;
        }
        let quotient = tally.total / tally.count;
        let twice_remainder = (tally.total % tally.count) * 2;
        let rounded = match twice_remainder.cmp(&tally.count) {
            std::cmp::Ordering::Less => quotient,
            std::cmp::Ordering::Greater => quotient + 1,
            std::cmp::Ordering::Equal => quotient + (quotient % 2),
        };
        u8::try_from(rounded).ok().map(Self)
    }

    /// The integer rating.
    pub const fn value(self) -> u8 {
        self.0
    }
}
