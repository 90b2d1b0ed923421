//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-validate the stored values and report failures as plain messages, which
//! the repositories surface as query errors.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{access_tokens, comments, reviews, title_genres, titles, users};
use crate::domain::{
    Comment, CommentId, ContentText, Email, PendingConfirmation, Profile, ReleaseYear, Review,
    ReviewId, Role, Score, Slug, Taxon, TaxonId, TaxonName, TaxonRecord, TitleId, TitleName, User,
    UserId, Username,
};

fn corrupt(column: &str, error: impl std::fmt::Display) -> String {
    format!("stored {column} is invalid: {error}")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub verified: bool,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let username = Username::new(self.username).map_err(|err| corrupt("username", err))?;
        let email = Email::new(&self.email).map_err(|err| corrupt("email", err))?;
        let role = Role::from_str(&self.role).map_err(|err| corrupt("role", err))?;
        Ok(User::new(UserId::new(self.id), username, email, role)
            .with_profile(Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                bio: self.bio,
            })
            .with_verified(self.verified))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub bio: &'a str,
}

/// Changeset for partial user updates; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

impl UserUpdate<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
    }
}

/// Confirmation columns of the users table.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct ConfirmationColumns {
    pub confirmation_digest: Option<String>,
    pub confirmation_expires_at: Option<DateTime<Utc>>,
}

impl From<&PendingConfirmation> for ConfirmationColumns {
    fn from(pending: &PendingConfirmation) -> Self {
        Self {
            confirmation_digest: Some(pending.digest.as_str().to_owned()),
            confirmation_expires_at: Some(pending.expires_at),
        }
    }
}

/// Insertable struct for issued bearer tokens.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = access_tokens)]
pub(crate) struct NewAccessTokenRow<'a> {
    pub user_id: i64,
    pub token_digest: &'a str,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Taxonomies
// ---------------------------------------------------------------------------

/// Row struct shared by the categories and genres tables.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct TaxonRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl TaxonRow {
    pub(crate) fn into_taxon(self) -> Result<Taxon, String> {
        self.into_record().map(|record| record.taxon)
    }

    pub(crate) fn into_record(self) -> Result<TaxonRecord, String> {
        let name = TaxonName::new(self.name).map_err(|err| corrupt("name", err))?;
        let slug = Slug::new(self.slug).map_err(|err| corrupt("slug", err))?;
        Ok(TaxonRecord {
            id: TaxonId::new(self.id),
            taxon: Taxon { name, slug },
        })
    }
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Row struct for reading from the titles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = titles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

impl TitleRow {
    pub(crate) fn title_id(&self) -> TitleId {
        TitleId::new(self.id)
    }

    pub(crate) fn parts(&self) -> Result<(TitleName, ReleaseYear), String> {
        let name = TitleName::new(self.name.clone()).map_err(|err| corrupt("name", err))?;
        Ok((name, ReleaseYear::from_stored(self.year)))
    }
}

/// Insertable struct for creating titles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = titles)]
pub(crate) struct NewTitleRow<'a> {
    pub name: &'a str,
    pub year: i32,
    pub description: Option<&'a str>,
    pub category_id: Option<i64>,
}

/// Changeset for partial title updates.
///
/// The nested options distinguish "leave untouched" from "set to null".
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = titles)]
pub(crate) struct TitleUpdate<'a> {
    pub name: Option<&'a str>,
    pub year: Option<i32>,
    pub description: Option<Option<&'a str>>,
    pub category_id: Option<Option<i64>>,
}

impl TitleUpdate<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
    }
}

/// Insertable struct for title-to-genre links.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = title_genres)]
pub(crate) struct TitleGenreRow {
    pub title_id: i64,
    pub genre_id: i64,
}

// ---------------------------------------------------------------------------
// Reviews and comments
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: i64,
    pub title_id: i64,
    pub author_id: i64,
    pub text: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

impl ReviewRow {
    /// Combine with the author's username selected alongside the row.
    pub(crate) fn into_domain(self, author: String) -> Result<Review, String> {
        Ok(Review {
            id: ReviewId::new(self.id),
            title_id: TitleId::new(self.title_id),
            author_id: UserId::new(self.author_id),
            author: Username::new(author).map_err(|err| corrupt("username", err))?,
            text: ContentText::new(self.text).map_err(|err| corrupt("text", err))?,
            score: Score::new(self.score).map_err(|err| corrupt("score", err))?,
            pub_date: self.pub_date,
        })
    }
}

/// Insertable struct for creating reviews.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub title_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

/// Changeset for partial review updates.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewUpdate<'a> {
    pub text: Option<&'a str>,
    pub score: Option<i32>,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub review_id: i64,
    pub author_id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) fn into_domain(self, author: String) -> Result<Comment, String> {
        Ok(Comment {
            id: CommentId::new(self.id),
            review_id: ReviewId::new(self.review_id),
            author_id: UserId::new(self.author_id),
            author: Username::new(author).map_err(|err| corrupt("username", err))?,
            text: ContentText::new(self.text).map_err(|err| corrupt("text", err))?,
            pub_date: self.pub_date,
        })
    }
}

/// Insertable struct for creating comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub review_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub pub_date: DateTime<Utc>,
}
