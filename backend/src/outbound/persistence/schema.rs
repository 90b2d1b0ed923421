//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// User accounts.
    ///
    /// The confirmation columns hold the SHA-256 digest and expiry of the
    /// outstanding signup code; both are null once the code is exchanged.
    users (id) {
        /// Primary key.
        id -> Int8,
        /// Unique login name (max 150 characters).
        username -> Varchar,
        /// Unique email address (max 254 characters).
        email -> Varchar,
        /// One of `user`, `moderator`, `admin`.
        role -> Varchar,
        /// Given name, possibly empty.
        first_name -> Varchar,
        /// Family name, possibly empty.
        last_name -> Varchar,
        /// Free-form biography.
        bio -> Text,
        /// Set once a confirmation code has been exchanged.
        verified -> Bool,
        /// Hex digest of the outstanding confirmation code.
        confirmation_digest -> Nullable<Varchar>,
        /// Expiry of the outstanding confirmation code.
        confirmation_expires_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Issued bearer tokens, stored as digests.
    access_tokens (id) {
        /// Primary key.
        id -> Int8,
        /// Owning user; cascades on delete.
        user_id -> Int8,
        /// Hex digest of the token.
        token_digest -> Varchar,
        /// Instant after which the token is rejected.
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Title categories.
    categories (id) {
        /// Primary key.
        id -> Int8,
        /// Display name.
        name -> Varchar,
        /// Unique slug.
        slug -> Varchar,
    }
}

diesel::table! {
    /// Title genres.
    genres (id) {
        /// Primary key.
        id -> Int8,
        /// Display name.
        name -> Varchar,
        /// Unique slug.
        slug -> Varchar,
    }
}

diesel::table! {
    /// Reviewable works.
    titles (id) {
        /// Primary key.
        id -> Int8,
        /// Display name.
        name -> Varchar,
        /// Release year.
        year -> Int4,
        /// Optional description.
        description -> Nullable<Text>,
        /// Category; set to null when the category is deleted.
        category_id -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Title-to-genre links.
    title_genres (title_id, genre_id) {
        /// Linked title.
        title_id -> Int8,
        /// Linked genre.
        genre_id -> Int8,
    }
}

diesel::table! {
    /// Reviews; unique per (author, title).
    reviews (id) {
        /// Primary key.
        id -> Int8,
        /// Reviewed title.
        title_id -> Int8,
        /// Author.
        author_id -> Int8,
        /// Review body.
        text -> Text,
        /// Score between 1 and 10.
        score -> Int4,
        /// Publication time.
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    /// Comments on reviews.
    comments (id) {
        /// Primary key.
        id -> Int8,
        /// Parent review.
        review_id -> Int8,
        /// Author.
        author_id -> Int8,
        /// Comment body.
        text -> Text,
        /// Publication time.
        pub_date -> Timestamptz,
    }
}

diesel::joinable!(access_tokens -> users (user_id));
diesel::joinable!(titles -> categories (category_id));
diesel::joinable!(title_genres -> titles (title_id));
diesel::joinable!(title_genres -> genres (genre_id));
diesel::joinable!(reviews -> titles (title_id));
diesel::joinable!(reviews -> users (author_id));
diesel::joinable!(comments -> reviews (review_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(
    access_tokens,
    categories,
    comments,
    genres,
    reviews,
    title_genres,
    titles,
    users,
);
