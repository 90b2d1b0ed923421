//! Domain primitives, policy and use-cases.
//!
//! Purpose: define strongly typed entities for accounts, the title catalogue
//! and user-generated content, the capability policy that guards them, and
//! the services HTTP handlers call. Validation lives in constructors so a
//! value that exists is a value that is valid.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Username, Email, Role: accounts.
//! - Actor, Capability: permission policy.
//! - Taxon, Title, Review, Comment, Rating: catalogue and content.
//! - AuthService, UsersService, CatalogueService, TitlesService,
//!   ReviewsService: use-cases over the [`ports`].

pub mod auth;
pub mod catalogue;
pub mod error;
pub mod permissions;
pub mod ports;
pub mod rating;
pub mod review;
pub mod slug;
pub mod title;
pub mod trace_id;
pub mod user;

mod auth_service;
mod catalogue_service;
mod reviews_service;
mod titles_service;
mod users_service;

pub use self::auth::{
    AccessToken, CONFIRMATION_CODE_LEN, ConfirmationCode, PendingConfirmation, SecretDigest,
    SecretValidationError,
};
pub use self::auth_service::{AuthService, AuthSettings};
pub use self::catalogue::{
    TAXON_NAME_MAX, Taxon, TaxonId, TaxonName, TaxonRecord, TaxonValidationError, TaxonomyKind,
};
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldErrors, TRACE_ID_HEADER};
pub use self::permissions::{Actor, Capability};
pub use self::rating::{Rating, ScoreTally};
pub use self::review::{
    Comment, CommentId, ContentText, NewComment, NewReview, Review, ReviewChanges, ReviewId,
    ReviewValidationError, SCORE_MAX, SCORE_MIN, Score,
};
pub use self::reviews_service::ReviewsService;
pub use self::slug::{SLUG_MAX, Slug, SlugValidationError};
pub use self::title::{
    NewTitle, ReleaseYear, TITLE_NAME_MAX, Title, TitleChanges, TitleFilter, TitleId, TitleName,
    TitleValidationError,
};
pub use self::titles_service::{TitleDraft, TitlePatch, TitlesService};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, Profile, Role, User, UserChanges, UserId, UserValidationError, Username,
    validate_person_name,
};
pub use self::users_service::UsersService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use yamdb::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
