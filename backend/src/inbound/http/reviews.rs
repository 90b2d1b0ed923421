//! Review and comment endpoints nested under a title.
//!
//! ```text
//! GET|POST             /api/v1/titles/{title_id}/reviews
//! GET|PATCH|DELETE     /api/v1/titles/{title_id}/reviews/{review_id}
//! GET|POST             /api/v1/titles/{title_id}/reviews/{review_id}/comments
//! GET|PATCH|DELETE     /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
//! ```
//!
//! Parents are part of every lookup: a review requested through the wrong
//! title, or a comment through the wrong review, is reported as missing.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Actor, Capability, Comment, CommentId, ContentText, Error, FieldErrors, Review,
    ReviewChanges, ReviewId, Score, TitleId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pagination::{PageQuery, envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional, parse_required};

/// Review representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReviewBody {
    pub id: i64,
    pub text: String,
    /// Author username.
    #[schema(example = "ada")]
    pub author: String,
    #[schema(minimum = 1, maximum = 10, example = 8)]
    pub score: u8,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewBody {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.get(),
            text: review.text.as_str().to_owned(),
            author: review.author.as_str().to_owned(),
            score: review.score.get(),
            pub_date: review.pub_date,
        }
    }
}

/// Comment representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommentBody {
    pub id: i64,
    pub text: String,
    /// Author username.
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentBody {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            text: comment.text.as_str().to_owned(),
            author: comment.author.as_str().to_owned(),
            pub_date: comment.pub_date,
        }
    }
}

/// Request body for posting or editing a review.
///
/// Both fields are mandatory on create and optional on edit.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReviewRequest {
    pub text: Option<String>,
    #[schema(minimum = 1, maximum = 10)]
    pub score: Option<i64>,
}

/// Request body for posting or editing a comment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    pub text: Option<String>,
}

fn parse_new_review(body: ReviewRequest) -> Result<(ContentText, Score), Error> {
    let mut errors = FieldErrors::default();
    let text = parse_required(&mut errors, "text", body.text, ContentText::new);
    let score = parse_required(&mut errors, "score", body.score, Score::new);
    match (text, score) {
        (Some(text), Some(score)) if errors.is_empty() => Ok((text, score)),
        _ => Err(errors.into_error()),
    }
}

fn parse_review_changes(body: ReviewRequest) -> Result<ReviewChanges, Error> {
    let mut errors = FieldErrors::default();
    let text = parse_optional(&mut errors, "text", body.text, ContentText::new);
    let score = parse_optional(&mut errors, "score", body.score, Score::new);
    errors.finish()?;
    Ok(ReviewChanges { text, score })
}

fn parse_comment(body: CommentRequest) -> Result<ContentText, Error> {
    let mut errors = FieldErrors::default();
    let text = parse_required(&mut errors, "text", body.text, ContentText::new);
    match text {
        Some(text) if errors.is_empty() => Ok(text),
        _ => Err(errors.into_error()),
    }
}

fn review_path(path: web::Path<(i64, i64)>) -> (TitleId, ReviewId) {
    let (title, review) = path.into_inner();
    (TitleId::new(title), ReviewId::new(review))
}

fn comment_path(path: web::Path<(i64, i64, i64)>) -> (TitleId, ReviewId, CommentId) {
    let (title, review, comment) = path.into_inner();
    (
        TitleId::new(title),
        ReviewId::new(review),
        CommentId::new(comment),
    )
}

/// List a title's reviews, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = i64, Path, description = "Title identifier"), PageQuery),
    responses(
        (status = 200, description = "Page of reviews", body = Page<ReviewBody>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 404, description = "Unknown title or page", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/titles/{title_id}/reviews")]
pub async fn list_reviews(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ReviewBody>>> {
    let request = page.into_inner().request(&state)?;
    let listing = state
        .reviews
        .list_reviews(TitleId::new(path.into_inner()), request)
        .await?;
    envelope(&req, listing, request, ReviewBody::from).map(web::Json)
}

/// Post a review of a title.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = i64, Path, description = "Title identifier")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewBody),
        (status = 400, description = "Invalid fields or duplicate review", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown title", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/titles/{title_id}/reviews")]
pub async fn create_review(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::AuthorContent)?;
    let (text, score) = parse_new_review(payload.into_inner())?;
    let review = state
        .reviews
        .create_review(&actor, TitleId::new(path.into_inner()), text, score)
        .await?;
    Ok(HttpResponse::Created().json(ReviewBody::from(review)))
}

/// Fetch one review.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewBody),
        (status = 404, description = "Unknown title or review", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "getReview",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<web::Json<ReviewBody>> {
    let (title, review) = review_path(path);
    let review = state.reviews.get_review(title, review).await?;
    Ok(web::Json(review.into()))
}

/// Edit a review's text or score.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewBody),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author or a moderator", body = ErrorSchema),
        (status = 404, description = "Unknown title or review", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[patch("/titles/{title_id}/reviews/{review_id}")]
pub async fn update_review(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<web::Json<ReviewBody>> {
    actor.require(Capability::AuthorContent)?;
    let (title, review) = review_path(path);
    let changes = parse_review_changes(payload.into_inner())?;
    let review = state
        .reviews
        .update_review(&actor, title, review, changes)
        .await?;
    Ok(web::Json(review.into()))
}

/// Delete a review with its comments.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author or a moderator", body = ErrorSchema),
        (status = 404, description = "Unknown title or review", body = ErrorSchema)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/titles/{title_id}/reviews/{review_id}")]
pub async fn delete_review(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (title, review) = review_path(path);
    state.reviews.delete_review(&actor, title, review).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List a review's comments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of comments", body = Page<CommentBody>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 404, description = "Unknown title, review or page", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listComments",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn list_comments(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<CommentBody>>> {
    let request = page.into_inner().request(&state)?;
    let (title, review) = review_path(path);
    let listing = state.reviews.list_comments(title, review, request).await?;
    envelope(&req, listing, request, CommentBody::from).map(web::Json)
}

/// Comment on a review.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentBody),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown title or review", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/titles/{title_id}/reviews/{review_id}/comments")]
pub async fn create_comment(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64)>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::AuthorContent)?;
    let (title, review) = review_path(path);
    let text = parse_comment(payload.into_inner())?;
    let comment = state
        .reviews
        .create_comment(&actor, title, review, text)
        .await?;
    Ok(HttpResponse::Created().json(CommentBody::from(comment)))
}

/// Fetch one comment.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier"),
        ("comment_id" = i64, Path, description = "Comment identifier")
    ),
    responses(
        (status = 200, description = "Comment", body = CommentBody),
        (status = 404, description = "Unknown title, review or comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "getComment",
    security([])
)]
#[get("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64, i64)>,
) -> ApiResult<web::Json<CommentBody>> {
    let (title, review, comment) = comment_path(path);
    let comment = state.reviews.get_comment(title, review, comment).await?;
    Ok(web::Json(comment.into()))
}

/// Replace a comment's text.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier"),
        ("comment_id" = i64, Path, description = "Comment identifier")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = CommentBody),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author or a moderator", body = ErrorSchema),
        (status = 404, description = "Unknown title, review or comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn update_comment(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64, i64)>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<web::Json<CommentBody>> {
    actor.require(Capability::AuthorContent)?;
    let (title, review, comment) = comment_path(path);
    let text = parse_comment(payload.into_inner())?;
    let comment = state
        .reviews
        .update_comment(&actor, title, review, comment, text)
        .await?;
    Ok(web::Json(comment.into()))
}

/// Delete a comment.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title identifier"),
        ("review_id" = i64, Path, description = "Review identifier"),
        ("comment_id" = i64, Path, description = "Comment identifier")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author or a moderator", body = ErrorSchema),
        (status = 404, description = "Unknown title, review or comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")]
pub async fn delete_comment(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<(i64, i64, i64)>,
) -> ApiResult<HttpResponse> {
    let (title, review, comment) = comment_path(path);
    state
        .reviews
        .delete_comment(&actor, title, review, comment)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
