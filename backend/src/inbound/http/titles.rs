//! Title endpoints.
//!
//! ```text
//! GET    /api/v1/titles?category=film&genre=drama&name=god&year=1972
//! POST   /api/v1/titles {"name":"...","year":1972,"genre":["drama"],"category":"film"}
//! GET    /api/v1/titles/{id}
//! PATCH  /api/v1/titles/{id}
//! DELETE /api/v1/titles/{id}
//! ```
//!
//! Taxonomy references travel as slugs in both directions; `rating` is the
//! rounded mean of the title's review scores or `null` without reviews.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Actor, Capability, Error, FieldErrors, Slug, Title, TitleDraft, TitleFilter, TitleId,
    TitleName, TitlePatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::catalogue::TaxonBody;
use crate::inbound::http::pagination::{PageQuery, envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{nullable, parse_optional, parse_required, required};

/// Title representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TitleBody {
    pub id: i64,
    #[schema(example = "The Godfather")]
    pub name: String,
    #[schema(example = 1972)]
    pub year: i32,
    /// Rounded mean review score, `null` when unreviewed.
    #[schema(example = 9)]
    pub rating: Option<u8>,
    pub description: Option<String>,
    pub genre: Vec<TaxonBody>,
    pub category: Option<TaxonBody>,
}

impl From<Title> for TitleBody {
    fn from(title: Title) -> Self {
        Self {
            id: title.id.get(),
            name: title.name.as_str().to_owned(),
            year: title.year.get(),
            rating: title.rating.map(|rating| rating.value()),
            description: title.description,
            genre: title.genres.into_iter().map(TaxonBody::from).collect(),
            category: title.category.map(TaxonBody::from),
        }
    }
}

/// Filters accepted by `GET /api/v1/titles`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TitleQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

impl TitleQuery {
    fn into_filter(self) -> Result<TitleFilter, Error> {
        let mut errors = FieldErrors::default();
        let category = parse_optional(&mut errors, "category", self.category, Slug::new);
        let genre = parse_optional(&mut errors, "genre", self.genre, Slug::new);
        errors.finish()?;
        Ok(TitleFilter {
            category,
            genre,
            name: self.name.filter(|name| !name.trim().is_empty()),
            year: self.year,
        })
    }
}

/// Request body for `POST /api/v1/titles`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Category slug.
    pub category: Option<String>,
}

/// Request body for `PATCH /api/v1/titles/{id}`.
///
/// `description` and `category` may be set to `null` to clear them.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// Replacement genre slugs.
    pub genre: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

fn parse_slugs(errors: &mut FieldErrors, raw: Vec<String>) -> Vec<Slug> {
    raw.into_iter()
        .filter_map(|slug| errors.check("genre", Slug::new(slug)))
        .collect()
}

fn parse_draft(body: CreateTitleRequest) -> Result<TitleDraft, Error> {
    let mut errors = FieldErrors::default();
    let name = parse_required(&mut errors, "name", body.name, TitleName::new);
    let year = required(&mut errors, "year", body.year);
    let category = parse_optional(&mut errors, "category", body.category, Slug::new);
    let genres = parse_slugs(&mut errors, body.genre);
    match (name, year) {
        (Some(name), Some(year)) if errors.is_empty() => Ok(TitleDraft {
            name,
            year,
            description: body.description,
            category,
            genres,
        }),
        _ => Err(errors.into_error()),
    }
}

fn parse_patch(body: UpdateTitleRequest) -> Result<TitlePatch, Error> {
    let mut errors = FieldErrors::default();
    let name = parse_optional(&mut errors, "name", body.name, TitleName::new);
    let category = match body.category {
        Some(Some(raw)) => errors.check("category", Slug::new(raw)).map(Some),
        Some(None) => Some(None),
        None => None,
    };
    let genres = body.genre.map(|raw| parse_slugs(&mut errors, raw));
    errors.finish()?;
    Ok(TitlePatch {
        name,
        year: body.year,
        description: body.description,
        category,
        genres,
    })
}

/// List titles, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(PageQuery, TitleQuery),
    responses(
        (status = 200, description = "Page of titles", body = Page<TitleBody>),
        (status = 400, description = "Invalid filter or pagination", body = ErrorSchema),
        (status = 404, description = "Page out of range", body = ErrorSchema)
    ),
    tags = ["titles"],
    operation_id = "listTitles",
    security([])
)]
#[get("/titles")]
pub async fn list_titles(
    req: HttpRequest,
    state: web::Data<HttpState>,
    page: web::Query<PageQuery>,
    query: web::Query<TitleQuery>,
) -> ApiResult<web::Json<Page<TitleBody>>> {
    let request = page.into_inner().request(&state)?;
    let filter = query.into_inner().into_filter()?;
    let listing = state.titles.list(filter, request).await?;
    envelope(&req, listing, request, TitleBody::from).map(web::Json)
}

/// Create a title.
#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = CreateTitleRequest,
    responses(
        (status = 201, description = "Title created", body = TitleBody),
        (status = 400, description = "Invalid fields, future year or unknown slug", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["titles"],
    operation_id = "createTitle"
)]
#[post("/titles")]
pub async fn create_title(
    actor: Actor,
    state: web::Data<HttpState>,
    payload: web::Json<CreateTitleRequest>,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::ManageCatalogue)?;
    let draft = parse_draft(payload.into_inner())?;
    let title = state.titles.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(TitleBody::from(title)))
}

/// Fetch one title.
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title identifier")),
    responses(
        (status = 200, description = "Title", body = TitleBody),
        (status = 404, description = "Unknown title", body = ErrorSchema)
    ),
    tags = ["titles"],
    operation_id = "getTitle",
    security([])
)]
#[get("/titles/{title_id}")]
pub async fn get_title(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TitleBody>> {
    let title = state.titles.get(TitleId::new(path.into_inner())).await?;
    Ok(web::Json(title.into()))
}

/// Partially update a title.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title identifier")),
    request_body = UpdateTitleRequest,
    responses(
        (status = 200, description = "Updated title", body = TitleBody),
        (status = 400, description = "Invalid fields, future year or unknown slug", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown title", body = ErrorSchema)
    ),
    tags = ["titles"],
    operation_id = "updateTitle"
)]
#[patch("/titles/{title_id}")]
pub async fn update_title(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateTitleRequest>,
) -> ApiResult<web::Json<TitleBody>> {
    actor.require(Capability::ManageCatalogue)?;
    let patch = parse_patch(payload.into_inner())?;
    let title = state
        .titles
        .update(&actor, TitleId::new(path.into_inner()), patch)
        .await?;
    Ok(web::Json(title.into()))
}

/// Delete a title with its reviews and their comments.
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title identifier")),
    responses(
        (status = 204, description = "Title deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown title", body = ErrorSchema)
    ),
    tags = ["titles"],
    operation_id = "deleteTitle"
)]
#[delete("/titles/{title_id}")]
pub async fn delete_title(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .titles
        .delete(&actor, TitleId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
