//! Category and genre endpoints.
//!
//! ```text
//! GET    /api/v1/categories?search=fil
//! POST   /api/v1/categories {"name":"Film","slug":"film"}
//! DELETE /api/v1/categories/{slug}
//! GET    /api/v1/genres
//! POST   /api/v1/genres
//! DELETE /api/v1/genres/{slug}
//! ```
//!
//! Both taxonomies share one implementation parameterised by
//! [`TaxonomyKind`]; the thin route functions exist for routing and OpenAPI.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Actor, Capability, Error, FieldErrors, Slug, Taxon, TaxonName, TaxonomyKind,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pagination::{PageQuery, SearchQuery, envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_required;

/// Category or genre representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaxonBody {
    #[schema(example = "Drama")]
    pub name: String,
    #[schema(example = "drama")]
    pub slug: String,
}

impl From<Taxon> for TaxonBody {
    fn from(taxon: Taxon) -> Self {
        Self {
            name: taxon.name.as_str().to_owned(),
            slug: taxon.slug.as_str().to_owned(),
        }
    }
}

/// Request body for creating a category or genre.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateTaxonRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

fn parse_taxon(body: CreateTaxonRequest) -> Result<Taxon, Error> {
    let mut errors = FieldErrors::default();
    let name = parse_required(&mut errors, "name", body.name, TaxonName::new);
    let slug = parse_required(&mut errors, "slug", body.slug, Slug::new);
    match (name, slug) {
        (Some(name), Some(slug)) if errors.is_empty() => Ok(Taxon { name, slug }),
        _ => Err(errors.into_error()),
    }
}

async fn list_entries(
    kind: TaxonomyKind,
    req: &HttpRequest,
    state: &HttpState,
    page: PageQuery,
    search: SearchQuery,
) -> ApiResult<web::Json<Page<TaxonBody>>> {
    let request = page.request(state)?;
    let listing = state.catalogue.list(kind, search.search, request).await?;
    envelope(req, listing, request, TaxonBody::from).map(web::Json)
}

async fn create_entry(
    kind: TaxonomyKind,
    actor: &Actor,
    state: &HttpState,
    body: CreateTaxonRequest,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::ManageCatalogue)?;
    let taxon = parse_taxon(body)?;
    let created = state.catalogue.create(actor, kind, taxon).await?;
    Ok(HttpResponse::Created().json(TaxonBody::from(created)))
}

async fn delete_entry(
    kind: TaxonomyKind,
    actor: &Actor,
    state: &HttpState,
    raw_slug: &str,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::ManageCatalogue)?;
    let slug = Slug::new(raw_slug)
        .map_err(|_| Error::not_found(format!("{kind} {raw_slug} not found")))?;
    state.catalogue.delete(actor, kind, &slug).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(PageQuery, SearchQuery),
    responses(
        (status = 200, description = "Page of categories", body = Page<TaxonBody>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 404, description = "Page out of range", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    req: HttpRequest,
    state: web::Data<HttpState>,
    page: web::Query<PageQuery>,
    search: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Page<TaxonBody>>> {
    list_entries(
        TaxonomyKind::Category,
        &req,
        &state,
        page.into_inner(),
        search.into_inner(),
    )
    .await
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateTaxonRequest,
    responses(
        (status = 201, description = "Category created", body = TaxonBody),
        (status = 400, description = "Invalid fields or duplicate slug", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    actor: Actor,
    state: web::Data<HttpState>,
    payload: web::Json<CreateTaxonRequest>,
) -> ApiResult<HttpResponse> {
    create_entry(TaxonomyKind::Category, &actor, &state, payload.into_inner()).await
}

/// Delete a category; its titles keep existing without one.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown slug", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{slug}")]
pub async fn delete_category(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_entry(TaxonomyKind::Category, &actor, &state, &path).await
}

/// List genres.
#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(PageQuery, SearchQuery),
    responses(
        (status = 200, description = "Page of genres", body = Page<TaxonBody>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 404, description = "Page out of range", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listGenres",
    security([])
)]
#[get("/genres")]
pub async fn list_genres(
    req: HttpRequest,
    state: web::Data<HttpState>,
    page: web::Query<PageQuery>,
    search: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Page<TaxonBody>>> {
    list_entries(
        TaxonomyKind::Genre,
        &req,
        &state,
        page.into_inner(),
        search.into_inner(),
    )
    .await
}

/// Create a genre.
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = CreateTaxonRequest,
    responses(
        (status = 201, description = "Genre created", body = TaxonBody),
        (status = 400, description = "Invalid fields or duplicate slug", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createGenre"
)]
#[post("/genres")]
pub async fn create_genre(
    actor: Actor,
    state: web::Data<HttpState>,
    payload: web::Json<CreateTaxonRequest>,
) -> ApiResult<HttpResponse> {
    create_entry(TaxonomyKind::Genre, &actor, &state, payload.into_inner()).await
}

/// Delete a genre and unlink it from every title.
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown slug", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteGenre"
)]
#[delete("/genres/{slug}")]
pub async fn delete_genre(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_entry(TaxonomyKind::Genre, &actor, &state, &path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestHarness, bearer};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn create(
        harness: &TestHarness,
        collection: &str,
        token: Option<&str>,
        body: Value,
    ) -> (u16, Value) {
        let app = actix_test::init_service(harness.app()).await;
        let mut request = actix_test::TestRequest::post()
            .uri(&format!("/api/v1/{collection}"))
            .set_json(body);
        if let Some(token) = token {
            request = request.insert_header(bearer(token));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status().as_u16();
        (status, actix_test::read_body_json(response).await)
    }

    async fn get_json(harness: &TestHarness, uri: &str) -> (u16, Value) {
        let app = actix_test::init_service(harness.app()).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        let status = response.status().as_u16();
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[case("categories")]
    #[case("genres")]
    #[actix_web::test]
    async fn admin_creates_and_anyone_lists(#[case] collection: &str) {
        let harness = TestHarness::new();
        let admin = harness.token_for("root", Role::Admin).await;

        let (status, body) = create(
            &harness,
            collection,
            Some(&admin),
            json!({"name": "Science Fiction", "slug": "sci-fi"}),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(body, json!({"name": "Science Fiction", "slug": "sci-fi"}));

        let (status, page) = get_json(&harness, &format!("/api/v1/{collection}?search=fiction")).await;
        assert_eq!(status, 200);
        assert_eq!(
            page,
            json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{"name": "Science Fiction", "slug": "sci-fi"}]
            })
        );
    }

    #[rstest]
    #[case(None, 401)]
    #[case(Some(Role::Moderator), 403)]
    #[actix_web::test]
    async fn only_admins_create(#[case] role: Option<Role>, #[case] status: u16) {
        let harness = TestHarness::new();
        let token = match role {
            Some(role) => Some(harness.token_for("caller", role).await),
            None => None,
        };
        let (code, _) = create(
            &harness,
            "genres",
            token.as_deref(),
            json!({"name": "Drama", "slug": "drama"}),
        )
        .await;
        assert_eq!(code, status);
    }

    #[rstest]
    #[case(json!({"name": "Drama", "slug": "drama"}), "slug")]
    #[case(json!({"name": "Drama", "slug": "has space"}), "slug")]
    #[case(json!({"name": "", "slug": "blank"}), "name")]
    #[case(json!({"slug": "nameless"}), "name")]
    #[actix_web::test]
    async fn create_rejects_invalid_or_duplicate(#[case] body: Value, #[case] field: &str) {
        let harness = TestHarness::new();
        let admin = harness.token_for("root", Role::Admin).await;
        harness.taxon(TaxonomyKind::Genre, "drama").await;

        let (status, response) = create(&harness, "genres", Some(&admin), body).await;

        assert_eq!(status, 400);
        assert!(
            response
                .get("details")
                .and_then(|details| details.get("fields"))
                .and_then(|fields| fields.get(field))
                .is_some(),
            "{response}"
        );
    }

    #[actix_web::test]
    async fn delete_removes_entry_and_reports_unknown_slugs() {
        let harness = TestHarness::new();
        let admin = harness.token_for("root", Role::Admin).await;
        harness.taxon(TaxonomyKind::Category, "film").await;
        let app = actix_test::init_service(harness.app()).await;

        for (slug, status) in [("film", 204), ("film", 404), ("not%20a%20slug", 404)] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::delete()
                    .uri(&format!("/api/v1/categories/{slug}"))
                    .insert_header(bearer(&admin))
                    .to_request(),
            )
            .await;
            assert_eq!(response.status().as_u16(), status, "{slug}");
        }
    }

    #[actix_web::test]
    async fn pages_through_genres() {
        let harness = TestHarness::new();
        for slug in ["a", "b", "c", "d", "e", "f", "g"] {
            harness.taxon(TaxonomyKind::Genre, slug).await;
        }

        let (_, first) = get_json(&harness, "/api/v1/genres").await;
        let (_, second) = get_json(&harness, "/api/v1/genres?page=2").await;
        let (beyond, _) = get_json(&harness, "/api/v1/genres?page=3").await;

        assert_eq!(first.get("count"), Some(&json!(7)));
        assert_eq!(
            first.get("results").and_then(Value::as_array).map(Vec::len),
            Some(5)
        );
        assert!(first.get("next").and_then(Value::as_str).is_some());
        assert_eq!(
            second.get("results").and_then(Value::as_array).map(Vec::len),
            Some(2)
        );
        assert_eq!(second.get("next"), Some(&Value::Null));
        assert_eq!(beyond, 404);
    }
}
