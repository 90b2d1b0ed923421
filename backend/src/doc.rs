//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! request and response bodies, and the error envelope wrappers from
//! [`crate::inbound::http::schemas`]. The document backs Swagger UI in debug
//! builds and is exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{SignupRequest, SignupResponse, TokenRequest, TokenResponse};
use crate::inbound::http::catalogue::{CreateTaxonRequest, TaxonBody};
use crate::inbound::http::reviews::{CommentBody, CommentRequest, ReviewBody, ReviewRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::titles::{CreateTitleRequest, TitleBody, UpdateTitleRequest};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserBody};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Register the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Token issued by POST /api/v1/auth/token."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "YaMDb API",
        description = "Reviews, ratings and comments for films, books and music.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::token,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::replace_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::create_category,
        crate::inbound::http::catalogue::delete_category,
        crate::inbound::http::catalogue::list_genres,
        crate::inbound::http::catalogue::create_genre,
        crate::inbound::http::catalogue::delete_genre,
        crate::inbound::http::titles::list_titles,
        crate::inbound::http::titles::create_title,
        crate::inbound::http::titles::get_title,
        crate::inbound::http::titles::update_title,
        crate::inbound::http::titles::delete_title,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::reviews::list_comments,
        crate::inbound::http::reviews::create_comment,
        crate::inbound::http::reviews::get_comment,
        crate::inbound::http::reviews::update_comment,
        crate::inbound::http::reviews::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        SignupRequest,
        SignupResponse,
        TokenRequest,
        TokenResponse,
        UserBody,
        CreateUserRequest,
        UpdateUserRequest,
        TaxonBody,
        CreateTaxonRequest,
        TitleBody,
        CreateTitleRequest,
        UpdateTitleRequest,
        ReviewBody,
        ReviewRequest,
        CommentBody,
        CommentRequest,
    )),
    tags(
        (name = "auth", description = "Sign-up and token exchange"),
        (name = "users", description = "Account administration and own profile"),
        (name = "categories", description = "Title categories"),
        (name = "genres", description = "Title genres"),
        (name = "titles", description = "Catalogued works and their ratings"),
        (name = "reviews", description = "Scored reviews of a title"),
        (name = "comments", description = "Replies to a review"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
