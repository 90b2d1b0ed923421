//! User administration and self-service profile endpoints.
//!
//! ```text
//! GET    /api/v1/users?search=ad
//! POST   /api/v1/users
//! GET    /api/v1/users/me
//! PATCH  /api/v1/users/me
//! GET    /api/v1/users/{username}
//! PATCH  /api/v1/users/{username}
//! DELETE /api/v1/users/{username}
//! ```
//!
//! `PUT /api/v1/users/{username}` is answered with 405 so clients use PATCH.

use std::str::FromStr;

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Actor, Capability, Email, Error, FieldErrors, NewUser, Profile, Role, User, UserChanges,
    Username, validate_person_name,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::pagination::{PageQuery, SearchQuery, envelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional, parse_required};

/// Account representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    /// One of `user`, `moderator`, `admin`.
    #[schema(example = "user")]
    pub role: String,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        let profile = user.profile().clone();
        Self {
            username: user.username().to_string(),
            email: user.email().to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            bio: profile.bio,
            role: user.role().as_str().to_owned(),
        }
    }
}

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Request body for user PATCH endpoints; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    /// Ignored on `/users/me`.
    pub role: Option<String>,
}

fn person_name(raw: String) -> Result<String, crate::domain::UserValidationError> {
    validate_person_name(&raw).map(|()| raw)
}

fn parse_new_user(body: CreateUserRequest) -> Result<NewUser, Error> {
    let mut errors = FieldErrors::default();
    let username = parse_required(&mut errors, "username", body.username, Username::new);
    let email = parse_required(&mut errors, "email", body.email, Email::new);
    let role = parse_optional(&mut errors, "role", body.role, |raw| Role::from_str(&raw));
    let first_name = parse_optional(&mut errors, "first_name", body.first_name, person_name);
    let last_name = parse_optional(&mut errors, "last_name", body.last_name, person_name);
    match (username, email) {
        (Some(username), Some(email)) if errors.is_empty() => Ok(NewUser {
            username,
            email,
            role: role.unwrap_or_default(),
            profile: Profile {
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
                bio: body.bio.unwrap_or_default(),
            },
        }),
        _ => Err(errors.into_error()),
    }
}

fn parse_changes(body: UpdateUserRequest, role_editable: bool) -> Result<UserChanges, Error> {
    let mut errors = FieldErrors::default();
    let role = if role_editable {
        parse_optional(&mut errors, "role", body.role, |raw| Role::from_str(&raw))
    } else {
        None
    };
    let changes = UserChanges {
        username: parse_optional(&mut errors, "username", body.username, Username::new),
        email: parse_optional(&mut errors, "email", body.email, Email::new),
        role,
        first_name: parse_optional(&mut errors, "first_name", body.first_name, person_name),
        last_name: parse_optional(&mut errors, "last_name", body.last_name, person_name),
        bio: body.bio,
    };
    errors.finish().map(|()| changes)
}

/// Usernames that cannot be parsed cannot exist either.
fn path_username(raw: &str) -> Result<Username, Error> {
    Username::new(raw).map_err(|_| Error::not_found(format!("user {raw} not found")))
}

/// List accounts.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery, SearchQuery),
    responses(
        (status = 200, description = "Page of users", body = Page<UserBody>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Page out of range", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    actor: Actor,
    state: web::Data<HttpState>,
    page: web::Query<PageQuery>,
    search: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Page<UserBody>>> {
    actor.require(Capability::ManageUsers)?;
    let request = page.into_inner().request(&state)?;
    let listing = state
        .users
        .list(&actor, search.into_inner().search, request)
        .await?;
    envelope(&req, listing, request, UserBody::from).map(web::Json)
}

/// Create an account on behalf of someone.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserBody),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    actor: Actor,
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::ManageUsers)?;
    let new_user = parse_new_user(payload.into_inner())?;
    let user = state.users.create(&actor, new_user).await?;
    Ok(HttpResponse::Created().json(UserBody::from(user)))
}

/// The caller's own account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    actor: Actor,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserBody>> {
    let user = state.users.me(&actor).await?;
    Ok(web::Json(user.into()))
}

/// Update the caller's own account; `role` is ignored.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserBody),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
#[patch("/users/me")]
pub async fn update_current_user(
    actor: Actor,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserBody>> {
    actor.require(Capability::ManageOwnProfile)?;
    let changes = parse_changes(payload.into_inner(), false)?;
    let user = state.users.update_me(&actor, changes).await?;
    Ok(web::Json(user.into()))
}

/// Fetch an account by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "User", body = UserBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown username", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{username}")]
pub async fn get_user(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserBody>> {
    actor.require(Capability::ManageUsers)?;
    let username = path_username(&path)?;
    let user = state.users.get(&actor, &username).await?;
    Ok(web::Json(user.into()))
}

/// Partially update an account.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserBody),
        (status = 400, description = "Invalid or duplicate fields", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown username", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{username}")]
pub async fn update_user(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserBody>> {
    actor.require(Capability::ManageUsers)?;
    let username = path_username(&path)?;
    let changes = parse_changes(payload.into_inner(), true)?;
    let user = state.users.update(&actor, &username, changes).await?;
    Ok(web::Json(user.into()))
}

/// Full replacement is not supported.
#[utoipa::path(
    put,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses((status = 405, description = "Use PATCH instead", body = ErrorSchema)),
    tags = ["users"],
    operation_id = "replaceUser"
)]
#[put("/users/{username}")]
pub async fn replace_user() -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed("method PUT is not allowed; use PATCH"))
}

/// Delete an account together with its reviews, comments and tokens.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Unknown username", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{username}")]
pub async fn delete_user(
    actor: Actor,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    actor.require(Capability::ManageUsers)?;
    let username = path_username(&path)?;
    state.users.delete(&actor, &username).await?;
    Ok(HttpResponse::NoContent().finish())
}
