//! Signup and token exchange endpoints.
//!
//! ```text
//! POST /api/v1/auth/signup {"username":"ada","email":"ada@example.com"}
//! POST /api/v1/auth/token  {"username":"ada","confirmation_code":"..."}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConfirmationCode, Email, Error, FieldErrors, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_required;

/// Request body for `POST /api/v1/auth/signup`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Echo of the registered pair returned by signup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /api/v1/auth/token`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Bearer token issued for a confirmed account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

fn parse_signup(body: SignupRequest) -> Result<(Username, Email), Error> {
    let mut errors = FieldErrors::default();
    let username = parse_required(&mut errors, "username", body.username, Username::new);
    let email = parse_required(&mut errors, "email", body.email, Email::new);
    match (username, email) {
        (Some(username), Some(email)) if errors.is_empty() => Ok((username, email)),
        _ => Err(errors.into_error()),
    }
}

fn parse_token_request(body: TokenRequest) -> Result<(Username, ConfirmationCode), Error> {
    let mut errors = FieldErrors::default();
    let username = parse_required(&mut errors, "username", body.username, Username::new);
    let code = parse_required(
        &mut errors,
        "confirmation_code",
        body.confirmation_code,
        |raw: String| ConfirmationCode::parse(&raw),
    );
    match (username, code) {
        (Some(username), Some(code)) if errors.is_empty() => Ok((username, code)),
        _ => Err(errors.into_error()),
    }
}

/// Register (or re-register) an account and mail a confirmation code.
///
/// Re-submitting the same username and email issues a fresh code; the
/// previous one stops working.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = SignupResponse),
        (status = 400, description = "Invalid or conflicting username or email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<SignupResponse>> {
    let (username, email) = parse_signup(payload.into_inner())?;
    let user = state.auth.signup(username, email).await?;
    Ok(web::Json(SignupResponse {
        username: user.username().to_string(),
        email: user.email().to_string(),
    }))
}

/// Exchange a confirmation code for a bearer token.
///
/// Codes are single use: a successful exchange consumes the code and marks
/// the account verified.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing, expired or wrong confirmation code", body = ErrorSchema),
        (status = 404, description = "Unknown username", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "obtainToken",
    security([])
)]
#[post("/auth/token")]
pub async fn token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let (username, code) = parse_token_request(payload.into_inner())?;
    let token = state.auth.exchange_token(&username, &code).await?;
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestHarness, bearer};
    use actix_web::test as actix_test;
    use chrono::TimeDelta;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn post(harness: &TestHarness, uri: &str, body: Value) -> (u16, Value) {
        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status().as_u16();
        (status, actix_test::read_body_json(response).await)
    }

    fn field_messages<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
        body.get("details")
            .and_then(|details| details.get("fields"))
            .and_then(|fields| fields.get(field))
    }

    async fn signup_ada(harness: &TestHarness) -> String {
        let (status, body) = post(
            harness,
            "/api/v1/auth/signup",
            json!({"username": "ada", "email": "ada@example.com"}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"username": "ada", "email": "ada@example.com"}));
        harness.mailed_code("ada@example.com")
    }

    #[actix_web::test]
    async fn signup_then_token_then_authenticated_request() {
        let harness = TestHarness::new();
        let code = signup_ada(&harness).await;

        let (status, body) = post(
            &harness,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": code}),
        )
        .await;
        assert_eq!(status, 200);
        let issued_token = body
            .get("token")
            .and_then(Value::as_str)
            .expect("token issued")
            .to_owned();

        let app = actix_test::init_service(harness.app()).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/me/")
            .insert_header(bearer(&issued_token))
            .to_request();
        let me: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(me.get("username"), Some(&json!("ada")));
    }

    #[rstest]
    #[case(json!({"username": "me", "email": "me@example.com"}), "username")]
    #[case(json!({"username": "ME", "email": "upper@example.com"}), "username")]
    #[case(json!({"username": "bad name!", "email": "x@example.com"}), "username")]
    #[case(json!({"username": "ada", "email": "not-an-email"}), "email")]
    #[case(json!({"email": "ada@example.com"}), "username")]
    #[case(json!({"username": "ada"}), "email")]
    #[actix_web::test]
    async fn signup_rejects_invalid_fields(#[case] body: Value, #[case] field: &str) {
        let harness = TestHarness::new();
        let (status, response) = post(&harness, "/api/v1/auth/signup", body).await;
        assert_eq!(status, 400);
        assert!(field_messages(&response, field).is_some(), "{response}");
        assert!(harness.mailer.sent().is_empty());
    }

    #[actix_web::test]
    async fn signup_rejects_email_of_another_user() {
        let harness = TestHarness::new();
        signup_ada(&harness).await;

        let (status, body) = post(
            &harness,
            "/api/v1/auth/signup",
            json!({"username": "grace", "email": "ada@example.com"}),
        )
        .await;

        assert_eq!(status, 400);
        assert!(field_messages(&body, "email").is_some());
    }

    #[actix_web::test]
    async fn code_is_single_use() {
        let harness = TestHarness::new();
        let code = signup_ada(&harness).await;
        let body = json!({"username": "ada", "confirmation_code": code});

        let (first, _) = post(&harness, "/api/v1/auth/token", body.clone()).await;
        let (second, response) = post(&harness, "/api/v1/auth/token", body).await;

        assert_eq!(first, 200);
        assert_eq!(second, 400);
        assert!(field_messages(&response, "confirmation_code").is_some());
    }

    #[actix_web::test]
    async fn resubmitting_signup_replaces_the_code() {
        let harness = TestHarness::new();
        let first = signup_ada(&harness).await;
        let second = signup_ada(&harness).await;

        let (stale, _) = post(
            &harness,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": first}),
        )
        .await;
        let (fresh, _) = post(
            &harness,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": second}),
        )
        .await;

        assert_eq!((stale, fresh), (400, 200));
    }

    #[actix_web::test]
    async fn expired_code_is_rejected() {
        let harness = TestHarness::new();
        let code = signup_ada(&harness).await;
        harness.clock.advance(TimeDelta::hours(2));

        let (status, _) = post(
            &harness,
            "/api/v1/auth/token",
            json!({"username": "ada", "confirmation_code": code}),
        )
        .await;

        assert_eq!(status, 400);
    }

    #[rstest]
    #[case(json!({"username": "ghost", "confirmation_code": "ABCDEF123456"}), 404)]
    #[case(json!({"username": "ghost"}), 400)]
    #[case(json!({"confirmation_code": "ABCDEF123456"}), 400)]
    #[actix_web::test]
    async fn token_request_failures(#[case] body: Value, #[case] status: u16) {
        let harness = TestHarness::new();
        let (code, _) = post(&harness, "/api/v1/auth/token", body).await;
        assert_eq!(code, status);
    }
}
