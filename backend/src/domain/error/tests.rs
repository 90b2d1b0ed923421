//! Tests for the domain error payload and field error accumulation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::method_not_allowed("x"), ErrorCode::MethodNotAllowed)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_a_generic_message_for_blank_input() {
    let error = Error::new(ErrorCode::NotFound, "");
    assert_eq!(error.message(), "not found");
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn with_trace_id_ignores_blank_values(base_error: Error) {
    assert!(base_error.with_trace_id(" ").trace_id().is_none());
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id
        .parse()
        .expect("fixtures provide a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_with_camel_case_trace_id(expected_trace_id: String) {
    let error = Error::forbidden("nope")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"reason": "role"}));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "forbidden",
            "message": "nope",
            "traceId": expected_trace_id,
            "details": {"reason": "role"},
        })
    );
}

#[rstest]
fn deserialising_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}

#[rstest]
fn field_errors_group_messages_by_field() {
    let mut errors = FieldErrors::default();
    errors.push("username", "username is reserved");
    errors.push("email", "enter a valid email address");
    errors.push("username", "username is too long");

    let error = errors.into_error();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "enter a valid email address");
    assert_eq!(
        error.details(),
        Some(&json!({
            "fields": {
                "email": ["enter a valid email address"],
                "username": ["username is reserved", "username is too long"],
            }
        }))
    );
}

#[rstest]
fn field_errors_finish_is_ok_when_empty() {
    assert!(FieldErrors::default().finish().is_ok());
}

#[rstest]
fn check_records_failures_and_passes_values_through() {
    let mut errors = FieldErrors::default();
    let ok: Option<u8> = errors.check("score", Ok::<u8, String>(5));
    let missing: Option<u8> = errors.check("text", Err::<u8, String>("text must not be blank".into()));

    assert_eq!(ok, Some(5));
    assert!(missing.is_none());
    let error = errors.finish().expect_err("one field failed");
    assert_eq!(
        error.details(),
        Some(&json!({"fields": {"text": ["text must not be blank"]}}))
    );
}
