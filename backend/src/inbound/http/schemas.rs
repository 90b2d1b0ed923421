//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of `ToSchema` derives; the wrappers below mirror
//! their serialised shape so the generated document matches the wire format.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Malformed input or failed validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Missing, invalid or expired bearer token.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The caller's role does not allow the action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Unknown resource or route.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource does not support the method.
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The database is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected server failure; the message is redacted.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Validation failures list messages per field under `details.fields`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "validation failed")]
    message: String,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(rename = "traceId", example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    /// Supplementary details.
    #[schema(example = json!({"fields": {"score": ["score must be between 1 and 10"]}}))]
    details: Option<serde_json::Value>,
}
