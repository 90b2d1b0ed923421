//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies deserialise into loosely typed DTOs (every field optional)
//! and are then parsed field by field into domain values, collecting every
//! failure into one [`FieldErrors`] so clients see all problems at once.

use std::fmt::Display;

use serde::{Deserialize, Deserializer};

use crate::domain::FieldErrors;

/// Message recorded against absent mandatory fields.
pub(crate) const REQUIRED: &str = "this field is required";

/// Require `value`, recording [`REQUIRED`] against `field` when absent.
pub(crate) fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.push(field, REQUIRED);
    }
    value
}

/// Require and parse `value`.
pub(crate) fn parse_required<R, T, E: Display>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<R>,
    parse: impl FnOnce(R) -> Result<T, E>,
) -> Option<T> {
    required(errors, field, value).and_then(|raw| errors.check(field, parse(raw)))
}

/// Parse `value` when present; absence is not an error.
pub(crate) fn parse_optional<R, T, E: Display>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<R>,
    parse: impl FnOnce(R) -> Result<T, E>,
) -> Option<T> {
    value.and_then(|raw| errors.check(field, parse(raw)))
}

/// Deserialise a field where `null` is meaningful.
///
/// Combined with `#[serde(default)]` an absent field stays `None` while an
/// explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
