//! # Response Validation
//!
//! Checks an outbound response body against the response declared for its
//! status code. At most one error is produced per response.

use apiguard_core::ValidationError;
use serde_json::{json, Value};

use crate::compile::RouteMatch;

/// Validate a response body for `route`, `method` and `status`.
///
/// - No route: the `{actual: "UNDEFINED_PATH", expected: "PATH"}` sentinel.
/// - No operation for `method`: the `UNDEFINED_METHOD` sentinel.
/// - Otherwise the response for `status` is used, falling back to
///   `"default"`; with neither declared, `{actual: body, expected: {}}`.
///
/// `None` means the body conforms.
pub fn validate_response(
    route: Option<&RouteMatch<'_>>,
    method: &str,
    status: u16,
    body: Option<&Value>,
) -> Option<ValidationError> {
    let Some(route) = route else {
        return Some(ValidationError::undefined_path());
    };
    let Some(operation) = route.operation(method) else {
        return Some(ValidationError::undefined_method());
    };

    let error = match operation.response_for(status) {
        Some(response) => response.validate(body),
        None => Some(ValidationError::new(body.cloned(), Some(json!({})))),
    };
    if error.is_some() {
        tracing::debug!(route = route.name(), method, status, "response does not conform");
    }
    error
}
