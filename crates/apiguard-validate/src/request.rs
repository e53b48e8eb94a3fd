//! # Request Validation
//!
//! Checks an inbound request against the operation its route and method
//! select. Conformance problems come back as a list of
//! [`ValidationError`]s; an empty list means the request conforms.
//!
//! Routing outcomes are not errors: no route, or no operation for the
//! method, yields `Ok(None)` and the caller maps it to its own transport
//! semantics (404 / 405).

use std::borrow::Cow;

use apiguard_core::{Location, RouteFault, ValidationError, ValueMap};
use serde_json::Value;

use crate::check::is_empty_body;
use crate::compile::{CompiledParameter, RouteMatch};

/// The parts of a request that are checked against the contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestInput<'a> {
    /// Decoded query string. Repeated keys may be given as sequences.
    pub query: Option<&'a ValueMap>,
    /// Parsed body, if one was sent.
    pub body: Option<&'a Value>,
    pub headers: Option<&'a ValueMap>,
}

impl<'a> RequestInput<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: &'a ValueMap) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn headers(mut self, headers: &'a ValueMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Header lookup: exact key first, then ASCII case-insensitive.
    fn header(&self, name: &str) -> Option<&'a Value> {
        let headers = self.headers?;
        headers.get(name).or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }
}

/// Validate a request against `route` and `method`.
///
/// Returns `Ok(None)` when `route` is `None` (route not found) or the route
/// declares no operation for `method` (method not allowed), and otherwise
/// `Ok(Some(errors))`.
///
/// # Errors
///
/// Returns [`RouteFault::MissingPathPlaceholder`] if a declared path
/// parameter cannot be located in the route's template tokens or in the
/// matched path. That is a compiler/validator inconsistency, never a
/// conformance problem.
pub fn validate_request(
    route: Option<&RouteMatch<'_>>,
    method: &str,
    input: RequestInput<'_>,
) -> Result<Option<Vec<ValidationError>>, RouteFault> {
    let Some(route) = route else {
        return Ok(None);
    };
    let Some(operation) = route.operation(method) else {
        return Ok(None);
    };

    let mut errors = Vec::new();

    if operation.parameters().is_empty() {
        if let Some(error) = check_empty_body(input.body) {
            errors.push(error);
        }
        if let Some(query) = input.query {
            errors.extend(
                query
                    .iter()
                    .map(|(name, value)| ValidationError::unexpected_query(name, value)),
            );
        }
        log_outcome(route, method, &errors);
        return Ok(Some(errors));
    }

    let mut body_declared = false;
    for parameter in operation.parameters() {
        let value = match parameter.location() {
            Location::Query => input.query.and_then(|q| q.get(parameter.name())).map(Cow::Borrowed),
            Location::Header => input.header(parameter.name()).map(Cow::Borrowed),
            Location::Path => Some(Cow::Owned(path_value(route, parameter)?)),
            Location::Body => {
                body_declared = true;
                input.body.map(Cow::Borrowed)
            }
        };
        if let Some(error) = parameter.validate(value.as_deref()) {
            errors.push(error);
        }
    }

    if !body_declared {
        if let Some(error) = check_empty_body(input.body) {
            errors.push(error);
        }
    }

    log_outcome(route, method, &errors);
    Ok(Some(errors))
}

fn path_value(route: &RouteMatch<'_>, parameter: &CompiledParameter) -> Result<Value, RouteFault> {
    match route.path_value(parameter.name()) {
        Some(raw) => Ok(Value::String(raw.to_string())),
        None => {
            tracing::error!(
                route = route.name(),
                parameter = parameter.name(),
                "path parameter has no placeholder in the matched route"
            );
            Err(RouteFault::MissingPathPlaceholder {
                route: route.name().to_string(),
                parameter: parameter.name().to_string(),
            })
        }
    }
}

fn check_empty_body(body: Option<&Value>) -> Option<ValidationError> {
    (!is_empty_body(body)).then(|| ValidationError::new(body.cloned(), None).at(Location::Body))
}

fn log_outcome(route: &RouteMatch<'_>, method: &str, errors: &[ValidationError]) {
    if !errors.is_empty() {
        tracing::debug!(
            route = route.name(),
            method,
            errors = errors.len(),
            "request does not conform"
        );
    }
}
