//! # Path Compiler
//!
//! Turns a fully-dereferenced contract document into a [`Compiled`]
//! matcher. Compilation happens once; everything it produces is immutable
//! and read by the request and response validators.
//!
//! ## What gets compiled
//!
//! - Every operation's parameters are merged with its path-level
//!   parameters, keyed by `(name, location)`.
//! - Every parameter gets a [`FieldCheck`]: query and header values are
//!   coerced from their transport strings first, as are path segments
//!   declared numeric or boolean. Other path values and bodies are
//!   validated as supplied.
//! - Every response gets a [`FieldCheck`]: its schema if one is declared,
//!   otherwise a check that the body is empty.
//! - Every path template becomes a pattern: the base path, the template
//!   with each `{name}` replaced by a one-segment matcher, anchored at the
//!   end of the string.
//!
//! ## Matching
//!
//! An inbound path is tested against every pattern in a single
//! [`RegexSet`] pass. Exactly one match selects the route; zero or several
//! matches select nothing. Ambiguity is never resolved by priority.

use std::collections::BTreeMap;
use std::ops::Deref;

use apiguard_core::{
    CompileError, DataType, Document, Location, Method, Operation, Parameter, PathItem, Response,
    ValidationError, DEFAULT_RESPONSE,
};
use regex::{Regex, RegexSet};
use serde_json::{Map, Value};

use crate::check::{CompiledSchema, FieldCheck};

/// Matches any single non-empty path segment.
const SEGMENT_PATTERN: &str = "[^/]+";

/// A parameter with its precompiled check.
#[derive(Debug)]
pub struct CompiledParameter {
    parameter: Parameter,
    expected: Option<Value>,
    check: FieldCheck,
}

impl CompiledParameter {
    fn compile(parameter: &Parameter) -> Result<Self, String> {
        let schema = CompiledSchema::compile(parameter.json_schema())?;
        let check = if coerces(parameter) {
            FieldCheck::Coercing {
                required: parameter.required,
                declared: parameter.simple.clone(),
                schema,
            }
        } else {
            FieldCheck::Strict {
                required: parameter.required,
                schema,
            }
        };
        Ok(Self {
            expected: expectation(
                parameter.schema.as_ref(),
                parameter.simple.data_type,
                parameter.simple.format.as_deref(),
            ),
            parameter: parameter.clone(),
            check,
        })
    }

    /// The declaration this check was built from.
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn name(&self) -> &str {
        &self.parameter.name
    }

    pub fn location(&self) -> Location {
        self.parameter.location
    }

    /// Check `value`, returning a located error on mismatch.
    ///
    /// The error's `actual` is the value as supplied, before coercion.
    pub fn validate(&self, value: Option<&Value>) -> Option<ValidationError> {
        if self.check.accepts(value) {
            return None;
        }
        let error = ValidationError::new(value.cloned(), self.expected.clone()).at(self.location());
        Some(if self.location().is_transport_string() {
            error.named(self.name())
        } else {
            error
        })
    }
}

/// Query and header values are always transport strings. Path segments
/// are too, but only need converting when the declared type is numeric or
/// boolean; every other path type is checked as the raw string.
fn coerces(parameter: &Parameter) -> bool {
    match parameter.location {
        Location::Query | Location::Header => true,
        Location::Path => matches!(
            parameter.simple.data_type,
            Some(DataType::Number | DataType::Integer | DataType::Boolean)
        ),
        Location::Body => false,
    }
}

/// A response entry with its precompiled check.
#[derive(Debug)]
pub struct CompiledResponse {
    response: Response,
    expected: Option<Value>,
    check: FieldCheck,
}

impl CompiledResponse {
    fn compile(response: &Response) -> Result<Self, String> {
        let check = match &response.schema {
            Some(schema) => FieldCheck::Strict {
                required: true,
                schema: CompiledSchema::compile(schema.clone())?,
            },
            None => FieldCheck::Empty,
        };
        Ok(Self {
            expected: expectation(response.schema.as_ref(), None, None),
            response: response.clone(),
            check,
        })
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Check a response body, `None` meaning no body was sent.
    pub fn validate(&self, body: Option<&Value>) -> Option<ValidationError> {
        if self.check.accepts(body) {
            None
        } else {
            Some(ValidationError::new(body.cloned(), self.expected.clone()))
        }
    }
}

/// An operation with its resolved parameter list and compiled responses.
#[derive(Debug)]
pub struct CompiledOperation {
    operation: Operation,
    parameters: Vec<CompiledParameter>,
    responses: BTreeMap<String, CompiledResponse>,
}

impl CompiledOperation {
    fn compile(
        route: &str,
        method: Method,
        operation: &Operation,
        shared: &[Parameter],
    ) -> Result<Self, CompileError> {
        let invalid = |field: String, reason: String| CompileError::InvalidSchema {
            route: route.to_string(),
            method: method.to_string(),
            field,
            reason,
        };

        let parameters = operation
            .resolved_parameters(shared)
            .iter()
            .map(|p| {
                CompiledParameter::compile(p).map_err(|reason| {
                    invalid(format!("parameter '{}' in {}", p.name, p.location), reason)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let responses = operation
            .responses
            .iter()
            .map(|(status, response)| {
                CompiledResponse::compile(response)
                    .map(|compiled| (status.clone(), compiled))
                    .map_err(|reason| invalid(format!("response {status}"), reason))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            operation: operation.clone(),
            parameters,
            responses,
        })
    }

    /// The operation as declared.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Path-level and operation-level parameters, merged.
    pub fn parameters(&self) -> &[CompiledParameter] {
        &self.parameters
    }

    /// The response declared for `status`, falling back to `"default"`.
    pub fn response_for(&self, status: u16) -> Option<&CompiledResponse> {
        self.responses
            .get(status.to_string().as_str())
            .or_else(|| self.responses.get(DEFAULT_RESPONSE))
    }
}

/// One path template, compiled.
#[derive(Debug)]
pub struct CompiledRoute {
    name: String,
    pattern: Regex,
    tokens: Vec<String>,
    item: PathItem,
    operations: BTreeMap<Method, CompiledOperation>,
}

impl CompiledRoute {
    fn compile(base_path: &str, name: &str, item: &PathItem) -> Result<Self, CompileError> {
        let pattern =
            Regex::new(&route_pattern(base_path, name)).map_err(|e| CompileError::InvalidPattern {
                route: name.to_string(),
                reason: e.to_string(),
            })?;

        let operations = item
            .operations()
            .map(|(method, op)| {
                CompiledOperation::compile(name, method, op, &item.parameters)
                    .map(|compiled| (method, compiled))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        tracing::debug!(
            route = name,
            pattern = pattern.as_str(),
            operations = operations.len(),
            "compiled route"
        );

        Ok(Self {
            name: name.to_string(),
            tokens: segments(name).map(str::to_string).collect(),
            pattern,
            item: item.clone(),
            operations,
        })
    }

    /// The path template, e.g. `/pets/{petId}`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The anchored matching pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Non-empty segments of the template, placeholders in brace form.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The path item as declared.
    pub fn path_item(&self) -> &PathItem {
        &self.item
    }

    /// The compiled operation for a method name, matched case-insensitively.
    /// Unknown method names have no operation.
    pub fn operation(&self, method: &str) -> Option<&CompiledOperation> {
        let method: Method = method.parse().ok()?;
        self.operations.get(&method)
    }

    /// Declared methods, in canonical order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.operations.keys().copied()
    }

    /// Position of the `{name}` placeholder among the template tokens.
    pub fn placeholder_index(&self, parameter: &str) -> Option<usize> {
        let placeholder = format!("{{{parameter}}}");
        self.tokens.iter().position(|token| *token == placeholder)
    }
}

/// A route selected for an inbound path.
///
/// Carries the inbound segments aligned with the template tokens: the
/// pattern is anchored at the end, so the last `tokens().len()` segments of
/// the path line up with the template position by position.
#[derive(Debug, Clone)]
pub struct RouteMatch<'c> {
    route: &'c CompiledRoute,
    segments: Vec<String>,
}

impl<'c> RouteMatch<'c> {
    fn new(route: &'c CompiledRoute, path: &str) -> Self {
        let all: Vec<&str> = segments(path).collect();
        let skip = all.len().saturating_sub(route.tokens.len());
        Self {
            route,
            segments: all[skip..].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn route(&self) -> &'c CompiledRoute {
        self.route
    }

    /// Inbound segments aligned with [`CompiledRoute::tokens`].
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The raw inbound value of path parameter `name`.
    ///
    /// `None` when the template has no `{name}` token, or the token's
    /// position lies outside the inbound path.
    pub fn path_value(&self, name: &str) -> Option<&str> {
        let index = self.route.placeholder_index(name)?;
        self.segments.get(index).map(String::as_str)
    }
}

impl Deref for RouteMatch<'_> {
    type Target = CompiledRoute;

    fn deref(&self) -> &CompiledRoute {
        self.route
    }
}

/// The compiled form of a contract document.
#[derive(Debug)]
pub struct Compiled {
    routes: Vec<CompiledRoute>,
    index: RegexSet,
}

impl Compiled {
    /// Select the route for an inbound path.
    ///
    /// Returns `None` when no template matches, or when more than one does.
    pub fn matches(&self, path: &str) -> Option<RouteMatch<'_>> {
        let hits = self.index.matches(path);
        let mut candidates = hits.iter();
        let first = candidates.next();
        let ambiguous = candidates.next().is_some();
        tracing::trace!(path, candidates = hits.iter().count(), "matched path");
        match first {
            Some(i) if !ambiguous => Some(RouteMatch::new(&self.routes[i], path)),
            _ => None,
        }
    }

    /// All compiled routes, ordered by template.
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    /// Look up a route by its template.
    pub fn route(&self, name: &str) -> Option<&CompiledRoute> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Compile a fully-dereferenced contract document.
///
/// # Errors
///
/// Returns [`CompileError::InvalidSchema`] if any parameter or response
/// schema is rejected by the schema compiler, and
/// [`CompileError::InvalidPattern`] if a route pattern cannot be built.
pub fn compile(document: &Document) -> Result<Compiled, CompileError> {
    let base_path = document.base_path();
    let routes = document
        .paths
        .iter()
        .map(|(name, item)| CompiledRoute::compile(base_path, name, item))
        .collect::<Result<Vec<_>, _>>()?;

    let index = RegexSet::new(routes.iter().map(|r| r.pattern.as_str())).map_err(|e| {
        CompileError::InvalidPattern {
            route: base_path.to_string(),
            reason: e.to_string(),
        }
    })?;

    tracing::info!(routes = routes.len(), base_path, "compiled contract document");
    Ok(Compiled { routes, index })
}

/// Build the end-anchored pattern for a template under `base_path`.
///
/// Literal text is escaped; each `{...}` placeholder becomes a
/// one-segment matcher. A trailing `/` on the base path is dropped, so the
/// root base path `/` adds nothing.
fn route_pattern(base_path: &str, template: &str) -> String {
    let mut pattern = regex::escape(base_path.trim_end_matches('/'));
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..open]));
        pattern.push_str(SEGMENT_PATTERN);
        rest = &rest[open + close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    pattern
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// The `expected` member reported for a failing value: whichever of
/// `schema`, `type` and `format` are declared, or `None` if none are.
fn expectation(
    schema: Option<&Value>,
    data_type: Option<DataType>,
    format: Option<&str>,
) -> Option<Value> {
    let mut expected = Map::new();
    if let Some(schema) = schema {
        expected.insert("schema".into(), schema.clone());
    }
    if let Some(data_type) = data_type {
        expected.insert("type".into(), Value::String(data_type.as_str().into()));
    }
    if let Some(format) = format {
        expected.insert("format".into(), Value::String(format.into()));
    }
    (!expected.is_empty()).then_some(Value::Object(expected))
}
