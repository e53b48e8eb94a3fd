//! # Conformance Errors
//!
//! The structured value reported when a request or response does not match
//! its contract. Serializes to
//! `{ where?, name?, actual?, expected? }`, omitting absent members.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::Location;

/// Sentinel `actual` for a response checked against an unmatched path.
pub const UNDEFINED_PATH: &str = "UNDEFINED_PATH";
/// Sentinel `actual` for a response checked against an undeclared method.
pub const UNDEFINED_METHOD: &str = "UNDEFINED_METHOD";

/// A single mismatch between a value and its declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Where the offending value was read from. Absent for responses.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Parameter name, for query and header values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The value as supplied, before any coercion. `None` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// What the contract declares. `None` when nothing is expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl ValidationError {
    pub fn new(actual: Option<Value>, expected: Option<Value>) -> Self {
        Self {
            location: None,
            name: None,
            actual,
            expected,
        }
    }

    /// Tag the error with the location its value came from.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Tag the error with a parameter name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A query key supplied where the operation declares no parameters.
    pub fn unexpected_query(name: &str, actual: &Value) -> Self {
        Self::new(Some(actual.clone()), Some(json!({})))
            .at(Location::Query)
            .named(name)
    }

    /// Response checked without a matched route.
    pub fn undefined_path() -> Self {
        Self::new(Some(json!(UNDEFINED_PATH)), Some(json!("PATH")))
    }

    /// Response checked for a method the route does not declare.
    pub fn undefined_method() -> Self {
        Self::new(Some(json!(UNDEFINED_METHOD)), Some(json!("METHOD")))
    }

    /// Whether this is the unmatched-route sentinel.
    pub fn is_undefined_path(&self) -> bool {
        self.actual.as_ref().and_then(Value::as_str) == Some(UNDEFINED_PATH)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.location, &self.name) {
            (Some(location), Some(name)) => write!(f, "{location} '{name}': ")?,
            (Some(location), None) => write!(f, "{location}: ")?,
            (None, _) => {}
        }
        match &self.actual {
            Some(actual) => write!(f, "got {actual}")?,
            None => f.write_str("got nothing")?,
        }
        match &self.expected {
            Some(expected) => write!(f, ", expected {expected}"),
            None => f.write_str(", expected nothing"),
        }
    }
}
