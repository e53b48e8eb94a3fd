//! # Request and Response Subcommands
//!
//! Builds request parts from command-line flags and reports the
//! conformance outcome as JSON.

use apiguard_core::{ValidationError, ValueMap};
use apiguard_validate::{validate_request, validate_response, Compiled, RequestInput};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Malformed command-line input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgError {
    /// A `--query` or `--header` value without `=`.
    #[error("expected KEY=VALUE, got '{0}'")]
    Pair(String),
}

/// Arguments for the request subcommand.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Inbound request path, including the base path.
    pub path: String,

    /// HTTP method (case-insensitive).
    pub method: String,

    /// Query parameter as KEY=VALUE. Repeat a key to send several values.
    #[arg(long = "query", short = 'q', value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Header as NAME=VALUE.
    #[arg(long = "header", short = 'H', value_name = "NAME=VALUE")]
    pub headers: Vec<String>,

    /// Request body as JSON. Text that is not JSON is sent as a string.
    #[arg(long)]
    pub body: Option<String>,
}

/// Arguments for the response subcommand.
#[derive(Args, Debug)]
pub struct ResponseArgs {
    /// Inbound request path, including the base path.
    pub path: String,

    /// HTTP method (case-insensitive).
    pub method: String,

    /// Response status code.
    pub status: u16,

    /// Response body as JSON. Text that is not JSON is sent as a string.
    #[arg(long)]
    pub body: Option<String>,
}

/// Outcome of checking one request.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestReport {
    RouteNotFound,
    MethodNotAllowed,
    Checked { errors: Vec<ValidationError> },
}

impl RequestReport {
    pub fn conforms(&self) -> bool {
        matches!(self, RequestReport::Checked { errors } if errors.is_empty())
    }
}

/// Outcome of checking one response.
#[derive(Debug, Serialize, PartialEq)]
pub struct ResponseReport {
    pub error: Option<ValidationError>,
}

impl ResponseReport {
    pub fn conforms(&self) -> bool {
        self.error.is_none()
    }
}

/// Collect KEY=VALUE pairs into a map. Repeated keys become sequences.
pub fn parse_pairs(pairs: &[String]) -> Result<ValueMap, ArgError> {
    let mut map = ValueMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ArgError::Pair(pair.clone()))?;
        let value = Value::String(value.to_string());
        match map.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.to_string(), value);
            }
        }
    }
    Ok(map)
}

/// Interpret a `--body` flag: JSON when it parses, a string otherwise.
pub fn parse_body(raw: Option<&str>) -> Option<Value> {
    raw.map(|text| serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

/// Check a request described by `args`.
pub fn check_request(compiled: &Compiled, args: &RequestArgs) -> anyhow::Result<RequestReport> {
    let query = parse_pairs(&args.query)?;
    let headers = parse_pairs(&args.headers)?;
    let body = parse_body(args.body.as_deref());

    let route = compiled.matches(&args.path);
    let Some(matched) = route.as_ref() else {
        return Ok(RequestReport::RouteNotFound);
    };

    let mut input = RequestInput::new().query(&query).headers(&headers);
    if let Some(body) = &body {
        input = input.body(body);
    }

    Ok(match validate_request(Some(matched), &args.method, input)? {
        Some(errors) => RequestReport::Checked { errors },
        None => RequestReport::MethodNotAllowed,
    })
}

/// Check a response described by `args`.
pub fn check_response(compiled: &Compiled, args: &ResponseArgs) -> ResponseReport {
    let body = parse_body(args.body.as_deref());
    let route = compiled.matches(&args.path);
    ResponseReport {
        error: validate_response(route.as_ref(), &args.method, args.status, body.as_ref()),
    }
}
