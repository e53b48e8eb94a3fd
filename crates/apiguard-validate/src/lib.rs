//! # apiguard-validate — Contract Compilation & Conformance Checking
//!
//! Compiles a contract document into matchable routes with precompiled
//! field validators, then checks live requests and responses against them.
//!
//! ## Pipeline
//!
//! 1. [`compile`] turns a fully-dereferenced [`Document`] into a
//!    [`Compiled`] matcher. Every parameter and response gets its
//!    [`FieldCheck`] exactly once, here.
//! 2. [`Compiled::matches`] maps an inbound path to exactly one
//!    [`RouteMatch`], or to nothing when zero or several templates match.
//! 3. [`validate_request`] and [`validate_response`] check request parts
//!    and response bodies against the matched route.
//!
//! ```no_run
//! use apiguard_core::Document;
//! use apiguard_validate::{compile, validate_request, validate_response, RequestInput};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::try_from(json!({
//!     "basePath": "/v1",
//!     "paths": {"/pets": {"get": {
//!         "parameters": [{"name": "limit", "in": "query", "type": "integer"}],
//!         "responses": {"200": {"description": "ok", "schema": {"type": "array"}}}
//!     }}}
//! }))?;
//! let compiled = compile(&document)?;
//!
//! let route = compiled.matches("/v1/pets");
//! let query = json!({"limit": "5"});
//! let errors = validate_request(
//!     route.as_ref(),
//!     "GET",
//!     RequestInput::new().query(query.as_object().unwrap()),
//! )?;
//! assert_eq!(errors, Some(vec![]));
//! assert!(validate_response(route.as_ref(), "GET", 200, Some(&json!([]))).is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Coercion
//!
//! Query and header values are transport strings. The [`coerce`] module
//! converts them to their declared type (`"5"` to `5`, `"true"` to `true`,
//! `"1,2,3"` to `[1, 2, 3]`) before structural validation.
//!
//! ## Concurrency
//!
//! Compilation and validation are synchronous and perform no I/O.
//! [`Compiled`] is immutable and `Send + Sync`; any number of threads may
//! validate against it concurrently.
//!
//! [`Document`]: apiguard_core::Document

pub mod check;
pub mod coerce;
pub mod compile;
pub mod request;
pub mod response;

pub use check::{is_empty_body, CompiledSchema, FieldCheck};
pub use compile::{
    compile, Compiled, CompiledOperation, CompiledParameter, CompiledResponse, CompiledRoute,
    RouteMatch,
};
pub use request::{validate_request, RequestInput};
pub use response::validate_response;
