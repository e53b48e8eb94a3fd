//! # apiguard-core — Contract Model for apiguard
//!
//! Defines the data types shared by every apiguard crate: the contract
//! document as the validator consumes it, and the structured error values
//! the validator produces.
//!
//! ## Contract Document
//!
//! The [`document`] module models the subset of Swagger 2.0 needed for
//! request/response conformance checking: the base path, path templates,
//! per-method operations, parameters (query, path, body, header) and
//! responses keyed by status code or `"default"`.
//!
//! Documents arrive fully dereferenced. Loading a document from storage,
//! inlining `$ref` pointers and meta-schema validation belong to the
//! caller; this crate only describes the shape.
//!
//! ## Instance Values
//!
//! Request and response payloads are [`serde_json::Value`], the closed sum
//! type over null, boolean, number, string, sequence and mapping. Schema
//! descriptions are kept in their own types and never share that
//! representation with instance data except for the free-form JSON Schema
//! of body parameters and responses.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `apiguard-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod conformance;
pub mod document;
pub mod error;

pub use conformance::{ValidationError, UNDEFINED_METHOD, UNDEFINED_PATH};
pub use document::{
    CollectionFormat, DataType, Document, Info, Location, Method, Operation, Parameter, PathItem,
    Response, SimpleSchema, DEFAULT_RESPONSE,
};
pub use error::{CompileError, DocumentError, RouteFault, UnknownMethod};

/// A string-keyed map of instance values, as supplied for query strings
/// and headers.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;
