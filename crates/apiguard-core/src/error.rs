//! # Error Types
//!
//! Faults raised while building or using compiled contracts. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Conformance failures are never errors: they are [`ValidationError`]
//!   values returned as data.
//! - Routing outcomes (no route, no operation for the method) are `None`.
//! - What remains here is a malformed document at compile time, or a
//!   compiled route whose shape contradicts the request being validated.
//!
//! [`ValidationError`]: crate::conformance::ValidationError

use thiserror::Error;

/// The document value does not have the shape of a contract document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Deserializing the document tree failed.
    #[error("document shape error: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Compilation of a contract document failed.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A declared schema was rejected by the JSON-Schema engine.
    #[error("invalid schema for {field} of {method} {route}: {reason}")]
    InvalidSchema {
        /// Path template the schema belongs to.
        route: String,
        /// Method of the owning operation.
        method: String,
        /// `parameter '<name>' in <location>` or `response <status>`.
        field: String,
        /// Message from the schema compiler.
        reason: String,
    },

    /// The matching pattern for a path template could not be built.
    #[error("invalid route pattern for '{route}': {reason}")]
    InvalidPattern {
        /// Path template.
        route: String,
        /// Message from the regex compiler.
        reason: String,
    },
}

/// A compiled route disagrees with the request being validated against it.
///
/// Signals a contract violation between the compiler and the validator, not
/// a problem with caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteFault {
    /// A declared path parameter has no `{name}` placeholder at a position
    /// present in the inbound path.
    #[error("cannot obtain path parameter '{parameter}' from route '{route}'")]
    MissingPathPlaceholder {
        /// Path template of the compiled route.
        route: String,
        /// Name of the path parameter.
        parameter: String,
    },
}

/// A method string that names no known HTTP method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown HTTP method '{0}'")]
pub struct UnknownMethod(pub String);
