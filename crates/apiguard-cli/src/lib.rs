//! # apiguard-cli — Contract Checking From the Command Line
//!
//! Loads a contract document, compiles it with `apiguard-validate`, and
//! checks individual requests and responses against it.
//!
//! ## Subcommands
//!
//! - `routes` — list compiled routes with their patterns and methods
//! - `match` — show which route an inbound path selects
//! - `request` — check query, header and body values for a path and method
//! - `response` — check a response body for a path, method and status
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the checks themselves.
//! - Loading and `$ref` inlining live here; the validator crates never
//!   touch the filesystem.
//! - Results are printed as JSON on stdout.

pub mod check;
pub mod load;
pub mod routes;
