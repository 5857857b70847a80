//! Contour Checks
//!
//! Glue around the definition language: a cache of compiled definitions,
//! checks of named values with readable mismatch messages, and a guard
//! for single values.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod check;
pub mod describe;

pub use cache::{CacheConfig, CacheStats, Compiled, DefinitionCache};
pub use check::{CheckConfig, CheckError, Checker, RETURN_VALUE, matches_definition};
pub use describe::describe;
