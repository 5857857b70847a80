//! Contour Matcher
//!
//! Evaluates compiled type expressions against host values. Type names
//! resolve through a [`TypeRegistry`] and structure is read through an
//! [`Introspector`], so the matcher works for any value model. The
//! [`standard`] module provides a reference model used by the CLI and
//! the tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constraint;
pub mod host;
pub mod matcher;
pub mod standard;

pub use constraint::{satisfies, satisfies_all};
pub use host::{Introspector, Item, Numeric, Predicate, TypeRegistry};
pub use matcher::{Matcher, matches};
pub use standard::{StandardIntrospector, StandardRegistry, Value};
