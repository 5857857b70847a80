//! Contour Core Types
//!
//! The compiled form of a type definition and the errors shared by every
//! layer. This crate does no parsing and no matching.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constraint;
pub mod element;
pub mod error;
pub mod expr;

// Re-exports
pub use constraint::{Constraint, ConstraintKind, ConstraintSet, Literal, Pattern};
pub use element::{ANY_OBJECT, BOOLEAN, ChildSlots, TypeElement};
pub use error::{
    DefinitionError, DefinitionResult, MatchError, MatchResult, SyntaxError, SyntaxReason,
};
pub use expr::TypeExpression;
