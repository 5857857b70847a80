//! Contour Definition Language
//!
//! Validator and parser for type definitions such as
//! `Hash<Symbol, String(min: 1)>|#to_s`. [`validate`] runs the grammar
//! state machine and reports the first offending position; [`parse`]
//! validates and then builds a [`contour_core::TypeExpression`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod literal;
pub mod parser;
mod syntax;
pub mod validate;

pub use literal::{LiteralKind, scan_literal};
pub use parser::parse;
pub use validate::validate;
