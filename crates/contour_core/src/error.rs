//! Core error types for Contour.

use std::fmt;

/// Result of turning a definition string into a type expression
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result of matching a value against a type expression
pub type MatchResult<T> = Result<T, MatchError>;

/// Why a definition string was rejected by the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxReason {
    /// The definition was empty
    Empty,

    /// A character appeared where the grammar forbids it
    UnexpectedChar(char),

    /// A quoted string or regex literal was never closed
    UnterminatedLiteral(char),

    /// A regex literal had no body
    EmptyPattern,

    /// A bracket was opened but never closed (holds the missing closer)
    MissingClosing(char),

    /// The definition stopped on a character that cannot end it
    IllegalEnd,
}

impl fmt::Display for SyntaxReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "the definition is empty"),
            Self::UnexpectedChar(c) => write!(f, "unexpected '{}'", c),
            Self::UnterminatedLiteral(c) => write!(f, "literal is missing a closing '{}'", c),
            Self::EmptyPattern => write!(f, "regular expression has no body"),
            Self::MissingClosing(c) => write!(f, "missing a '{}'", c),
            Self::IllegalEnd => write!(f, "ends with an illegal character"),
        }
    }
}

/// Malformed definition string
///
/// `position` is the character index of the offending character and
/// `excerpt` is the definition up to and including it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error at position {position}: {reason} (here: {excerpt})")]
pub struct SyntaxError {
    /// What went wrong
    pub reason: SyntaxReason,
    /// Character index of the failure
    pub position: usize,
    /// Definition text up to the failure
    pub excerpt: String,
}

impl SyntaxError {
    /// Build an error pointing at `position` within `chars`
    #[must_use]
    pub fn at(reason: SyntaxReason, chars: &[char], position: usize) -> Self {
        let end = (position + 1).min(chars.len());
        Self {
            reason,
            position,
            excerpt: chars[..end].iter().collect(),
        }
    }

    /// Build an error for a failure detected at the end of input
    #[must_use]
    pub fn at_end(reason: SyntaxReason, chars: &[char]) -> Self {
        Self::at(reason, chars, chars.len().saturating_sub(1))
    }
}

/// Error raised while building a type expression from a definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// The definition failed grammar validation
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Two constraints of the same kind on one element
    #[error("Duplicate constraint: {constraint}")]
    DuplicateConstraint {
        /// Repeated constraint kind
        constraint: String,
    },

    /// Constraint identifier is not one of format, len, min, max, val
    #[error("Unknown constraint: {name}")]
    UnknownConstraint {
        /// Identifier as written
        name: String,
    },

    /// Constraint value does not have the shape its kind requires
    #[error("Invalid value for constraint {name}: {value} ({reason})")]
    InvalidConstraint {
        /// Constraint identifier
        name: String,
        /// Raw value text
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// Parser state was inconsistent with validated input
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

/// Error raised while matching a value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The registry cannot resolve a type name
    #[error("Unknown type: {name}")]
    UnknownType {
        /// Type name as written
        name: String,
    },

    /// The definition could not be compiled
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
