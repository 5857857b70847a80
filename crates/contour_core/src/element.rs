//! Type elements: one alternative of a sum type.

use crate::constraint::ConstraintSet;
use crate::error::{DefinitionError, DefinitionResult};
use crate::expr::TypeExpression;
use serde::Serialize;
use std::fmt;

/// Name standing for "any object"; given to bare duck types and literals
pub const ANY_OBJECT: &str = "Object";

/// Pseudo-type matching either boolean literal without a registry lookup
pub const BOOLEAN: &str = "Boolean";

/// Positional child type expressions of a collection
///
/// Slot `k` constrains part `k` of every item the collection emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChildSlots {
    slots: Vec<TypeExpression>,
}

impl ChildSlots {
    /// Create slots for a collection
    ///
    /// # Errors
    ///
    /// Returns error if no slot is given
    pub fn new(slots: Vec<TypeExpression>) -> DefinitionResult<Self> {
        if slots.is_empty() {
            return Err(DefinitionError::Internal {
                message: "collection has no child slots".to_string(),
            });
        }
        Ok(Self { slots })
    }

    /// Slot at a position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TypeExpression> {
        self.slots.get(index)
    }

    /// First slot (the only one for plain collections)
    #[must_use]
    pub fn first(&self) -> &TypeExpression {
        &self.slots[0]
    }

    /// Iterate slots in position order
    pub fn iter(&self) -> impl Iterator<Item = &TypeExpression> {
        self.slots.iter()
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; slots are non-empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Display for ChildSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", slot)?;
        }
        write!(f, ">")
    }
}

/// One alternative in a type expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeElement {
    name: String,
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<ChildSlots>,
    #[serde(skip_serializing_if = "Option::is_none")]
    constraints: Option<ConstraintSet>,
}

impl TypeElement {
    /// Create an element from a name as written
    ///
    /// A trailing `?` marks the element optional and is stripped from the
    /// name; a blank name becomes [`ANY_OBJECT`].
    #[must_use]
    pub fn named(written: &str) -> Self {
        let written = written.trim();
        let (name, optional) = match written.strip_suffix('?') {
            Some(stripped) => (stripped.trim_end(), true),
            None => (written, false),
        };
        let name = if name.is_empty() { ANY_OBJECT } else { name };

        Self {
            name: name.to_string(),
            optional,
            children: None,
            constraints: None,
        }
    }

    /// Implied "any object" element
    #[must_use]
    pub fn any_object() -> Self {
        Self::named(ANY_OBJECT)
    }

    /// Attach child slots
    #[must_use]
    pub fn with_children(mut self, children: ChildSlots) -> Self {
        self.children = Some(children);
        self
    }

    /// Attach constraints
    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Name used for registry lookup (without `?`)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the element also matches an absent value
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Child slots, for collections
    #[must_use]
    pub fn children(&self) -> Option<&ChildSlots> {
        self.children.as_ref()
    }

    /// Constraints, when given
    #[must_use]
    pub fn constraints(&self) -> Option<&ConstraintSet> {
        self.constraints.as_ref()
    }
}

impl fmt::Display for TypeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        if let Some(children) = &self.children {
            write!(f, "{}", children)?;
        }
        if let Some(constraints) = &self.constraints {
            write!(f, "{}", constraints)?;
        }
        Ok(())
    }
}
