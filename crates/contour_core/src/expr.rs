//! Type expressions: ordered sums of type elements.

use crate::element::TypeElement;
use crate::error::{DefinitionError, DefinitionResult};
use serde::Serialize;
use std::fmt;

/// A compiled definition: matches a value if any alternative does
///
/// Immutable once built, so one expression can be shared between threads
/// and reused for any number of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeExpression {
    elements: Vec<TypeElement>,
}

impl TypeExpression {
    /// Create an expression from its alternatives
    ///
    /// # Errors
    ///
    /// Returns error if there are no alternatives
    pub fn new(elements: Vec<TypeElement>) -> DefinitionResult<Self> {
        if elements.is_empty() {
            return Err(DefinitionError::Internal {
                message: "type expression has no alternatives".to_string(),
            });
        }
        Ok(Self { elements })
    }

    /// Alternatives in definition order
    #[must_use]
    pub fn elements(&self) -> &[TypeElement] {
        &self.elements
    }

    /// Iterate alternatives
    pub fn iter(&self) -> impl Iterator<Item = &TypeElement> {
        self.elements.iter()
    }

    /// Number of alternatives
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false; expressions are non-empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<'a> IntoIterator for &'a TypeExpression {
    type Item = &'a TypeElement;
    type IntoIter = std::slice::Iter<'a, TypeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Constraint, ConstraintSet};
    use crate::element::ChildSlots;

    fn single(name: &str) -> TypeExpression {
        TypeExpression::new(vec![TypeElement::named(name)]).unwrap()
    }

    #[test]
    fn test_rejects_empty() {
        assert!(TypeExpression::new(Vec::new()).is_err());
    }

    #[test]
    fn test_display_sum() {
        let expr = TypeExpression::new(vec![
            TypeElement::named("String"),
            TypeElement::named("Float?"),
        ])
        .unwrap();
        assert_eq!(expr.to_string(), "String|Float?");
        assert_eq!(expr.len(), 2);
    }

    #[test]
    fn test_display_nested() {
        let hash = TypeElement::named("Hash")
            .with_children(ChildSlots::new(vec![single("Symbol"), single("Integer")]).unwrap());
        let inner = TypeExpression::new(vec![TypeElement::named("String"), hash]).unwrap();
        let expr = TypeExpression::new(vec![
            TypeElement::named("Boolean"),
            TypeElement::named("Array").with_children(ChildSlots::new(vec![inner]).unwrap()),
        ])
        .unwrap();
        assert_eq!(expr.to_string(), "Boolean|Array<String|Hash<Symbol,Integer>>");
    }

    #[test]
    fn test_iteration_order() {
        let expr = TypeExpression::new(vec![
            TypeElement::named("B"),
            TypeElement::named("A"),
        ])
        .unwrap();
        let names: Vec<_> = expr.iter().map(TypeElement::name).collect();
        assert_eq!(names, vec!["B", "A"]);
        let names: Vec<_> = (&expr).into_iter().map(TypeElement::name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_serialize_tree() {
        let el = TypeElement::named("Integer?")
            .with_constraints(ConstraintSet::new(vec![Constraint::Min(1)]).unwrap());
        let expr = TypeExpression::new(vec![el]).unwrap();
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "Integer",
                "optional": true,
                "constraints": [{"kind": "min", "value": 1}]
            }])
        );
    }
}
