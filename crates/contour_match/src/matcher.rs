//! Matching type expressions against values.

use crate::constraint::satisfies_all;
use crate::host::{Introspector, Item, TypeRegistry};
use contour_core::{BOOLEAN, ChildSlots, MatchError, MatchResult, TypeElement, TypeExpression};

/// Matches compiled definitions against host values
///
/// Holds only borrowed collaborators, so it is cheap to build per call.
pub struct Matcher<'h, V> {
    registry: &'h dyn TypeRegistry<V>,
    introspector: &'h dyn Introspector<V>,
}

impl<'h, V> Matcher<'h, V> {
    /// Create a matcher over a registry and an introspector
    #[must_use]
    pub fn new(registry: &'h dyn TypeRegistry<V>, introspector: &'h dyn Introspector<V>) -> Self {
        Self {
            registry,
            introspector,
        }
    }

    /// Whether any alternative of `expr` matches `value`
    ///
    /// Alternatives are tried in order and the first match wins, so a
    /// name the registry cannot resolve only fails the call if it is
    /// reached.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownType`] if a reached element names a
    /// type the registry does not know
    pub fn matches(&self, expr: &TypeExpression, value: &V) -> MatchResult<bool> {
        for element in expr {
            if self.matches_element(element, value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether a single element matches `value`
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnknownType`] if the element or a nested one
    /// names an unknown type
    pub fn matches_element(&self, element: &TypeElement, value: &V) -> MatchResult<bool> {
        if element.is_optional() && self.introspector.is_absent(value) {
            return Ok(true);
        }
        if !self.matches_class(element.name(), value)? {
            return Ok(false);
        }
        if let Some(constraints) = element.constraints() {
            if !satisfies_all(constraints, value, self.introspector) {
                return Ok(false);
            }
        }
        match element.children() {
            Some(children) => self.matches_children(children, value),
            None => Ok(true),
        }
    }

    fn matches_class(&self, name: &str, value: &V) -> MatchResult<bool> {
        if name == BOOLEAN {
            return Ok(self.registry.is_boolean(value));
        }
        let predicate = self
            .registry
            .resolve(name)
            .ok_or_else(|| MatchError::UnknownType {
                name: name.to_string(),
            })?;
        Ok(predicate.test(value))
    }

    /// Every item must fit the slots; an empty or non-collection value
    /// never does
    fn matches_children(&self, children: &ChildSlots, value: &V) -> MatchResult<bool> {
        let items = match self.introspector.items(value) {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(false),
        };

        for item in items {
            let fits = match item {
                Item::Single(single) => self.matches(children.first(), single)?,
                Item::Parts(parts) => self.matches_parts(children, &parts)?,
            };
            if !fits {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn matches_parts(&self, children: &ChildSlots, parts: &[&V]) -> MatchResult<bool> {
        if parts.len() != children.len() {
            return Ok(false);
        }
        for (slot, part) in children.iter().zip(parts) {
            if !self.matches(slot, part)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Match `expr` against `value` with the given collaborators
///
/// # Errors
///
/// Returns [`MatchError::UnknownType`] if a reached element names a type
/// the registry does not know
pub fn matches<V>(
    expr: &TypeExpression,
    value: &V,
    registry: &dyn TypeRegistry<V>,
    introspector: &dyn Introspector<V>,
) -> MatchResult<bool> {
    Matcher::new(registry, introspector).matches(expr, value)
}
