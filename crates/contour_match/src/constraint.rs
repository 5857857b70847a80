//! Constraint evaluation against a single value.

use crate::host::Introspector;
use contour_core::{Constraint, ConstraintSet, Literal};
use std::cmp::Ordering;

/// Whether `value` satisfies one constraint
#[must_use]
pub fn satisfies<V>(constraint: &Constraint, value: &V, introspector: &dyn Introspector<V>) -> bool {
    match constraint {
        Constraint::Format(pattern) => introspector
            .as_text(value)
            .is_some_and(|text| pattern.is_match(text)),
        Constraint::Len(bound) => introspector
            .size(value)
            .is_some_and(|size| size_cmp(size, *bound) == Ordering::Equal),
        Constraint::Min(bound) => magnitude_cmp(value, *bound, introspector)
            .is_some_and(|ord| ord != Ordering::Less),
        Constraint::Max(bound) => magnitude_cmp(value, *bound, introspector)
            .is_some_and(|ord| ord != Ordering::Greater),
        Constraint::Val(Literal::Text(text)) => introspector.render(value) == *text,
        Constraint::Val(Literal::Token(token)) => match introspector.symbol_name(value) {
            Some(name) => token.strip_prefix(':') == Some(name),
            None => introspector.render(value) == *token,
        },
        Constraint::Capability(method) => introspector.responds_to(value, method),
    }
}

/// Whether `value` satisfies every constraint in the set
#[must_use]
pub fn satisfies_all<V>(
    constraints: &ConstraintSet,
    value: &V,
    introspector: &dyn Introspector<V>,
) -> bool {
    constraints
        .iter()
        .all(|constraint| satisfies(constraint, value, introspector))
}

/// Numbers compare by value; anything else by size
fn magnitude_cmp<V>(value: &V, bound: i64, introspector: &dyn Introspector<V>) -> Option<Ordering> {
    match introspector.number(value) {
        Some(number) => number.cmp_bound(bound),
        None => introspector
            .size(value)
            .map(|size| size_cmp(size, bound)),
    }
}

fn size_cmp(size: usize, bound: i64) -> Ordering {
    (size as i128).cmp(&i128::from(bound))
}
