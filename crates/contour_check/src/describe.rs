//! Type descriptions of values, for mismatch messages.

use contour_match::{Introspector, Item};
use indexmap::IndexSet;

/// Describe a value's type in definition syntax
///
/// Non-empty collections list the distinct types of their items, in
/// first-seen order: `Array<String|Integer>`, `Hash<Symbol,String>`.
#[must_use]
pub fn describe<V>(value: &V, introspector: &dyn Introspector<V>) -> String {
    let name = introspector.type_name(value);
    let items = match introspector.items(value) {
        Some(items) if !items.is_empty() => items,
        _ => return name,
    };

    let mut slots: Vec<IndexSet<String>> = Vec::new();
    let mut note = |index: usize, part: &V| {
        if slots.len() <= index {
            slots.resize_with(index + 1, IndexSet::new);
        }
        slots[index].insert(describe(part, introspector));
    };
    for item in items {
        match item {
            Item::Single(single) => note(0, single),
            Item::Parts(parts) => {
                for (index, part) in parts.into_iter().enumerate() {
                    note(index, part);
                }
            }
        }
    }

    let inner: Vec<String> = slots
        .iter()
        .map(|types| types.iter().map(String::as_str).collect::<Vec<_>>().join("|"))
        .collect();
    format!("{}<{}>", name, inner.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour_match::{StandardIntrospector, Value};

    fn d(value: &Value) -> String {
        describe(value, &StandardIntrospector)
    }

    #[test]
    fn test_describe_scalars() {
        assert_eq!(d(&Value::from("x")), "String");
        assert_eq!(d(&Value::Nil), "NilClass");
        assert_eq!(d(&Value::Bool(true)), "TrueClass");
        assert_eq!(d(&Value::object("Widget", &[])), "Widget");
    }

    #[test]
    fn test_describe_empty_collections() {
        assert_eq!(d(&Value::Array(Vec::new())), "Array");
        assert_eq!(d(&Value::Hash(Vec::new())), "Hash");
    }

    #[test]
    fn test_describe_array() {
        let value = Value::Array(vec![
            Value::from("a"),
            Value::Int(1),
            Value::from("b"),
            Value::Array(vec![Value::symbol("s")]),
        ]);
        assert_eq!(d(&value), "Array<String|Integer|Array<Symbol>>");
    }

    #[test]
    fn test_describe_hash() {
        let value = Value::Hash(vec![
            (Value::symbol("a"), Value::from("x")),
            (Value::symbol("b"), Value::Int(2)),
        ]);
        assert_eq!(d(&value), "Hash<Symbol,String|Integer>");
    }
}
