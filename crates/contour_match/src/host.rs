//! Host collaborators: how names resolve to type checks and how a value
//! exposes its structure.
//!
//! The matcher never inspects a value itself. Everything it needs to know
//! about class membership, collection items, sizes and capabilities comes
//! through a [`TypeRegistry`] and an [`Introspector`] supplied by the host.

use std::cmp::Ordering;

/// Tests whether a value is an instance of some type
pub trait Predicate<V>: Send + Sync {
    /// Whether `value` belongs to the type
    fn test(&self, value: &V) -> bool;
}

impl<V, F> Predicate<V> for F
where
    F: Fn(&V) -> bool + Send + Sync,
{
    fn test(&self, value: &V) -> bool {
        self(value)
    }
}

/// Resolves type names written in definitions
pub trait TypeRegistry<V> {
    /// Predicate for a type name, or `None` if the name is unknown
    fn resolve(&self, name: &str) -> Option<&dyn Predicate<V>>;

    /// Whether `value` is one of the two boolean literals
    ///
    /// Backs the reserved `Boolean` pseudo-type, which is never passed to
    /// [`TypeRegistry::resolve`].
    fn is_boolean(&self, value: &V) -> bool;
}

/// One item emitted by a collection
#[derive(Debug, PartialEq)]
pub enum Item<'a, V> {
    /// A plain element, matched against the first slot
    Single(&'a V),
    /// An element with positional parts, matched slot by slot
    Parts(Vec<&'a V>),
}

/// Numeric reading of a value, for `min`/`max` bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Integral number
    Int(i64),
    /// Floating-point number
    Float(f64),
}

impl Numeric {
    /// Compare against an integer bound; `None` for NaN
    #[must_use]
    pub fn cmp_bound(&self, bound: i64) -> Option<Ordering> {
        match *self {
            Self::Int(n) => Some(n.cmp(&bound)),
            Self::Float(f) => f.partial_cmp(&(bound as f64)),
        }
    }
}

/// Structural view of host values
pub trait Introspector<V> {
    /// Whether the value is the host's "no value" marker
    fn is_absent(&self, value: &V) -> bool;

    /// Items the value emits when iterated, or `None` if it is not a
    /// collection
    fn items<'a>(&self, value: &'a V) -> Option<Vec<Item<'a, V>>>;

    /// Size for `len`/`min`/`max`, if the value has one
    fn size(&self, value: &V) -> Option<usize>;

    /// Numeric reading, if the value is a number
    fn number(&self, value: &V) -> Option<Numeric>;

    /// Text, if the value is a string
    fn as_text<'a>(&self, value: &'a V) -> Option<&'a str>;

    /// Plain text rendering of the value
    fn render(&self, value: &V) -> String;

    /// Name of a symbol-like value, without its sigil
    fn symbol_name<'a>(&self, value: &'a V) -> Option<&'a str>;

    /// Whether the value supports the named operation
    fn responds_to(&self, value: &V, method: &str) -> bool;

    /// Name of the value's type, for messages
    fn type_name(&self, value: &V) -> String;
}
