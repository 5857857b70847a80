//! Reference host: a small dynamically typed value model with its registry
//! and introspector.
//!
//! The model mirrors the value kinds of a dynamic scripting runtime: nil,
//! booleans, integers, floats, strings, symbols, arrays, insertion-ordered
//! hashes and opaque objects that declare the methods they respond to.

use crate::host::{Introspector, Item, Numeric, Predicate, TypeRegistry};
use contour_core::ANY_OBJECT;
use indexmap::IndexMap;
use std::fmt::Write as _;

/// Methods every value responds to
const COMMON_METHODS: &[&str] = &["to_s", "inspect", "class", "nil?", "respond_to?", "==", "hash"];

const NIL_METHODS: &[&str] = &["to_a", "to_h", "to_i", "to_f", "to_r", "&", "|"];
const BOOL_METHODS: &[&str] = &["&", "|", "^", "!"];
const INTEGER_METHODS: &[&str] = &[
    "to_i", "to_f", "to_r", "to_int", "+", "-", "*", "/", "%", "<=>", "abs", "succ", "pred", "times",
    "even?", "odd?", "zero?",
];
const FLOAT_METHODS: &[&str] = &[
    "to_i", "to_f", "to_r", "+", "-", "*", "/", "%", "<=>", "abs", "round", "floor", "ceil", "nan?",
    "zero?",
];
const STRING_METHODS: &[&str] = &[
    "to_str", "to_i", "to_f", "to_r", "to_sym", "size", "length", "+", "*", "<=>", "upcase",
    "downcase", "chars", "each_char", "empty?", "include?", "start_with?", "end_with?",
];
const SYMBOL_METHODS: &[&str] = &["to_sym", "to_proc", "size", "length", "<=>", "upcase", "downcase", "empty?"];
const ARRAY_METHODS: &[&str] = &[
    "to_a", "to_ary", "to_h", "size", "length", "count", "each", "map", "select", "first", "last",
    "empty?", "include?", "push", "<<", "[]",
];
const HASH_METHODS: &[&str] = &[
    "to_a", "to_h", "to_hash", "size", "length", "count", "each", "map", "select", "keys", "values",
    "fetch", "empty?", "key?", "[]",
];

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Nil,
    /// `true` or `false`
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating-point number
    Float(f64),
    /// String
    Str(String),
    /// Symbol, stored without its `:` sigil
    Symbol(String),
    /// Ordered list
    Array(Vec<Value>),
    /// Insertion-ordered key/value pairs
    Hash(Vec<(Value, Value)>),
    /// Opaque object of a named class
    Object {
        /// Class name
        class: String,
        /// Methods the object declares beyond the common ones
        methods: Vec<String>,
    },
}

impl Value {
    /// Symbol with the given name
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }

    /// Object of `class` declaring `methods`
    #[must_use]
    pub fn object(class: &str, methods: &[&str]) -> Self {
        Self::Object {
            class: class.to_string(),
            methods: methods.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Convert a JSON document
    ///
    /// Strings written `":name"` become symbols; JSON objects become
    /// hashes keyed by strings.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => match s.strip_prefix(':') {
                Some(name) if !name.is_empty() => Self::Symbol(name.to_string()),
                _ => Self::Str(s),
            },
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Hash(
                map.into_iter()
                    .map(|(k, v)| (Self::Str(k), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Name of the value's class
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Self::Nil => "NilClass",
            Self::Bool(true) => "TrueClass",
            Self::Bool(false) => "FalseClass",
            Self::Int(_) => "Integer",
            Self::Float(_) => "Float",
            Self::Str(_) => "String",
            Self::Symbol(_) => "Symbol",
            Self::Array(_) => "Array",
            Self::Hash(_) => "Hash",
            Self::Object { class, .. } => class,
        }
    }

    /// Plain rendering, as `to_s` would give
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Nil => String::new(),
            Self::Str(s) => s.clone(),
            Self::Symbol(name) => name.clone(),
            _ => self.inspect(),
        }
    }

    /// Debug rendering, as `inspect` would give
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::Nil => "nil".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Str(s) => format!("{:?}", s),
            Self::Symbol(name) => format!(":{}", name),
            Self::Array(items) => {
                let inner: Vec<String> = items.iter().map(Self::inspect).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Hash(pairs) => {
                let mut out = String::from("{");
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{} => {}", k.inspect(), v.inspect());
                }
                out.push('}');
                out
            }
            Self::Object { class, .. } => format!("#<{}>", class),
        }
    }

    /// Whether the value responds to `method`
    #[must_use]
    pub fn responds_to(&self, method: &str) -> bool {
        if COMMON_METHODS.contains(&method) {
            return true;
        }
        let table = match self {
            Self::Nil => NIL_METHODS,
            Self::Bool(_) => BOOL_METHODS,
            Self::Int(_) => INTEGER_METHODS,
            Self::Float(_) => FLOAT_METHODS,
            Self::Str(_) => STRING_METHODS,
            Self::Symbol(_) => SYMBOL_METHODS,
            Self::Array(_) => ARRAY_METHODS,
            Self::Hash(_) => HASH_METHODS,
            Self::Object { methods, .. } => return methods.iter().any(|m| m == method),
        };
        table.contains(&method)
    }
}

/// Floats always show a fractional part
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Registry of class names for [`Value`]
///
/// Starts with the built-in classes; more can be registered, and the
/// registration order is kept.
pub struct StandardRegistry {
    types: IndexMap<String, Box<dyn Predicate<Value>>>,
}

impl StandardRegistry {
    /// Registry with the built-in classes
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            types: IndexMap::new(),
        };
        registry.register(ANY_OBJECT, |_: &Value| true);
        registry.register("NilClass", |v: &Value| matches!(v, Value::Nil));
        registry.register("TrueClass", |v: &Value| matches!(v, Value::Bool(true)));
        registry.register("FalseClass", |v: &Value| matches!(v, Value::Bool(false)));
        registry.register("Integer", |v: &Value| matches!(v, Value::Int(_)));
        registry.register("Float", |v: &Value| matches!(v, Value::Float(_)));
        registry.register("Numeric", |v: &Value| {
            matches!(v, Value::Int(_) | Value::Float(_))
        });
        registry.register("String", |v: &Value| matches!(v, Value::Str(_)));
        registry.register("Symbol", |v: &Value| matches!(v, Value::Symbol(_)));
        registry.register("Array", |v: &Value| matches!(v, Value::Array(_)));
        registry.register("Hash", |v: &Value| matches!(v, Value::Hash(_)));
        registry.register("Enumerable", |v: &Value| {
            matches!(v, Value::Array(_) | Value::Hash(_))
        });
        registry
    }

    /// Register a type name, replacing any earlier predicate for it
    pub fn register<P>(&mut self, name: impl Into<String>, predicate: P)
    where
        P: Predicate<Value> + 'static,
    {
        self.types.insert(name.into(), Box::new(predicate));
    }

    /// Register a class whose instances are objects of that class name
    pub fn register_class(&mut self, class: &str) {
        let owned = class.to_string();
        self.register(class, move |v: &Value| {
            matches!(v, Value::Object { class, .. } if *class == owned)
        });
    }

    /// Whether a name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for StandardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry<Value> for StandardRegistry {
    fn resolve(&self, name: &str) -> Option<&dyn Predicate<Value>> {
        self.types.get(name).map(|predicate| &**predicate)
    }

    fn is_boolean(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }
}

/// Introspector for [`Value`]
///
/// Arrays emit single items; hashes emit `[key, value]` pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardIntrospector;

impl Introspector<Value> for StandardIntrospector {
    fn is_absent(&self, value: &Value) -> bool {
        matches!(value, Value::Nil)
    }

    fn items<'a>(&self, value: &'a Value) -> Option<Vec<Item<'a, Value>>> {
        match value {
            Value::Array(items) => Some(items.iter().map(Item::Single).collect()),
            Value::Hash(pairs) => Some(pairs.iter().map(|(k, v)| Item::Parts(vec![k, v])).collect()),
            _ => None,
        }
    }

    fn size(&self, value: &Value) -> Option<usize> {
        match value {
            Value::Str(s) | Value::Symbol(s) => Some(s.chars().count()),
            Value::Array(items) => Some(items.len()),
            Value::Hash(pairs) => Some(pairs.len()),
            _ => None,
        }
    }

    fn number(&self, value: &Value) -> Option<Numeric> {
        match value {
            Value::Int(i) => Some(Numeric::Int(*i)),
            Value::Float(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    fn as_text<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn render(&self, value: &Value) -> String {
        value.to_text()
    }

    fn symbol_name<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }

    fn responds_to(&self, value: &Value, method: &str) -> bool {
        value.responds_to(method)
    }

    fn type_name(&self, value: &Value) -> String {
        value.class_name().to_string()
    }
}
