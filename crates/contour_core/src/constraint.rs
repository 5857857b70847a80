//! Constraints that narrow which values of a type are acceptable.

use crate::error::{DefinitionError, DefinitionResult};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Flags a regex literal may carry after its closing slash
pub const PATTERN_FLAGS: &[char] = &['i', 'm', 's', 'x'];

/// A compiled regex literal, remembered as written
#[derive(Debug, Clone)]
pub struct Pattern {
    body: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern from the text between the slashes and its flags
    ///
    /// # Errors
    ///
    /// Returns error if the body is not a valid regular expression
    pub fn new(body: &str, flags: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&unescape_slashes(body))
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .ignore_whitespace(flags.contains('x'))
            .build()?;
        Ok(Self {
            body: body.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Split a `/body/flags` literal into body and flags
    #[must_use]
    pub fn split_literal(literal: &str) -> Option<(&str, &str)> {
        let rest = literal.strip_prefix('/')?;
        let close = rest.rfind('/')?;
        let (body, flags) = (&rest[..close], &rest[close + 1..]);
        if flags.chars().all(|c| PATTERN_FLAGS.contains(&c)) {
            Some((body, flags))
        } else {
            None
        }
    }

    /// Body as written between the slashes
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Trailing flags
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Unanchored search of `text`
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.flags == other.flags
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.body, self.flags)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// `\/` only exists to keep the literal open.
fn unescape_slashes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('/') => out.push('/'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Literal a `val` constraint compares against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", content = "text", rename_all = "snake_case")]
pub enum Literal {
    /// Written in double quotes; compared with the value's text rendering
    Text(String),
    /// Written bare (`:foo`, `5`); compared with sigil-restored rendering
    Token(String),
}

impl Literal {
    /// Read a literal as written after `val:`
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) if raw.len() >= 2 => Self::Text(unescape_quoted(inner)),
            _ => Self::Token(raw.to_string()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => {
                write!(f, "\"")?;
                let mut chars = text.chars().peekable();
                while let Some(c) = chars.next() {
                    // A lone backslash before any other character reads back as itself
                    let escape = match c {
                        '"' => true,
                        '\\' => matches!(chars.peek(), None | Some('"' | '\\')),
                        _ => false,
                    };
                    if escape {
                        write!(f, "\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, "\"")
            }
            Self::Token(token) => write!(f, "{}", token),
        }
    }
}

fn unescape_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('"' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Kind of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    /// Regex match on text
    Format,
    /// Exact size
    Len,
    /// Lower bound on magnitude or size
    Min,
    /// Upper bound on magnitude or size
    Max,
    /// Literal equality
    Val,
    /// Responds to a method
    Capability,
}

impl ConstraintKind {
    /// Identifier used in definitions (`#` for capabilities)
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Len => "len",
            Self::Min => "min",
            Self::Max => "max",
            Self::Val => "val",
            Self::Capability => "#",
        }
    }

    /// Look up a kind by identifier
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "format" => Some(Self::Format),
            "len" => Some(Self::Len),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "val" => Some(Self::Val),
            "#" => Some(Self::Capability),
            _ => None,
        }
    }
}

/// One constraint with its normalized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Constraint {
    /// Value must be text matching the pattern
    Format(Pattern),
    /// Value size must equal the bound
    Len(i64),
    /// Magnitude (numbers) or size must be at least the bound
    Min(i64),
    /// Magnitude (numbers) or size must be at most the bound
    Max(i64),
    /// Value rendering must equal the literal
    Val(Literal),
    /// Value must respond to the named method
    Capability(String),
}

impl Constraint {
    /// Build a constraint from an identifier and its raw value text
    ///
    /// # Errors
    ///
    /// Returns error if the identifier is unknown or the value does not fit it
    pub fn parse(identifier: &str, raw: &str) -> DefinitionResult<Self> {
        let kind = ConstraintKind::from_identifier(identifier).ok_or_else(|| {
            DefinitionError::UnknownConstraint {
                name: identifier.to_string(),
            }
        })?;
        let raw = raw.trim();
        let invalid = |reason: &str| DefinitionError::InvalidConstraint {
            name: identifier.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        match kind {
            ConstraintKind::Capability => {
                if raw.is_empty() {
                    return Err(invalid("method name is empty"));
                }
                Ok(Self::Capability(raw.to_string()))
            }
            ConstraintKind::Format => {
                let (body, flags) =
                    Pattern::split_literal(raw).ok_or_else(|| invalid("not a regular expression"))?;
                let pattern = Pattern::new(body, flags).map_err(|e| invalid(&e.to_string()))?;
                Ok(Self::Format(pattern))
            }
            ConstraintKind::Len | ConstraintKind::Min | ConstraintKind::Max => {
                let bound = parse_canonical_int(raw).ok_or_else(|| invalid("not an integer"))?;
                Ok(match kind {
                    ConstraintKind::Len => Self::Len(bound),
                    ConstraintKind::Min => Self::Min(bound),
                    _ => Self::Max(bound),
                })
            }
            ConstraintKind::Val => {
                if raw.is_empty() {
                    return Err(invalid("literal is empty"));
                }
                Ok(Self::Val(Literal::parse(raw)))
            }
        }
    }

    /// Kind of this constraint
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Format(_) => ConstraintKind::Format,
            Self::Len(_) => ConstraintKind::Len,
            Self::Min(_) => ConstraintKind::Min,
            Self::Max(_) => ConstraintKind::Max,
            Self::Val(_) => ConstraintKind::Val,
            Self::Capability(_) => ConstraintKind::Capability,
        }
    }

    /// Key two constraints on one element may not share
    #[must_use]
    pub fn uniqueness_key(&self) -> String {
        match self {
            Self::Capability(method) => format!("#{}", method),
            other => other.kind().identifier().to_string(),
        }
    }
}

fn parse_canonical_int(raw: &str) -> Option<i64> {
    let n: i64 = raw.parse().ok()?;
    (n.to_string() == raw).then_some(n)
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(pattern) => write!(f, "format:{}", pattern),
            Self::Len(n) => write!(f, "len:{}", n),
            Self::Min(n) => write!(f, "min:{}", n),
            Self::Max(n) => write!(f, "max:{}", n),
            Self::Val(literal) => write!(f, "val:{}", literal),
            Self::Capability(method) => write!(f, "#{}", method),
        }
    }
}

/// Non-empty list of constraints with unique kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Assemble the constraints of one element
    ///
    /// # Errors
    ///
    /// Returns error if the list is empty or two constraints share a kind
    pub fn new(constraints: Vec<Constraint>) -> DefinitionResult<Self> {
        if constraints.is_empty() {
            return Err(DefinitionError::Internal {
                message: "constraint list is empty".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for constraint in &constraints {
            let key = constraint.uniqueness_key();
            if !seen.insert(key.clone()) {
                return Err(DefinitionError::DuplicateConstraint { constraint: key });
            }
        }

        Ok(Self { constraints })
    }

    /// Iterate in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Number of constraints
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", constraint)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_bounds() {
        assert_eq!(Constraint::parse("len", "5").unwrap(), Constraint::Len(5));
        assert_eq!(Constraint::parse("min", " -3 ").unwrap(), Constraint::Min(-3));
        assert_eq!(Constraint::parse("max", "10").unwrap(), Constraint::Max(10));
    }

    #[test]
    fn test_parse_rejects_non_canonical_int() {
        for raw in ["05", "+5", "5.0", "five", ""] {
            let err = Constraint::parse("len", raw).unwrap_err();
            assert!(matches!(err, DefinitionError::InvalidConstraint { .. }), "{}", raw);
        }
    }

    #[test]
    fn test_parse_unknown_identifier() {
        let err = Constraint::parse("size", "3").unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownConstraint {
                name: "size".to_string()
            }
        );
    }

    #[test]
    fn test_parse_format() {
        let c = Constraint::parse("format", "/wo+/i").unwrap();
        match &c {
            Constraint::Format(p) => {
                assert_eq!(p.body(), "wo+");
                assert_eq!(p.flags(), "i");
                assert!(p.is_match("a WOOT"));
                assert!(!p.is_match("w00"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.to_string(), "format:/wo+/i");
    }

    #[test]
    fn test_parse_format_rejects_bad_input() {
        assert!(Constraint::parse("format", "woo").is_err());
        assert!(Constraint::parse("format", "/(/").is_err());
        assert!(Constraint::parse("format", "/a/q").is_err());
    }

    #[test]
    fn test_pattern_escaped_slash() {
        let p = Pattern::new(r"a\/b", "").unwrap();
        assert!(p.is_match("xa/by"));
        assert_eq!(p.to_string(), r"/a\/b/");
    }

    #[test]
    fn test_parse_val_literals() {
        assert_eq!(
            Constraint::parse("val", "\"say \\\"hi\\\"\"").unwrap(),
            Constraint::Val(Literal::Text("say \"hi\"".to_string()))
        );
        assert_eq!(
            Constraint::parse("val", ":foo").unwrap(),
            Constraint::Val(Literal::Token(":foo".to_string()))
        );
        assert_eq!(
            Constraint::parse("val", "\"\"").unwrap(),
            Constraint::Val(Literal::Text(String::new()))
        );
    }

    #[test]
    fn test_literal_display_escapes() {
        let lit = Literal::Text("a\"b\\c".to_string());
        assert_eq!(lit.to_string(), r#""a\"b\c""#);

        // Backslashes are doubled only where they would otherwise escape
        assert_eq!(Literal::Text(r"x\".to_string()).to_string(), r#""x\\""#);
        assert_eq!(Literal::Text(r#"\""#.to_string()).to_string(), r#""\\\"""#);
        assert_eq!(Literal::Text(r"\\n".to_string()).to_string(), r#""\\\n""#);
        for text in [r"a\nb", r"x\", r#"\""#, r"\\n", "plain"] {
            let lit = Literal::Text(text.to_string());
            assert_eq!(Literal::parse(&lit.to_string()), lit);
        }
        assert_eq!(Literal::parse(&lit.to_string()), lit);
    }

    #[test]
    fn test_constraint_set_duplicates() {
        let err = ConstraintSet::new(vec![Constraint::Min(1), Constraint::Min(2)]).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateConstraint {
                constraint: "min".to_string()
            }
        );

        let err = ConstraintSet::new(vec![
            Constraint::Capability("to_s".to_string()),
            Constraint::Capability("to_s".to_string()),
        ])
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateConstraint { .. }));
    }

    #[test]
    fn test_constraint_set_distinct_capabilities() {
        let set = ConstraintSet::new(vec![
            Constraint::Capability("to_s".to_string()),
            Constraint::Capability("to_i".to_string()),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "(#to_s,#to_i)");
    }

    #[test]
    fn test_constraint_set_rejects_empty() {
        assert!(ConstraintSet::new(Vec::new()).is_err());
    }

    #[test]
    fn test_serialize_constraint() {
        let json = serde_json::to_string(&Constraint::Len(3)).unwrap();
        assert_eq!(json, r#"{"kind":"len","value":3}"#);

        let c = Constraint::parse("format", "/a+/").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"kind":"format","value":"/a+/"}"#);
    }

    proptest::proptest! {
        #[test]
        fn prop_bound_text_roundtrip(n: i64) {
            let c = Constraint::parse("min", &n.to_string()).unwrap();
            prop_assert_eq!(c.to_string(), format!("min:{}", n));
        }
    }
}
