//! Grammar validation for type definitions.
//!
//! A definition has four constructs: names, collections, constraints and
//! sums.
//!
//! * **Names** (`String`, `Integer?`) name a class or module. A blank name
//!   stands for `Object`, which is how bare duck types are written. A
//!   trailing `?` makes the element optional.
//! * **Collections** (`Array<Integer>`, `Hash<Symbol, String>`) follow the
//!   name without a space. Each comma-separated slot is itself a full
//!   definition describing one part of the items the collection emits.
//! * **Constraints** (`Integer(min: 0, max: 10)`, `String(format: /a{3}/)`,
//!   `Foo(#bar)`) follow the name or collection without a space. A pair is
//!   `identifier: value`, `#method`, or the `:token` shorthand for `val`.
//!   A bare `#method` or `:token` may also stand in place of a name.
//! * **Sums** (`String|Float`) join alternatives with `|`.
//!
//! The validator checks shape only. Unknown identifiers, malformed values
//! and repeated constraints are reported when the tree is built.

use crate::literal::scan_literal;
use crate::syntax::{CharClass, Expect, PairMode, SyntaxState};
use contour_core::{SyntaxError, SyntaxReason};

/// Check that `definition` is a well-formed type definition
///
/// # Errors
///
/// Returns the first syntax error, with its position and an excerpt
pub fn validate(definition: &str) -> Result<(), SyntaxError> {
    let chars: Vec<char> = definition.chars().collect();
    Validator::new(&chars).run()
}

struct Validator<'a> {
    chars: &'a [char],
    state: SyntaxState,
}

impl<'a> Validator<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            state: SyntaxState::new(),
        }
    }

    fn run(mut self) -> Result<(), SyntaxError> {
        if self.chars.is_empty() {
            return Err(SyntaxError::at(SyntaxReason::Empty, self.chars, 0));
        }

        let mut i = 0;
        while i < self.chars.len() {
            i = self.step(i)? + 1;
        }

        if let Some(closer) = self.state.unbalanced() {
            return Err(SyntaxError::at_end(
                SyntaxReason::MissingClosing(closer),
                self.chars,
            ));
        }
        if !self.state.allows(Expect::END) {
            return Err(SyntaxError::at_end(SyntaxReason::IllegalEnd, self.chars));
        }
        Ok(())
    }

    /// Consume the character at `i`; returns the index of the last
    /// character consumed (literals consume several)
    fn step(&mut self, i: usize) -> Result<usize, SyntaxError> {
        let c = self.chars[i];
        let class = self.state.classify(c);
        if !self.state.allows(class.expect()) || !self.nesting_permits(class) {
            return Err(SyntaxError::at(
                SyntaxReason::UnexpectedChar(c),
                self.chars,
                i,
            ));
        }

        let state = &mut self.state;
        let inside = state.in_constraints();
        match class {
            CharClass::Bar => {
                state.enable_all();
                state.allow_only(Expect::ELEMENT_START);
            }
            CharClass::LAngle => {
                state.open_angle();
                state.allow_only(Expect::ELEMENT_START);
            }
            CharClass::RAngle => {
                state.close_angle();
                state.enable_all();
                state.allow_only(Expect::COLLECTION);
            }
            CharClass::LParen => {
                state.open_paren();
                state.allow_only(Expect::PAIR_START);
            }
            CharClass::RParen => {
                state.close_paren();
                state.allow_only(Expect::TERMINATED);
            }
            CharClass::Hash if inside => {
                state.set_pair(PairMode::Capability);
                state.allow_only(Expect::OTHER);
            }
            CharClass::Colon if inside => {
                if state.pair() == Some(PairMode::Start) {
                    // `:token` shorthand: the token follows immediately
                    state.allow_only(Expect::OTHER);
                } else {
                    state.allow_only(Expect::VALUE_START);
                }
                state.set_pair(PairMode::Value);
            }
            CharClass::Hash | CharClass::Colon => {
                state.disable(Expect::BARE_FORBIDDEN);
                state.allow_only(Expect::OTHER);
            }
            CharClass::Slash | CharClass::Quote => {
                let end = scan_literal(self.chars, i)?;
                state.allow_only(Expect::VALUE_END);
                return Ok(end);
            }
            CharClass::Comma if inside => {
                state.set_pair(PairMode::Start);
                state.allow_only(Expect::PAIR_START);
            }
            CharClass::Comma => {
                state.enable_all();
                state.allow_only(Expect::ELEMENT_START);
            }
            CharClass::Space => {
                if inside {
                    if state.allows(Expect::RPAREN) {
                        state.allow_only(Expect::VALUE_END);
                    }
                } else if state.allows(Expect::END) {
                    state.allow_only(Expect::TERMINATED);
                }
            }
            CharClass::Question => state.allow_only(Expect::OPTIONAL),
            CharClass::Other if inside => match state.pair() {
                Some(PairMode::Capability) => state.allow_only(Expect::METHOD),
                Some(PairMode::Value) => state.allow_only(Expect::VALUE),
                _ => {
                    state.set_pair(PairMode::Identifier);
                    state.allow_only(Expect::IDENTIFIER);
                }
            },
            CharClass::Other => state.allow_only(Expect::NAME),
        }
        Ok(i)
    }

    fn nesting_permits(&self, class: CharClass) -> bool {
        match class {
            CharClass::RAngle => self.state.in_collection(),
            CharClass::Comma => self.state.in_constraints() || self.state.in_collection(),
            CharClass::LParen => !self.state.in_constraints(),
            CharClass::RParen | CharClass::Slash | CharClass::Quote => {
                self.state.in_constraints()
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VALID: &[&str] = &[
        "String",
        "Array<String>",
        "Hash<Symbol,String>",
        "Hash<Symbol, String>",
        "Collection<Integer,String,Array<Integer>>",
        "String|Float",
        "Array|Hash|Float",
        "Array<Array<String>>",
        "String|Array<Integer>",
        "Array<Integer>|String",
        "String|Integer|Array<Hash<Symbol,Object>>",
        "Boolean|Array<String|Hash<Symbol,Integer>|Array<String>>",
        "Array(len: 5)",
        "String(format: /woo/)",
        "String(format: /a{3}/i)",
        "String(#size)",
        "String(#size, #to_s)",
        "Symbol(val: :foo)",
        "Integer(min: 1, max: 10)",
        "Array<String(min: 3)>",
        "Hash<Symbol,String(min: 3)>",
        "Array<String(min: 3)>(max: 10)",
        "String(val: \"This is a test.\")",
        "String(val: \"a, (b) <c>|d\")",
        "String(format: /[,)(<>|]/)",
        "#to_s",
        "(#to_s, #to_i)",
        "#to_s|#to_i",
        "(#to_s, #to_i)|#to_f",
        "Array<#to_s>",
        "Array<(#to_s, #to_i)>",
        ":foo",
        ":foo|:bar",
        "Array<:foo>",
        "String?",
        "String?|Integer?",
        "Array<Integer?>",
        "Array?<Integer>",
        "#empty?",
        "String | Integer",
        ":foo?",
        "Foo(:bar)",
        "Integer(min:1,min:2)",
    ];

    const INVALID: &[&str] = &[
        "",
        "Array<Integer",
        "Integer(min: 1",
        "Array<>",
        "Array<Integer>>",
        "Integer)",
        "|String",
        "String|",
        "String||Integer",
        "String<",
        "Array<Integer>String",
        "Integer(min: 1)<String>",
        "Integer(min: 1)(max: 2)",
        "Integer()",
        "Integer(min 1)",
        "Integer(min: 1,)",
        "Integer(min: (1))",
        "Integer(min: 1|2)",
        "String(format: /woo)",
        "String(format: //)",
        "String(val: \"abc)",
        "String(format: /a/q)",
        "Foo Bar",
        "String ?",
        "String??",
        "String:foo",
        "#to_s<Integer>",
        "#to_s(min: 1)",
        "Foo((:bar))",
        "#",
        ":",
        "Integer(: foo)",
        "Foo(#bar: 1)",
        "String,Integer",
        "/woo/",
    ];

    #[test]
    fn test_valid_definitions() {
        for definition in VALID {
            assert!(
                validate(definition).is_ok(),
                "{} should be valid: {:?}",
                definition,
                validate(definition)
            );
        }
    }

    #[test]
    fn test_invalid_definitions() {
        for definition in INVALID {
            assert!(validate(definition).is_err(), "{} should be invalid", definition);
        }
    }

    #[test]
    fn test_empty_definition() {
        let err = validate("").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::Empty);
    }

    #[test]
    fn test_unbalanced_angle() {
        let err = validate("Array<Integer").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::MissingClosing('>'));
        assert_eq!(err.position, 12);
    }

    #[test]
    fn test_unbalanced_paren() {
        let err = validate("Integer(min: 1").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::MissingClosing(')'));
    }

    #[test]
    fn test_angle_reported_before_paren() {
        let err = validate("Array<Integer(min: 1").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::MissingClosing('>'));
    }

    #[test]
    fn test_error_position_and_excerpt() {
        let err = validate("Array<Integer>>").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::UnexpectedChar('>'));
        assert_eq!(err.position, 14);
        assert_eq!(err.excerpt, "Array<Integer>>");

        let err = validate("String||Integer").unwrap_err();
        assert_eq!(err.position, 7);
        assert_eq!(err.excerpt, "String||");
    }

    #[test]
    fn test_illegal_end() {
        let err = validate("String|").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::IllegalEnd);
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_unterminated_literals() {
        let err = validate("String(format: /woo)").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::UnterminatedLiteral('/'));

        let err = validate("String(val: \"abc)").unwrap_err();
        assert_eq!(err.reason, SyntaxReason::UnterminatedLiteral('"'));
    }

    #[test]
    fn test_literal_contents_are_opaque() {
        assert!(validate("String(val: \"<<((\")").is_ok());
        assert!(validate("String(format: /\\/>|/)").is_ok());
    }

    proptest::proptest! {
        #[test]
        fn prop_validate_never_panics(s in ".*") {
            let _ = validate(&s);
        }

        #[test]
        fn prop_validate_grammar_alphabet(s in "[A-Za-z#:?|<>(),/\" ]{0,24}") {
            if let Err(err) = validate(&s) {
                prop_assert!(err.position <= s.chars().count());
                prop_assert!(s.starts_with(&err.excerpt));
            }
        }
    }
}
