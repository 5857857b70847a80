//! Scanners for the quoted-string and regex literals inside constraint values.
//!
//! A literal is opaque to the surrounding grammar: commas, brackets and bars
//! between its delimiters do not count. Only backslash escapes and the
//! closing delimiter are tracked.

use contour_core::constraint::PATTERN_FLAGS;
use contour_core::{SyntaxError, SyntaxReason};

/// Kind of delimited literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `"…"`
    Text,
    /// `/…/flags`
    Pattern,
}

impl LiteralKind {
    /// Kind opened by a delimiter character
    #[must_use]
    pub fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Text),
            '/' => Some(Self::Pattern),
            _ => None,
        }
    }

    /// Opening and closing delimiter
    #[must_use]
    pub fn delimiter(&self) -> char {
        match self {
            Self::Text => '"',
            Self::Pattern => '/',
        }
    }
}

/// Scan the literal whose opening delimiter sits at `start`
///
/// Returns the index of the literal's last character: the closing
/// delimiter, or the last flag of a regex literal.
///
/// # Errors
///
/// Returns error if `start` is not a delimiter, the literal is never
/// closed, or a regex literal is empty
pub fn scan_literal(chars: &[char], start: usize) -> Result<usize, SyntaxError> {
    let opener = chars
        .get(start)
        .copied()
        .ok_or_else(|| SyntaxError::at_end(SyntaxReason::IllegalEnd, chars))?;
    let kind = LiteralKind::from_delimiter(opener)
        .ok_or_else(|| SyntaxError::at(SyntaxReason::UnexpectedChar(opener), chars, start))?;
    let delimiter = kind.delimiter();

    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate().skip(start + 1) {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c != delimiter {
            continue;
        }

        return match kind {
            LiteralKind::Text => Ok(i),
            LiteralKind::Pattern if i == start + 1 => {
                Err(SyntaxError::at(SyntaxReason::EmptyPattern, chars, i))
            }
            LiteralKind::Pattern => {
                let flags = chars[i + 1..]
                    .iter()
                    .take_while(|c| PATTERN_FLAGS.contains(c))
                    .count();
                Ok(i + flags)
            }
        };
    }

    Err(SyntaxError::at_end(
        SyntaxReason::UnterminatedLiteral(delimiter),
        chars,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_scan_text() {
        let c = chars(r#"val: "a,b)" x"#);
        assert_eq!(scan_literal(&c, 5), Ok(10));
    }

    #[test]
    fn test_scan_text_escaped_quote() {
        let c = chars(r#""a\"b""#);
        assert_eq!(scan_literal(&c, 0), Ok(5));
    }

    #[test]
    fn test_scan_empty_text() {
        let c = chars(r#""""#);
        assert_eq!(scan_literal(&c, 0), Ok(1));
    }

    #[test]
    fn test_scan_pattern_with_flags() {
        let c = chars("/a|b>/im,");
        assert_eq!(scan_literal(&c, 0), Ok(7));
    }

    #[test]
    fn test_scan_pattern_escaped_slash() {
        let c = chars(r"/a\/b/)");
        assert_eq!(scan_literal(&c, 0), Ok(5));
    }

    #[test]
    fn test_scan_pattern_stops_at_unknown_flag() {
        let c = chars("/a/iq");
        assert_eq!(scan_literal(&c, 0), Ok(3));
    }

    #[test]
    fn test_scan_unterminated() {
        let c = chars(r#""abc"#);
        let err = scan_literal(&c, 0).unwrap_err();
        assert_eq!(err.reason, SyntaxReason::UnterminatedLiteral('"'));
        assert_eq!(err.position, 3);

        let c = chars(r"/ab\/");
        let err = scan_literal(&c, 0).unwrap_err();
        assert_eq!(err.reason, SyntaxReason::UnterminatedLiteral('/'));
    }

    #[test]
    fn test_scan_empty_pattern() {
        let c = chars("//");
        let err = scan_literal(&c, 0).unwrap_err();
        assert_eq!(err.reason, SyntaxReason::EmptyPattern);
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_scan_requires_delimiter() {
        let c = chars("abc");
        assert!(scan_literal(&c, 0).is_err());
        assert!(scan_literal(&c, 5).is_err());
    }
}
