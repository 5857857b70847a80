//! State machine driving definition validation.
//!
//! The state is the set of tokens allowed next, a set of tokens disabled
//! until the current element ends, and depth counters for `<…>` and `(…)`.

use bitflags::bitflags;

bitflags! {
    /// Token classes the validator distinguishes
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub(crate) struct Expect: u16 {
        /// `|`
        const BAR = 1 << 0;
        /// `<`
        const LANGLE = 1 << 1;
        /// `>`
        const RANGLE = 1 << 2;
        /// `(`
        const LPAREN = 1 << 3;
        /// `)`
        const RPAREN = 1 << 4;
        /// `#`
        const HASH = 1 << 5;
        /// `:`
        const COLON = 1 << 6;
        /// `/` opening a regex literal
        const SLASH = 1 << 7;
        /// `"` opening a string literal
        const QUOTE = 1 << 8;
        /// `,`
        const COMMA = 1 << 9;
        /// whitespace
        const SPACE = 1 << 10;
        /// `?` marking an optional name
        const QUESTION = 1 << 11;
        /// any other character
        const OTHER = 1 << 12;
        /// end of input
        const END = 1 << 13;

        // Outside constraint lists.

        /// Start of a sum alternative or a collection slot
        const ELEMENT_START = Self::HASH.bits() | Self::COLON.bits() | Self::LPAREN.bits()
            | Self::OTHER.bits() | Self::SPACE.bits();
        /// Inside a name
        const NAME = Self::OTHER.bits() | Self::QUESTION.bits() | Self::LANGLE.bits()
            | Self::LPAREN.bits() | Self::BAR.bits() | Self::RANGLE.bits()
            | Self::COMMA.bits() | Self::SPACE.bits() | Self::END.bits();
        /// After the optional marker
        const OPTIONAL = Self::LANGLE.bits() | Self::LPAREN.bits() | Self::BAR.bits()
            | Self::RANGLE.bits() | Self::COMMA.bits() | Self::SPACE.bits() | Self::END.bits();
        /// After a closed collection
        const COLLECTION = Self::LPAREN.bits() | Self::BAR.bits() | Self::RANGLE.bits()
            | Self::COMMA.bits() | Self::SPACE.bits() | Self::END.bits();
        /// After a complete element
        const TERMINATED = Self::BAR.bits() | Self::RANGLE.bits() | Self::COMMA.bits()
            | Self::SPACE.bits() | Self::END.bits();
        /// Cannot follow a bare constraint
        const BARE_FORBIDDEN = Self::LANGLE.bits() | Self::LPAREN.bits() | Self::QUESTION.bits();

        // Inside constraint lists.

        /// Start of a constraint pair
        const PAIR_START = Self::HASH.bits() | Self::COLON.bits() | Self::OTHER.bits()
            | Self::SPACE.bits();
        /// Inside an identifier
        const IDENTIFIER = Self::OTHER.bits() | Self::COLON.bits();
        /// Inside a capability's method name
        const METHOD = Self::OTHER.bits() | Self::COMMA.bits() | Self::RPAREN.bits()
            | Self::SPACE.bits();
        /// After an identifier's colon
        const VALUE_START = Self::SPACE.bits() | Self::SLASH.bits() | Self::QUOTE.bits()
            | Self::OTHER.bits();
        /// Inside a bare value token
        const VALUE = Self::OTHER.bits() | Self::COMMA.bits() | Self::RPAREN.bits()
            | Self::SPACE.bits();
        /// After a complete value
        const VALUE_END = Self::COMMA.bits() | Self::RPAREN.bits() | Self::SPACE.bits();
    }
}

/// Part of a constraint pair being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairMode {
    /// Nothing of the pair read yet
    Start,
    /// Identifier before `:`
    Identifier,
    /// Method name after `#`
    Capability,
    /// Value after `:`
    Value,
}

/// Character class of one input character in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// `|`
    Bar,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `#` where it introduces a capability
    Hash,
    /// `:` where it separates or introduces a literal
    Colon,
    /// `/`
    Slash,
    /// `"`
    Quote,
    /// `,`
    Comma,
    /// whitespace
    Space,
    /// `?` where it marks an optional name
    Question,
    /// anything else
    Other,
}

impl CharClass {
    /// Token this class is checked against
    #[must_use]
    pub(crate) fn expect(self) -> Expect {
        match self {
            Self::Bar => Expect::BAR,
            Self::LAngle => Expect::LANGLE,
            Self::RAngle => Expect::RANGLE,
            Self::LParen => Expect::LPAREN,
            Self::RParen => Expect::RPAREN,
            Self::Hash => Expect::HASH,
            Self::Colon => Expect::COLON,
            Self::Slash => Expect::SLASH,
            Self::Quote => Expect::QUOTE,
            Self::Comma => Expect::COMMA,
            Self::Space => Expect::SPACE,
            Self::Question => Expect::QUESTION,
            Self::Other => Expect::OTHER,
        }
    }
}

/// Validator state
#[derive(Debug, Clone)]
pub(crate) struct SyntaxState {
    allowed: Expect,
    disabled: Expect,
    angle: usize,
    paren: usize,
    pair: Option<PairMode>,
}

impl SyntaxState {
    /// State at the start of a definition
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            allowed: Expect::ELEMENT_START,
            disabled: Expect::empty(),
            angle: 0,
            paren: 0,
            pair: None,
        }
    }

    /// Classify a character given where the machine currently is
    #[must_use]
    pub(crate) fn classify(&self, c: char) -> CharClass {
        let in_value = self.pair == Some(PairMode::Value);
        match c {
            '|' => CharClass::Bar,
            '<' => CharClass::LAngle,
            '>' => CharClass::RAngle,
            '(' => CharClass::LParen,
            ')' => CharClass::RParen,
            ',' => CharClass::Comma,
            '"' => CharClass::Quote,
            '/' => CharClass::Slash,
            '#' if !in_value => CharClass::Hash,
            ':' if !in_value => CharClass::Colon,
            '?' if self.pair.is_none() && !self.in_bare() => CharClass::Question,
            c if c.is_whitespace() => CharClass::Space,
            _ => CharClass::Other,
        }
    }

    /// Whether a token may come next
    #[must_use]
    pub(crate) fn allows(&self, token: Expect) -> bool {
        self.allowed.difference(self.disabled).contains(token)
    }

    /// Allow exactly `tokens` next
    pub(crate) fn allow_only(&mut self, tokens: Expect) {
        self.allowed = tokens;
    }

    /// Forbid `tokens` until [`SyntaxState::enable_all`]
    pub(crate) fn disable(&mut self, tokens: Expect) {
        self.disabled.insert(tokens);
    }

    /// Lift every disabled token
    pub(crate) fn enable_all(&mut self) {
        self.disabled = Expect::empty();
    }

    /// Whether the current element is a bare constraint
    #[must_use]
    pub(crate) fn in_bare(&self) -> bool {
        self.disabled.contains(Expect::BARE_FORBIDDEN)
    }

    /// Inside a constraint list
    #[must_use]
    pub(crate) fn in_constraints(&self) -> bool {
        self.paren > 0
    }

    /// Inside at least one collection
    #[must_use]
    pub(crate) fn in_collection(&self) -> bool {
        self.angle > 0
    }

    /// Pair part being read, inside a constraint list
    #[must_use]
    pub(crate) fn pair(&self) -> Option<PairMode> {
        self.pair
    }

    /// Switch pair part
    pub(crate) fn set_pair(&mut self, pair: PairMode) {
        self.pair = Some(pair);
    }

    /// Enter a collection
    pub(crate) fn open_angle(&mut self) {
        self.angle += 1;
    }

    /// Leave a collection
    pub(crate) fn close_angle(&mut self) {
        self.angle = self.angle.saturating_sub(1);
    }

    /// Enter a constraint list
    pub(crate) fn open_paren(&mut self) {
        self.paren += 1;
        self.pair = Some(PairMode::Start);
    }

    /// Leave a constraint list
    pub(crate) fn close_paren(&mut self) {
        self.paren = self.paren.saturating_sub(1);
        self.pair = None;
    }

    /// First missing closer, angle before paren
    #[must_use]
    pub(crate) fn unbalanced(&self) -> Option<char> {
        if self.angle > 0 {
            Some('>')
        } else if self.paren > 0 {
            Some(')')
        } else {
            None
        }
    }
}

impl Default for SyntaxState {
    fn default() -> Self {
        Self::new()
    }
}
