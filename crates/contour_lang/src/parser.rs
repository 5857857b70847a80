//! Definition parser
//!
//! Builds a [`TypeExpression`] from a definition in one left-to-right scan.
//! The input is validated first, so the scan only has to track which
//! frame it is in; any shape it cannot place is an internal error.

use crate::literal::scan_literal;
use crate::validate::validate;
use contour_core::{
    ChildSlots, Constraint, ConstraintSet, DefinitionError, DefinitionResult, TypeElement,
    TypeExpression,
};

/// Parse a definition into a type expression
///
/// # Errors
///
/// Returns [`DefinitionError::Syntax`] if the definition is malformed, or a
/// constraint error if a constraint list is repeated, unknown, or invalid
pub fn parse(definition: &str) -> DefinitionResult<TypeExpression> {
    validate(definition)?;
    let chars: Vec<char> = definition.chars().collect();
    Parser::new(&chars).run()
}

/// Open construct on the parse stack
#[derive(Debug)]
enum Frame {
    /// Alternatives of the sum being assembled
    Sum(Vec<TypeElement>),
    /// Completed slots of an open collection
    Slots(Vec<TypeExpression>),
}

/// What a `(` attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    /// Nothing written: an implied `Object`
    Implied,
    /// A name sits in the buffer
    Unmade,
    /// The last element of the current sum was just closed
    Made,
}

struct Parser<'a> {
    chars: &'a [char],
    stack: Vec<Frame>,
    name: String,
    subject: Subject,
}

impl<'a> Parser<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            stack: vec![Frame::Sum(Vec::new())],
            name: String::new(),
            subject: Subject::Implied,
        }
    }

    fn run(mut self) -> DefinitionResult<TypeExpression> {
        let mut i = 0;
        while i < self.chars.len() {
            let c = self.chars[i];
            match c {
                '|' => {
                    self.close_name()?;
                    self.subject = Subject::Implied;
                }
                '<' => {
                    self.close_name()?;
                    self.stack.push(Frame::Slots(Vec::new()));
                    self.stack.push(Frame::Sum(Vec::new()));
                    self.subject = Subject::Implied;
                }
                ',' => {
                    self.close_name()?;
                    self.close_slot()?;
                    self.stack.push(Frame::Sum(Vec::new()));
                    self.subject = Subject::Implied;
                }
                '>' => {
                    self.close_name()?;
                    self.close_slot()?;
                    self.close_collection()?;
                    self.subject = Subject::Made;
                }
                '(' => {
                    match self.subject {
                        Subject::Implied => self.sum()?.push(TypeElement::any_object()),
                        Subject::Unmade => self.close_name()?,
                        Subject::Made => {}
                    }
                    let (constraints, close) = self.constraint_list(i + 1)?;
                    let element = self.pop_element()?.with_constraints(constraints);
                    self.sum()?.push(element);
                    self.subject = Subject::Made;
                    i = close;
                }
                c if c.is_whitespace() => {}
                c => {
                    self.name.push(c);
                    self.subject = Subject::Unmade;
                }
            }
            i += 1;
        }
        self.close_name()?;

        match self.stack.pop() {
            Some(Frame::Sum(elements)) if self.stack.is_empty() => TypeExpression::new(elements),
            _ => Err(internal("unbalanced frames at end of definition")),
        }
    }

    /// Turn the buffered name, if any, into an element of the current sum
    fn close_name(&mut self) -> DefinitionResult<()> {
        if self.name.is_empty() {
            return Ok(());
        }
        let written = std::mem::take(&mut self.name);
        let element = element_for(&written)?;
        self.sum()?.push(element);
        Ok(())
    }

    /// Move the current sum into its collection as the next slot
    fn close_slot(&mut self) -> DefinitionResult<()> {
        let elements = match self.stack.pop() {
            Some(Frame::Sum(elements)) => elements,
            _ => return Err(internal("slot closed outside a collection")),
        };
        let slot = TypeExpression::new(elements)?;
        match self.stack.last_mut() {
            Some(Frame::Slots(slots)) => {
                slots.push(slot);
                Ok(())
            }
            _ => Err(internal("slot closed outside a collection")),
        }
    }

    /// Attach the open collection's slots to its owning element
    fn close_collection(&mut self) -> DefinitionResult<()> {
        let slots = match self.stack.pop() {
            Some(Frame::Slots(slots)) => slots,
            _ => return Err(internal("collection closed without slots")),
        };
        let children = ChildSlots::new(slots)?;
        let element = self.pop_element()?.with_children(children);
        self.sum()?.push(element);
        Ok(())
    }

    /// Read a constraint list starting after its `(`
    ///
    /// Returns the constraints and the index of the closing `)`.
    fn constraint_list(&self, start: usize) -> DefinitionResult<(ConstraintSet, usize)> {
        let mut pairs = Vec::new();
        let mut raw = String::new();
        let mut i = start;
        while i < self.chars.len() {
            match self.chars[i] {
                '"' | '/' => {
                    let end = scan_literal(self.chars, i)?;
                    raw.extend(&self.chars[i..=end]);
                    i = end;
                }
                ',' => pairs.push(parse_pair(&std::mem::take(&mut raw))?),
                ')' => {
                    pairs.push(parse_pair(&raw)?);
                    return Ok((ConstraintSet::new(pairs)?, i));
                }
                c => raw.push(c),
            }
            i += 1;
        }
        Err(internal("constraint list never closed"))
    }

    fn sum(&mut self) -> DefinitionResult<&mut Vec<TypeElement>> {
        match self.stack.last_mut() {
            Some(Frame::Sum(elements)) => Ok(elements),
            _ => Err(internal("no open sum")),
        }
    }

    fn pop_element(&mut self) -> DefinitionResult<TypeElement> {
        self.sum()?
            .pop()
            .ok_or_else(|| internal("no element to attach to"))
    }
}

/// Element for a name as written; `#m` and `:token` become bare constraints
fn element_for(written: &str) -> DefinitionResult<TypeElement> {
    let bare = if let Some(method) = written.strip_prefix('#') {
        Some(Constraint::parse("#", method)?)
    } else if written.starts_with(':') {
        Some(Constraint::parse("val", written)?)
    } else {
        None
    };

    Ok(match bare {
        Some(constraint) => {
            TypeElement::any_object().with_constraints(ConstraintSet::new(vec![constraint])?)
        }
        None => TypeElement::named(written),
    })
}

/// Parse one `identifier: value`, `#method` or `:token` pair
fn parse_pair(raw: &str) -> DefinitionResult<Constraint> {
    let pair = raw.trim();
    if let Some(method) = pair.strip_prefix('#') {
        return Constraint::parse("#", method);
    }
    if pair.starts_with(':') {
        return Constraint::parse("val", pair);
    }
    match pair.split_once(':') {
        Some((identifier, value)) => Constraint::parse(identifier.trim(), value),
        None => Err(internal("constraint pair without a colon")),
    }
}

fn internal(message: &str) -> DefinitionError {
    DefinitionError::Internal {
        message: message.to_string(),
    }
}
