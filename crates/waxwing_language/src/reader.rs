//! The reader: source text to forms.
//!
//! The grammar is small: identifiers, decimal integers, double-quoted
//! strings without escapes, and parenthesized lists. Whitespace separates
//! items. The reader produces [`Form`]s directly; there is no token layer.

use std::sync::Arc;

use waxwing_foundation::{Error, Position, Result};

use crate::form::Form;
use crate::types::Types;

/// Reader for Waxwing source code.
pub struct Reader<'src> {
    types: &'src Types,
    /// Name of the source, shared into every position.
    source: Arc<str>,
    /// Remaining source text.
    rest: &'src str,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Reader<'src> {
    /// Creates a reader over the given source text.
    #[must_use]
    pub fn new(name: &str, text: &'src str, types: &'src Types) -> Self {
        Self {
            types,
            source: Arc::from(name),
            rest: text,
            line: 1,
            column: 1,
        }
    }

    /// Reads all forms from the source.
    pub fn read_all(mut self) -> Result<Vec<Form>> {
        let mut forms = Vec::new();
        while let Some(form) = self.read_form()? {
            forms.push(form);
        }
        Ok(forms)
    }

    /// Reads the next form, or `None` at end of input.
    fn read_form(&mut self) -> Result<Option<Form>> {
        self.skip_whitespace();
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };
        match c {
            '(' => self.read_list().map(Some),
            ')' => Err(Error::internal(format!(
                "{}: unexpected closing paren",
                self.position()
            ))),
            '"' => self.read_string().map(Some),
            c if c.is_ascii_digit() => Ok(Some(self.read_integer())),
            '-' if self.next_is_digit() => Ok(Some(self.read_integer())),
            _ => Ok(Some(self.read_identifier())),
        }
    }

    /// Reads a list. The opening paren has already been peeked.
    fn read_list(&mut self) -> Result<Form> {
        let position = self.position();
        self.advance();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(Error::OpenList(position)),
                Some(')') => {
                    self.advance();
                    return Ok(Form::List { items, position });
                }
                Some(_) => {
                    let Some(form) = self.read_form()? else {
                        return Err(Error::OpenList(position));
                    };
                    items.push(form);
                }
            }
        }
    }

    /// Reads a string literal. No escape processing: the body runs to the
    /// next double quote.
    fn read_string(&mut self) -> Result<Form> {
        let position = self.position();
        self.advance();
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => return Err(Error::OpenString(position)),
                Some('"') => {
                    self.advance();
                    let value = self.types.string(text);
                    return Ok(Form::Literal { value, position });
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Reads a decimal integer, optionally negative. Stops at the first
    /// non-digit; only `0-9` are digits.
    fn read_integer(&mut self) -> Form {
        let position = self.position();
        let negative = self.peek_char() == Some('-');
        if negative {
            self.advance();
        }
        let mut value: i64 = 0;
        while let Some(digit) = self.peek_char().and_then(|c| c.to_digit(10)) {
            value = value * 10 + i64::from(digit);
            self.advance();
        }
        let value = self.types.int(if negative { -value } else { value });
        Form::Literal { value, position }
    }

    /// Reads an identifier: a maximal run of non-whitespace, non-paren
    /// characters.
    fn read_identifier(&mut self) -> Form {
        let position = self.position();
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            name.push(c);
            self.advance();
        }
        Form::Identifier { name, position }
    }

    /// Returns the position of the next character.
    fn position(&self) -> Position {
        Position::new(Arc::clone(&self.source), self.line, self.column)
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Returns true if the character after the next one is a digit.
    fn next_is_digit(&self) -> bool {
        self.rest
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Advances past the next character, tracking line and column.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.rest = &self.rest[c.len_utf8()..];
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }
}

/// Reads all forms from `text`, labeling positions with `name`.
pub fn read(name: &str, text: &str, types: &Types) -> Result<Vec<Form>> {
    Reader::new(name, text, types).read_all()
}
