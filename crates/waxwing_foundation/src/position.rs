//! Source location tracking.
//!
//! `Position` identifies a point in a source text by name, line, and column.
//! Positions travel with forms and opcodes so diagnostics can point at the
//! exact character that produced them.

use std::fmt;
use std::sync::Arc;

/// A location in a source text.
///
/// The source name is shared, so positions are cheap to clone even though
/// every emitted opcode that can fault carries one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Name of the source (file path, `"repl"`, ...).
    source: Arc<str>,
    /// 1-based line number. Increments on newline.
    line: u32,
    /// 1-based column number. Increments per character, resets on newline.
    column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }

    /// Creates a position at the start of the named source.
    #[must_use]
    pub fn start(source: impl Into<Arc<str>>) -> Self {
        Self::new(source, 1, 1)
    }

    /// Returns the source name.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the 1-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the 1-based column number.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}
