//! Line editor abstraction for the REPL.
//!
//! This module provides a trait-based abstraction over line editing,
//! allowing the REPL to use rustyline interactively while tests drive it
//! with scripted input.

use waxwing_foundation::{Error, Result};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing functionality.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Adds an input to history.
    fn add_history(&mut self, input: &str);
}

/// The default rustyline-backed editor.
pub struct RustylineEditor {
    editor: DefaultEditor,
}

impl RustylineEditor {
    /// Creates a new rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| Error::internal(format!("failed to initialize line editor: {e}")))?;
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(format!("failed to read input: {e}"))),
        }
    }

    fn add_history(&mut self, input: &str) {
        let _ = self.editor.add_history_entry(input);
    }
}

/// An editor that replays a fixed sequence of lines, then reports EOF.
/// Used by tests and useful for embedding.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    lines: std::collections::VecDeque<String>,
    history: Vec<String>,
}

impl ScriptedEditor {
    /// Creates a scripted editor over the given lines.
    #[must_use]
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(ToString::to_string).collect(),
            history: Vec::new(),
        }
    }

    /// Returns the inputs added to history so far.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        match self.lines.pop_front() {
            Some(line) => Ok(ReadResult::Line(line)),
            None => Ok(ReadResult::Eof),
        }
    }

    fn add_history(&mut self, input: &str) {
        self.history.push(input.to_string());
    }
}
