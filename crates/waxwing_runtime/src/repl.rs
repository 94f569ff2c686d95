//! The interactive REPL.
//!
//! Input accumulates line by line; a blank line ends the entry. The
//! buffered text is then read, emitted with a trailing stop, and evaluated;
//! the top of the stack prints (or `_` when the stack is empty). Errors
//! print their diagnostic and reset the input buffer.

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::Session;
use waxwing_foundation::Result;

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    session: Session,
    buffer: String,
    prompt: String,
    continuation_prompt: String,
    show_banner: bool,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        Ok(Self::with_editor(RustylineEditor::new()?))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            buffer: String::new(),
            prompt: "wx> ".to_string(),
            continuation_prompt: "... ".to_string(),
            show_banner: true,
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally; evaluation errors
    /// are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            println!("waxwing {}", env!("CARGO_PKG_VERSION"));
            println!("end an entry with a blank line; Ctrl+D exits");
        }

        loop {
            let prompt = if self.buffer.is_empty() {
                &self.prompt
            } else {
                &self.continuation_prompt
            };
            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if line.trim().is_empty() {
                        self.evaluate_buffer();
                    } else {
                        self.buffer.push_str(&line);
                        self.buffer.push('\n');
                    }
                }
                ReadResult::Interrupted => {
                    self.buffer.clear();
                    println!("input cancelled");
                }
                ReadResult::Eof => break,
            }
        }

        println!();
        Ok(())
    }

    /// Evaluates and prints the buffered entry, if any.
    fn evaluate_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let input = std::mem::take(&mut self.buffer);
        self.editor.add_history(input.trim_end());
        match self.session.eval_source("repl", &input) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => println!("_"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}
