//! REPL, line editing, and the CLI session for Waxwing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod editor;
pub mod repl;
pub mod session;

pub use editor::{LineEditor, ReadResult, RustylineEditor, ScriptedEditor};
pub use repl::Repl;
pub use session::Session;
