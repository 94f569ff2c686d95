//! Source positions and errors shared by every Waxwing layer.
//!
//! This crate provides:
//! - [`Position`] - Source locations `(source, line, column)` used verbatim
//!   in diagnostics
//! - [`Error`] - The diagnostics raised by the reader, the emitter, and the
//!   evaluator, each carrying the position it was raised at

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod position;

// Re-export primary types at crate root for convenience
pub use error::{Error, Family};
pub use position::Position;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
