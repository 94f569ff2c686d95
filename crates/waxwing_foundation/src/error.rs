//! Error types for the Waxwing system.
//!
//! Uses `thiserror` for ergonomic error definition. Every diagnostic the
//! language can raise carries the source position it was raised at; the
//! variants group into three families matching the stage that raises them
//! (reading, emission, evaluation), plus `Internal` for invariant breaches
//! that should never be reachable from source text.

use thiserror::Error;

use crate::position::Position;

/// The main error type for Waxwing operations.
///
/// Propagation is uniform: an error unwinds the current read, emission, or
/// evaluation without cleanup beyond normal stack unwinding. Code already
/// emitted before a failing emission stays in the buffer; it is inert unless
/// explicitly jumped into.
#[derive(Debug, Error)]
pub enum Error {
    /// A list was still open when the source text ran out.
    #[error("{0}: unterminated list")]
    OpenList(Position),

    /// A string was still open when the source text ran out.
    #[error("{0}: unterminated string")]
    OpenString(Position),

    /// A macro or function form needed more sibling forms than remained.
    #[error("{0}: missing argument")]
    MissingArgument(Position),

    /// An identifier had no binding in the enclosing namespace chain.
    #[error("{0}: unknown identifier: {1}")]
    UnknownIdentifier(Position, String),

    /// A value was required on the stack and the stack was empty.
    #[error("{0}: missing value")]
    MissingValue(Position),

    /// Invariant breach (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the family of the stage that raises this error.
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::OpenList(_) | Self::OpenString(_) => Family::Read,
            Self::MissingArgument(_) | Self::UnknownIdentifier(..) => Family::Emit,
            Self::MissingValue(_) => Family::Eval,
            Self::Internal(_) => Family::Internal,
        }
    }

    /// Returns the position this error was raised at, if it carries one.
    #[must_use]
    pub const fn position(&self) -> Option<&Position> {
        match self {
            Self::OpenList(position)
            | Self::OpenString(position)
            | Self::MissingArgument(position)
            | Self::UnknownIdentifier(position, _)
            | Self::MissingValue(position) => Some(position),
            Self::Internal(_) => None,
        }
    }
}

/// The stage of the pipeline an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// Raised by the reader.
    Read,
    /// Raised during emission.
    Emit,
    /// Raised during evaluation.
    Eval,
    /// Invariant breach, not tied to a stage.
    Internal,
}
