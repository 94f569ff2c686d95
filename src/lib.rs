//! Waxwing - an s-expression language with cooperative tasks
//!
//! This crate re-exports all layers of the Waxwing system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: waxwing_runtime    — REPL, line editing, CLI
//! Layer 1: waxwing_language   — reader, emission, bytecode VM, tasks, stdlib
//! Layer 0: waxwing_foundation — positions, errors
//! ```

pub use waxwing_foundation as foundation;
pub use waxwing_language as language;
pub use waxwing_runtime as runtime;
