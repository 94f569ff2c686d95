//! Bytecode instruction set for the Waxwing VM.
//!
//! The VM is stack-based. Opcodes that can fault at run time carry the
//! source position of the form that emitted them, so diagnostics point back
//! at source text. Jump targets are absolute program counters into the
//! shared code buffer.

use std::fmt;
use std::rc::Rc;

use waxwing_foundation::Position;

use crate::function::Function;
use crate::value::Value;

/// A single bytecode instruction.
#[derive(Clone, Debug)]
pub enum Op {
    /// Push the current call's argument `i`: `[] -> [stack[offset + i]]`
    Argument(usize),
    /// Pop an iteration count and re-enter evaluation over the following
    /// body that many times, timing it; pushes a `Time` value.
    Benchmark(Position),
    /// Pop; jump to the target when the value is falsy, else fall through.
    Branch(Position, usize),
    /// Invoke a function over values already on the stack.
    Call(Position, Rc<Function>),
    /// Unconditional jump.
    Goto(usize),
    /// No operation. Also the placeholder macros reserve and patch.
    Nop,
    /// Peek; when truthy keep the value and jump to the target, else pop and
    /// fall through.
    Or(Position, usize),
    /// Restore the parent frame, drop the argument slots, and jump to the
    /// saved return pc.
    PopCall(Rc<Function>),
    /// Push a value onto the current task's stack.
    Push(Value),
    /// Leave the evaluation loop.
    Stop,
    /// Invoke a function reusing the current call frame when possible.
    TailCall(Position, Rc<Function>),
    /// Fork a new task starting at the next instruction; the current task
    /// jumps to the target.
    Task(usize),
    /// Print the following instruction before it executes.
    Trace,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(index) => write!(f, "argument {index}"),
            Self::Benchmark(_) => write!(f, "benchmark"),
            Self::Branch(_, else_pc) => write!(f, "branch -> {else_pc}"),
            Self::Call(_, function) => write!(f, "call {}", function.name()),
            Self::Goto(target) => write!(f, "goto {target}"),
            Self::Nop => write!(f, "nop"),
            Self::Or(_, end_pc) => write!(f, "or -> {end_pc}"),
            Self::PopCall(function) => write!(f, "pop-call {}", function.name()),
            Self::Push(value) => write!(f, "push {value}"),
            Self::Stop => write!(f, "stop"),
            Self::TailCall(_, function) => write!(f, "tail-call {}", function.name()),
            Self::Task(end_pc) => write!(f, "task -> {end_pc}"),
            Self::Trace => write!(f, "trace"),
        }
    }
}
