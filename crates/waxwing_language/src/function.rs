//! Function and macro descriptors, and call frames.
//!
//! Functions run at eval time and consume stack values; macros run at emit
//! time and consume sibling forms. Both are first-class values (see
//! [`crate::value::Payload`]).

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use waxwing_foundation::{Error, Position, Result};

use crate::form::Form;
use crate::namespace::NamespaceRef;
use crate::vm::Vm;

/// The body of a primitive function, run inline when the function is called.
pub type PrimitiveFn = fn(&mut Vm, &Position) -> Result<()>;

/// The emit-time body of a macro. May pull forms off the front of `args`.
pub type MacroFn = fn(&mut Vm, &Position, &NamespaceRef, &mut VecDeque<Form>) -> Result<()>;

/// A function descriptor.
///
/// A primitive has a body and no `start_pc`; calling it runs the body
/// inline. A user-defined function has a `start_pc`; calling it installs a
/// call frame and jumps there.
pub struct Function {
    name: String,
    parameters: Vec<String>,
    start_pc: Option<usize>,
    body: Option<PrimitiveFn>,
}

impl Function {
    /// Creates a primitive function.
    #[must_use]
    pub fn primitive(name: impl Into<String>, parameters: &[&str], body: PrimitiveFn) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(ToString::to_string).collect(),
            start_pc: None,
            body: Some(body),
        }
    }

    /// Creates a user-defined function whose body starts at `start_pc`.
    #[must_use]
    pub fn user(name: impl Into<String>, parameters: Vec<String>, start_pc: usize) -> Self {
        Self {
            name: name.into(),
            parameters,
            start_pc: Some(start_pc),
            body: None,
        }
    }

    /// Returns the function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered parameter names.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the body's entry point, absent for primitives.
    #[must_use]
    pub const fn start_pc(&self) -> Option<usize> {
        self.start_pc
    }

    /// Invokes the function.
    ///
    /// Fails with [`Error::MissingValue`] when fewer values are on the stack
    /// than the function has parameters. A primitive body runs inline; a
    /// user-defined function installs a call frame whose `stack_offset`
    /// addresses the arguments already on the stack, then jumps to its body.
    pub fn call(self: &Rc<Self>, vm: &mut Vm, position: &Position) -> Result<()> {
        let arity = self.parameters.len();
        if vm.stack_len() < arity {
            return Err(Error::MissingValue(position.clone()));
        }
        if let Some(start_pc) = self.start_pc {
            let frame = CallFrame {
                target: Rc::clone(self),
                position: position.clone(),
                stack_offset: vm.stack_len() - arity,
                return_pc: vm.pc(),
            };
            vm.push_frame(frame);
            vm.jump(start_pc);
            return Ok(());
        }
        match self.body {
            Some(body) => body(vm, position),
            None => Err(Error::internal(format!(
                "function {} has neither a body nor bytecode",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start_pc {
            Some(pc) => write!(f, "<function {} @{pc}>", self.name),
            None => write!(f, "<primitive {}>", self.name),
        }
    }
}

/// A macro descriptor: a name plus an emit-time body.
pub struct Macro {
    name: String,
    body: MacroFn,
}

impl Macro {
    /// Creates a macro.
    #[must_use]
    pub fn new(name: impl Into<String>, body: MacroFn) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Returns the macro's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the emit-time body over the remaining sibling forms.
    pub fn expand(
        &self,
        vm: &mut Vm,
        position: &Position,
        namespace: &NamespaceRef,
        args: &mut VecDeque<Form>,
    ) -> Result<()> {
        (self.body)(vm, position, namespace, args)
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<macro {}>", self.name)
    }
}

/// A per-invocation record for a user-defined function.
///
/// Frames live in a stack owned by the task; the parent of a frame is the
/// next-lower element. While a frame is active, the stack slots
/// `[stack_offset, stack_offset + arity)` hold that call's arguments.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// The function being executed. Overwritten in place by a tail call.
    pub target: Rc<Function>,
    /// Where the call was made.
    pub position: Position,
    /// Index of the first argument on the task's stack.
    pub stack_offset: usize,
    /// Where execution resumes after the frame is popped.
    pub return_pc: usize,
}
