//! An interpreter session: standard namespace, VM, and the code emitted so
//! far.
//!
//! The session is the unit both the REPL and the file driver share. Code
//! accumulates across evaluations (the buffer is append-only); each
//! evaluation emits the new forms plus a trailing stop and runs from where
//! the emission began.

use waxwing_foundation::Result;
use waxwing_language::{
    EmitOptions, NamespaceRef, Op, Types, Value, Vm, emit_forms, read, standard_namespace,
};

/// A persistent interpreter session.
pub struct Session {
    types: Types,
    namespace: NamespaceRef,
    vm: Vm,
}

impl Session {
    /// Creates a session over the standard namespace.
    #[must_use]
    pub fn new() -> Self {
        let types = Types::new();
        let namespace = standard_namespace(&types);
        let vm = Vm::new(types.clone());
        Self {
            types,
            namespace,
            vm,
        }
    }

    /// Reads, emits, and evaluates `input`, returning the value left on top
    /// of the stack, if any.
    ///
    /// On an error the already-emitted prefix stays in the code buffer; it
    /// is inert because nothing jumps into it.
    pub fn eval_source(&mut self, name: &str, input: &str) -> Result<Option<Value>> {
        let forms = read(name, input, &self.types)?;
        let from_pc = self.vm.emit_pc();
        emit_forms(&mut self.vm, &self.namespace, forms, EmitOptions::default())?;
        self.vm.emit(Op::Stop);
        self.vm.eval(from_pc)?;
        Ok(self.vm.pop_result())
    }

    /// Sets the VM's trace flag.
    pub fn set_trace(&mut self, trace: bool) {
        self.vm.set_trace(trace);
    }

    /// Returns the session's root namespace.
    #[must_use]
    pub const fn namespace(&self) -> &NamespaceRef {
        &self.namespace
    }

    /// Returns the session's type registry.
    #[must_use]
    pub const fn types(&self) -> &Types {
        &self.types
    }

    /// Returns the session's VM.
    #[must_use]
    pub const fn vm(&self) -> &Vm {
        &self.vm
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
