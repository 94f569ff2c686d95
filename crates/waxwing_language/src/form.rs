//! Parsed forms and the emission protocol.
//!
//! A form compiles itself directly into the VM's code buffer; there is no
//! intermediate representation. Literals push themselves, lists re-enter
//! sequence emission over their items, and identifiers delegate to the type
//! descriptor of the value they resolve to (see [`crate::types`]).

use std::collections::VecDeque;

use waxwing_foundation::{Error, Position, Result};

use crate::namespace::NamespaceRef;
use crate::opcode::Op;
use crate::value::Value;
use crate::vm::Vm;

/// A parsed syntactic node.
#[derive(Clone, Debug)]
pub enum Form {
    /// A name to resolve in the enclosing namespace.
    Identifier {
        /// The identifier text.
        name: String,
        /// Where the identifier appeared.
        position: Position,
    },
    /// A parenthesized sequence of forms.
    List {
        /// The forms between the parens.
        items: Vec<Form>,
        /// Where the opening paren appeared.
        position: Position,
    },
    /// A self-evaluating literal (integer or string).
    Literal {
        /// The literal's value.
        value: Value,
        /// Where the literal appeared.
        position: Position,
    },
}

/// Options threaded through emission.
///
/// `returning` marks the tail of a function body; it is set only by the
/// `return` macro and is what allows a call in tail position to compile to a
/// frame-reusing tail call. Forms propagate it only to their own tail
/// position; function arguments always compile with empty options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// This emission is the tail of a function body.
    pub returning: bool,
}

impl EmitOptions {
    /// Options with the `returning` flag set.
    #[must_use]
    pub const fn returning() -> Self {
        Self { returning: true }
    }
}

impl Form {
    /// Returns where this form appeared in the source.
    #[must_use]
    pub const fn position(&self) -> &Position {
        match self {
            Self::Identifier { position, .. }
            | Self::List { position, .. }
            | Self::Literal { position, .. } => position,
        }
    }

    /// Compiles this form into the VM's code buffer.
    ///
    /// `args` holds the sibling forms that follow this one; emission may
    /// consume from its front (function arguments, macro bodies). An unbound
    /// identifier fails with [`Error::UnknownIdentifier`].
    pub fn emit(
        &self,
        vm: &mut Vm,
        namespace: &NamespaceRef,
        args: &mut VecDeque<Form>,
        options: EmitOptions,
    ) -> Result<()> {
        match self {
            Self::Literal { value, .. } => {
                vm.emit(Op::Push(value.clone()));
                Ok(())
            }
            Self::List { items, .. } => emit_forms(vm, namespace, items.clone(), options),
            Self::Identifier { name, position } => {
                let Some(value) = namespace.lookup(name) else {
                    return Err(Error::UnknownIdentifier(position.clone(), name.clone()));
                };
                let ty = value.ty().clone();
                ty.emit_value(&value, vm, position, namespace, args, options)
            }
        }
    }
}

/// Sequence emission: compiles forms front to back.
///
/// Each form is popped off the front and emitted with access to the
/// remaining tail, so a form may consume its siblings. The loop ends when
/// the sequence is empty.
pub fn emit_forms(
    vm: &mut Vm,
    namespace: &NamespaceRef,
    forms: Vec<Form>,
    options: EmitOptions,
) -> Result<()> {
    let mut queue: VecDeque<Form> = forms.into();
    while let Some(form) = queue.pop_front() {
        form.emit(vm, namespace, &mut queue, options)?;
    }
    Ok(())
}
