//! Core value type for all Waxwing data.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::function::{Function, Macro};
use crate::types::TypeRef;

/// A runtime value: a type descriptor plus a payload.
///
/// Values are immutable once constructed and cheap to clone; all mutation
/// happens by replacement on stacks and in namespaces. Behavior that varies
/// by type (identifier emission, truthiness, display) lives on the type
/// descriptor, not here.
#[derive(Clone)]
pub struct Value {
    ty: TypeRef,
    payload: Payload,
}

/// The payload shapes a value can carry.
#[derive(Clone)]
pub enum Payload {
    /// 64-bit signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Immutable string.
    String(Rc<str>),
    /// Measured duration, produced by `benchmark`.
    Time(Duration),
    /// Function descriptor (primitive or user-defined).
    Function(Rc<Function>),
    /// Macro descriptor, run at emit time.
    Macro(Rc<Macro>),
    /// Type descriptor; makes types first-class.
    Type(TypeRef),
    /// Parameter index inside a function body.
    Argument(usize),
}

impl Value {
    /// Creates a value from a type descriptor and a payload.
    ///
    /// Prefer the constructors on [`crate::types::Types`], which pair each
    /// payload with its builtin descriptor.
    #[must_use]
    pub const fn new(ty: TypeRef, payload: Payload) -> Self {
        Self { ty, payload }
    }

    /// Returns this value's type descriptor.
    #[must_use]
    pub const fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Returns this value's payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns true if this value is truthy, per its type descriptor.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        self.ty.is_truthy(self)
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match &self.payload {
            Payload::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match &self.payload {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a duration.
    #[must_use]
    pub const fn as_time(&self) -> Option<Duration> {
        match &self.payload {
            Payload::Time(d) => Some(*d),
            _ => None,
        }
    }

    /// Attempts to extract a function descriptor.
    #[must_use]
    pub const fn as_function(&self) -> Option<&Rc<Function>> {
        match &self.payload {
            Payload::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Attempts to extract a macro descriptor.
    #[must_use]
    pub const fn as_macro(&self) -> Option<&Rc<Macro>> {
        match &self.payload {
            Payload::Macro(m) => Some(m),
            _ => None,
        }
    }

    /// Attempts to extract a type descriptor.
    #[must_use]
    pub const fn as_type(&self) -> Option<&TypeRef> {
        match &self.payload {
            Payload::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Attempts to extract an argument index.
    #[must_use]
    pub const fn as_argument(&self) -> Option<usize> {
        match &self.payload {
            Payload::Argument(i) => Some(*i),
            _ => None,
        }
    }
}

// Descriptor payloads compare by identity; data payloads by content.
impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Macro(a), Self::Macro(b)) => Rc::ptr_eq(a, b),
            (Self::Type(a), Self::Type(b)) => Rc::ptr_eq(a, b),
            (Self::Argument(a), Self::Argument(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ty, &other.ty) && self.payload == other.payload
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ty.fmt_value(self, f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", self.ty.name())
    }
}
