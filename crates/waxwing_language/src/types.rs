//! Open type descriptors and the builtin type registry.
//!
//! A [`Type`] is a named record of three behaviors: how an identifier bound
//! to a value of the type compiles (`emit`), how the value converts to a
//! boolean, and how it displays. The record-of-function-pointers shape keeps
//! the set of types open: defining a new type is constructing a new record,
//! no dispatch site needs to change.
//!
//! The identifier-emission behavior is the extensibility story of the whole
//! compiler: a function value, a macro value, and an argument-slot value all
//! produce different code when their name appears in source, and the
//! decision is made here rather than in the form walker.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use waxwing_foundation::{Error, Position, Result};

use crate::form::{EmitOptions, Form};
use crate::function::{Function, Macro};
use crate::namespace::NamespaceRef;
use crate::opcode::Op;
use crate::value::{Payload, Value};
use crate::vm::Vm;

/// Compiles an identifier bound to a value of this type.
///
/// `args` holds the sibling forms following the identifier; the behavior may
/// pull forms off the front (this is how function arguments and macro bodies
/// are collected).
pub type EmitFn =
    fn(&Value, &mut Vm, &Position, &NamespaceRef, &mut VecDeque<Form>, EmitOptions) -> Result<()>;

/// Converts a value of this type to a boolean.
pub type TruthyFn = fn(&Value) -> bool;

/// Formats a value of this type for display.
pub type DisplayFn = fn(&Value, &mut fmt::Formatter<'_>) -> fmt::Result;

/// A shared type descriptor.
pub type TypeRef = Rc<Type>;

/// A named type descriptor: identifier emission, truthiness, display.
pub struct Type {
    name: &'static str,
    emit: EmitFn,
    truthy: TruthyFn,
    display: DisplayFn,
}

impl Type {
    /// Creates a descriptor with default behaviors: identifiers compile to a
    /// push of the bound value, every value is truthy, and display shows the
    /// type name.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            emit: emit_push,
            truthy: |_| true,
            display: display_name,
        }
    }

    /// Replaces the identifier-emission behavior.
    #[must_use]
    pub fn with_emit(mut self, emit: EmitFn) -> Self {
        self.emit = emit;
        self
    }

    /// Replaces the truthiness behavior.
    #[must_use]
    pub fn with_truthy(mut self, truthy: TruthyFn) -> Self {
        self.truthy = truthy;
        self
    }

    /// Replaces the display behavior.
    #[must_use]
    pub fn with_display(mut self, display: DisplayFn) -> Self {
        self.display = display;
        self
    }

    /// Returns the type's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Compiles an identifier bound to `value`.
    pub fn emit_value(
        &self,
        value: &Value,
        vm: &mut Vm,
        position: &Position,
        namespace: &NamespaceRef,
        args: &mut VecDeque<Form>,
        options: EmitOptions,
    ) -> Result<()> {
        (self.emit)(value, vm, position, namespace, args, options)
    }

    /// Returns true if `value` is truthy under this type.
    #[must_use]
    pub fn is_truthy(&self, value: &Value) -> bool {
        (self.truthy)(value)
    }

    /// Formats `value` under this type.
    pub fn fmt_value(&self, value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.display)(value, f)
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name)
    }
}

// =============================================================================
// Builtin registry
// =============================================================================

/// The builtin type descriptors, constructed once at startup.
///
/// All descriptors are shared (`Rc`), so the registry is cheap to clone; the
/// VM and the standard namespace hold the same descriptors.
#[derive(Clone)]
pub struct Types {
    meta: TypeRef,
    boolean: TypeRef,
    integer: TypeRef,
    string: TypeRef,
    time: TypeRef,
    function: TypeRef,
    macro_def: TypeRef,
    argument: TypeRef,
}

impl Types {
    /// Builds the builtin descriptors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: Rc::new(Type::new("Meta").with_display(display_meta)),
            boolean: Rc::new(
                Type::new("Bool")
                    .with_truthy(truthy_bool)
                    .with_display(display_bool),
            ),
            integer: Rc::new(
                Type::new("Int")
                    .with_truthy(truthy_int)
                    .with_display(display_int),
            ),
            string: Rc::new(Type::new("String").with_display(display_string)),
            time: Rc::new(
                Type::new("Time")
                    .with_truthy(truthy_time)
                    .with_display(display_time),
            ),
            function: Rc::new(
                Type::new("Function")
                    .with_emit(emit_function)
                    .with_display(display_function),
            ),
            macro_def: Rc::new(
                Type::new("Macro")
                    .with_emit(emit_macro)
                    .with_display(display_macro),
            ),
            argument: Rc::new(
                Type::new("Argument")
                    .with_emit(emit_argument)
                    .with_display(display_argument),
            ),
        }
    }

    /// The type of type descriptors.
    #[must_use]
    pub const fn meta_type(&self) -> &TypeRef {
        &self.meta
    }

    /// The boolean type.
    #[must_use]
    pub const fn bool_type(&self) -> &TypeRef {
        &self.boolean
    }

    /// The integer type.
    #[must_use]
    pub const fn int_type(&self) -> &TypeRef {
        &self.integer
    }

    /// The string type.
    #[must_use]
    pub const fn string_type(&self) -> &TypeRef {
        &self.string
    }

    /// The duration type.
    #[must_use]
    pub const fn time_type(&self) -> &TypeRef {
        &self.time
    }

    /// The function type.
    #[must_use]
    pub const fn function_type(&self) -> &TypeRef {
        &self.function
    }

    /// The macro type.
    #[must_use]
    pub const fn macro_type(&self) -> &TypeRef {
        &self.macro_def
    }

    /// The argument-slot type.
    #[must_use]
    pub const fn argument_type(&self) -> &TypeRef {
        &self.argument
    }

    /// Creates an integer value.
    #[must_use]
    pub fn int(&self, value: i64) -> Value {
        Value::new(self.integer.clone(), Payload::Int(value))
    }

    /// Creates a boolean value.
    #[must_use]
    pub fn bool(&self, value: bool) -> Value {
        Value::new(self.boolean.clone(), Payload::Bool(value))
    }

    /// Creates a string value.
    #[must_use]
    pub fn string(&self, value: impl Into<Rc<str>>) -> Value {
        Value::new(self.string.clone(), Payload::String(value.into()))
    }

    /// Creates a duration value.
    #[must_use]
    pub fn time(&self, value: Duration) -> Value {
        Value::new(self.time.clone(), Payload::Time(value))
    }

    /// Creates a function value.
    #[must_use]
    pub fn function(&self, descriptor: Rc<Function>) -> Value {
        Value::new(self.function.clone(), Payload::Function(descriptor))
    }

    /// Creates a macro value.
    #[must_use]
    pub fn macro_value(&self, descriptor: Rc<Macro>) -> Value {
        Value::new(self.macro_def.clone(), Payload::Macro(descriptor))
    }

    /// Creates an argument-slot value for parameter `index`.
    #[must_use]
    pub fn argument(&self, index: usize) -> Value {
        Value::new(self.argument.clone(), Payload::Argument(index))
    }

    /// Creates a first-class value wrapping a type descriptor.
    #[must_use]
    pub fn type_value(&self, ty: &TypeRef) -> Value {
        Value::new(self.meta.clone(), Payload::Type(ty.clone()))
    }
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Emission behaviors
// =============================================================================

/// Default: the identifier compiles to a push of the bound value.
fn emit_push(
    value: &Value,
    vm: &mut Vm,
    _position: &Position,
    _namespace: &NamespaceRef,
    _args: &mut VecDeque<Form>,
    _options: EmitOptions,
) -> Result<()> {
    vm.emit(Op::Push(value.clone()));
    Ok(())
}

/// Function: pull one sibling form per declared parameter, compile each in
/// call position, then emit a call. A tail call is emitted only when the
/// `returning` option is set and the function has bytecode to jump to.
fn emit_function(
    value: &Value,
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
    options: EmitOptions,
) -> Result<()> {
    let Some(function) = value.as_function() else {
        return Err(Error::internal("Function-typed value without a descriptor"));
    };
    let function = Rc::clone(function);
    for _ in function.parameters() {
        let form = args
            .pop_front()
            .ok_or_else(|| Error::MissingArgument(position.clone()))?;
        form.emit(vm, namespace, args, EmitOptions::default())?;
    }
    if options.returning && function.start_pc().is_some() {
        vm.emit(Op::TailCall(position.clone(), function));
    } else {
        vm.emit(Op::Call(position.clone(), function));
    }
    Ok(())
}

/// Macro: run the emit-time body over the remaining sibling forms.
fn emit_macro(
    value: &Value,
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
    _options: EmitOptions,
) -> Result<()> {
    let Some(descriptor) = value.as_macro() else {
        return Err(Error::internal("Macro-typed value without a descriptor"));
    };
    Rc::clone(descriptor).expand(vm, position, namespace, args)
}

/// Argument slot: compile to a load of the parameter's stack slot.
fn emit_argument(
    value: &Value,
    vm: &mut Vm,
    _position: &Position,
    _namespace: &NamespaceRef,
    _args: &mut VecDeque<Form>,
    _options: EmitOptions,
) -> Result<()> {
    let Some(index) = value.as_argument() else {
        return Err(Error::internal("Argument-typed value without an index"));
    };
    vm.emit(Op::Argument(index));
    Ok(())
}

// =============================================================================
// Truthiness behaviors
// =============================================================================

fn truthy_bool(value: &Value) -> bool {
    value.as_bool().unwrap_or(false)
}

fn truthy_int(value: &Value) -> bool {
    value.as_int().is_some_and(|n| n != 0)
}

fn truthy_time(value: &Value) -> bool {
    value.as_time().is_some_and(|d| !d.is_zero())
}

// =============================================================================
// Display behaviors
// =============================================================================

fn display_name(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "<{}>", value.ty().name())
}

fn display_meta(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_type() {
        Some(ty) => write!(f, "{}", ty.name()),
        None => display_name(value, f),
    }
}

fn display_bool(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_bool() {
        Some(b) => write!(f, "{b}"),
        None => display_name(value, f),
    }
}

fn display_int(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_int() {
        Some(n) => write!(f, "{n}"),
        None => display_name(value, f),
    }
}

fn display_string(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_str() {
        Some(s) => write!(f, "{s}"),
        None => display_name(value, f),
    }
}

fn display_time(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_time() {
        Some(d) => write!(f, "{d:?}"),
        None => display_name(value, f),
    }
}

fn display_function(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_function() {
        Some(function) => write!(f, "<function {}>", function.name()),
        None => display_name(value, f),
    }
}

fn display_macro(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_macro() {
        Some(descriptor) => write!(f, "<macro {}>", descriptor.name()),
        None => display_name(value, f),
    }
}

fn display_argument(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.as_argument() {
        Some(index) => write!(f, "<argument {index}>"),
        None => display_name(value, f),
    }
}
