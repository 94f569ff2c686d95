//! The standard namespace.
//!
//! Installs the builtin types, the `true`/`false` constants, the integer
//! primitives, `yield`, and the emit-time macros. Every macro compiles a
//! fixed opcode pattern, reserving `Nop` slots for forward jumps and
//! patching them once the target is known.

#![allow(clippy::unnecessary_wraps)]

use std::collections::VecDeque;
use std::rc::Rc;

use waxwing_foundation::{Error, Position, Result};

use crate::form::{EmitOptions, Form};
use crate::function::{Function, Macro, MacroFn, PrimitiveFn};
use crate::namespace::{Namespace, NamespaceRef};
use crate::opcode::Op;
use crate::types::Types;
use crate::vm::Vm;

/// Builds the root namespace with the standard bindings.
#[must_use]
pub fn standard_namespace(types: &Types) -> NamespaceRef {
    let namespace = Namespace::root();

    // Types are first-class values of type Meta.
    namespace.bind("Meta", types.type_value(types.meta_type()));
    namespace.bind("Bool", types.type_value(types.bool_type()));
    namespace.bind("Int", types.type_value(types.int_type()));
    namespace.bind("String", types.type_value(types.string_type()));
    namespace.bind("Time", types.type_value(types.time_type()));
    namespace.bind("Function", types.type_value(types.function_type()));
    namespace.bind("Macro", types.type_value(types.macro_type()));

    namespace.bind("true", types.bool(true));
    namespace.bind("false", types.bool(false));

    bind_primitive(&namespace, types, "=", &["a", "b"], primitive_eq);
    bind_primitive(&namespace, types, "<", &["a", "b"], primitive_lt);
    bind_primitive(&namespace, types, ">", &["a", "b"], primitive_gt);
    bind_primitive(&namespace, types, "+", &["a", "b"], primitive_add);
    bind_primitive(&namespace, types, "-", &["a", "b"], primitive_sub);
    bind_primitive(&namespace, types, "yield", &[], primitive_yield);

    bind_macro(&namespace, types, "function", macro_function);
    bind_macro(&namespace, types, "return", macro_return);
    bind_macro(&namespace, types, "if", macro_if);
    bind_macro(&namespace, types, "or", macro_or);
    bind_macro(&namespace, types, "task", macro_task);
    bind_macro(&namespace, types, "benchmark", macro_benchmark);
    bind_macro(&namespace, types, "trace", macro_trace);

    namespace
}

fn bind_primitive(
    namespace: &NamespaceRef,
    types: &Types,
    name: &str,
    parameters: &[&str],
    body: PrimitiveFn,
) {
    let function = Rc::new(Function::primitive(name, parameters, body));
    namespace.bind(name, types.function(function));
}

fn bind_macro(namespace: &NamespaceRef, types: &Types, name: &str, body: MacroFn) {
    let descriptor = Rc::new(Macro::new(name, body));
    namespace.bind(name, types.macro_value(descriptor));
}

// =============================================================================
// Primitives
// =============================================================================

fn pop_ints(vm: &mut Vm, position: &Position, name: &str) -> Result<(i64, i64)> {
    let b = vm.pop(position)?;
    let a = vm.pop(position)?;
    match (a.as_int(), b.as_int()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(Error::internal(format!("{name} expects Int arguments"))),
    }
}

fn primitive_eq(vm: &mut Vm, position: &Position) -> Result<()> {
    let (a, b) = pop_ints(vm, position, "=")?;
    let value = vm.types().bool(a == b);
    vm.push(value);
    Ok(())
}

fn primitive_lt(vm: &mut Vm, position: &Position) -> Result<()> {
    let (a, b) = pop_ints(vm, position, "<")?;
    let value = vm.types().bool(a < b);
    vm.push(value);
    Ok(())
}

fn primitive_gt(vm: &mut Vm, position: &Position) -> Result<()> {
    let (a, b) = pop_ints(vm, position, ">")?;
    let value = vm.types().bool(a > b);
    vm.push(value);
    Ok(())
}

fn primitive_add(vm: &mut Vm, position: &Position) -> Result<()> {
    let (a, b) = pop_ints(vm, position, "+")?;
    let value = vm.types().int(a + b);
    vm.push(value);
    Ok(())
}

fn primitive_sub(vm: &mut Vm, position: &Position) -> Result<()> {
    let (a, b) = pop_ints(vm, position, "-")?;
    let value = vm.types().int(a - b);
    vm.push(value);
    Ok(())
}

/// Rotates the task queue; the next task in FIFO order resumes.
fn primitive_yield(vm: &mut Vm, _position: &Position) -> Result<()> {
    vm.rotate_tasks();
    Ok(())
}

// =============================================================================
// Macros
// =============================================================================

fn pull(args: &mut VecDeque<Form>, position: &Position) -> Result<Form> {
    args.pop_front()
        .ok_or_else(|| Error::MissingArgument(position.clone()))
}

/// `(function name (p1 p2 ...) body)`
///
/// Reserves a skip slot so straight-line execution jumps over the body,
/// binds the name in the defining namespace before the body compiles (so
/// recursion resolves), and compiles the body in a child namespace where
/// each parameter is an argument-slot value. The body compiles with empty
/// options: tail calls require an explicit `return`.
fn macro_function(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let Form::Identifier { name, .. } = pull(args, position)? else {
        return Err(Error::MissingArgument(position.clone()));
    };
    let Form::List { items, .. } = pull(args, position)? else {
        return Err(Error::MissingArgument(position.clone()));
    };
    let mut parameters = Vec::with_capacity(items.len());
    for item in items {
        let Form::Identifier { name, .. } = item else {
            return Err(Error::MissingArgument(position.clone()));
        };
        parameters.push(name);
    }
    let body = pull(args, position)?;

    let skip_pc = vm.emit(Op::Nop);
    let start_pc = vm.emit_pc();
    let function = Rc::new(Function::user(name.clone(), parameters.clone(), start_pc));
    let value = vm.types().function(Rc::clone(&function));
    namespace.bind(name, value);

    let child = Namespace::child(namespace);
    for (index, parameter) in parameters.iter().enumerate() {
        let slot = vm.types().argument(index);
        child.bind(parameter.clone(), slot);
    }
    let mut rest = VecDeque::new();
    body.emit(vm, &child, &mut rest, EmitOptions::default())?;
    vm.emit(Op::PopCall(function));

    let end_pc = vm.emit_pc();
    vm.patch(skip_pc, Op::Goto(end_pc));
    Ok(())
}

/// `(return expr)` - compiles `expr` with the `returning` option set. The
/// only route by which tail calls are produced. Outside a function body the
/// resulting tail call degrades to a plain call at run time.
fn macro_return(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let expr = pull(args, position)?;
    expr.emit(vm, namespace, args, EmitOptions::returning())
}

/// `(if cond then)` or `(if cond then else alt)`
fn macro_if(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let cond = pull(args, position)?;
    cond.emit(vm, namespace, args, EmitOptions::default())?;
    let if_pc = vm.emit(Op::Nop);

    let then = pull(args, position)?;
    then.emit(vm, namespace, args, EmitOptions::default())?;

    let has_else = matches!(args.front(), Some(Form::Identifier { name, .. }) if name == "else");
    let else_pc = if has_else {
        args.pop_front();
        let skip_pc = vm.emit(Op::Nop);
        let else_pc = vm.emit_pc();
        let alt = pull(args, position)?;
        alt.emit(vm, namespace, args, EmitOptions::default())?;
        let end_pc = vm.emit_pc();
        vm.patch(skip_pc, Op::Goto(end_pc));
        else_pc
    } else {
        vm.emit_pc()
    };
    vm.patch(if_pc, Op::Branch(position.clone(), else_pc));
    Ok(())
}

/// `(or a b)` - `a` evaluates exactly once; when truthy it is the result
/// and `b` never runs.
fn macro_or(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let first = pull(args, position)?;
    first.emit(vm, namespace, args, EmitOptions::default())?;
    let or_pc = vm.emit(Op::Nop);
    let second = pull(args, position)?;
    second.emit(vm, namespace, args, EmitOptions::default())?;
    let end_pc = vm.emit_pc();
    vm.patch(or_pc, Op::Or(position.clone(), end_pc));
    Ok(())
}

/// `(task body)` - at run time the task opcode forks: the new task starts
/// on the body, the current task jumps past it.
fn macro_task(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let task_pc = vm.emit(Op::Nop);
    let body = pull(args, position)?;
    body.emit(vm, namespace, args, EmitOptions::default())?;
    vm.emit(Op::Stop);
    let end_pc = vm.emit_pc();
    vm.patch(task_pc, Op::Task(end_pc));
    Ok(())
}

/// `(benchmark count body)`
fn macro_benchmark(
    vm: &mut Vm,
    position: &Position,
    namespace: &NamespaceRef,
    args: &mut VecDeque<Form>,
) -> Result<()> {
    let count = pull(args, position)?;
    count.emit(vm, namespace, args, EmitOptions::default())?;
    vm.emit(Op::Benchmark(position.clone()));
    let body = pull(args, position)?;
    body.emit(vm, namespace, args, EmitOptions::default())?;
    vm.emit(Op::Stop);
    Ok(())
}

/// `(trace)` - toggles the VM's trace flag at emit time; subsequent
/// emissions interleave trace opcodes.
fn macro_trace(
    vm: &mut Vm,
    _position: &Position,
    _namespace: &NamespaceRef,
    _args: &mut VecDeque<Form>,
) -> Result<()> {
    let trace = !vm.trace_enabled();
    vm.set_trace(trace);
    Ok(())
}
