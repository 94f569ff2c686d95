//! The emission protocol: what opcodes forms compile to.

use waxwing_language::{EmitOptions, Op, Types, Vm, emit_forms, read, standard_namespace};

fn emit(source: &str) -> Vm {
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let forms = read("test", source, &types).unwrap();
    let mut vm = Vm::new(types);
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm
}

fn emit_err(source: &str) -> waxwing_foundation::Error {
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let forms = read("test", source, &types).unwrap();
    let mut vm = Vm::new(types);
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap_err()
}

#[test]
fn calls_compile_arguments_then_call() {
    let vm = emit("(+ 1 2)");
    let code = vm.code();
    assert_eq!(code.len(), 3);
    assert!(matches!(&code[0], Op::Push(v) if v.as_int() == Some(1)));
    assert!(matches!(&code[1], Op::Push(v) if v.as_int() == Some(2)));
    assert!(matches!(&code[2], Op::Call(_, f) if f.name() == "+"));
}

#[test]
fn call_position_never_compiles_tail_calls() {
    // Arguments compile with empty options even under `return`:
    // only the outermost call of the returned expression is a tail call.
    let vm = emit(
        "(function f (n) (+ n 1))
         (function g (n) (return (f (f n))))",
    );
    let tail_calls = vm
        .code()
        .iter()
        .filter(|op| matches!(op, Op::TailCall(..)))
        .count();
    assert_eq!(tail_calls, 1);
}

#[test]
fn return_of_a_primitive_compiles_to_a_plain_call() {
    // Primitives have no bytecode to jump to.
    let vm = emit("(function f (n) (return (+ n 1)))");
    assert!(!vm.code().iter().any(|op| matches!(op, Op::TailCall(..))));
    assert!(
        vm.code()
            .iter()
            .any(|op| matches!(op, Op::Call(_, f) if f.name() == "+"))
    );
}

#[test]
fn function_bodies_are_skipped_by_a_goto() {
    let vm = emit("(function id (x) x)");
    let code = vm.code();
    // Reserved slot patched to jump past the body.
    assert!(matches!(code[0], Op::Goto(target) if target == code.len()));
    assert!(matches!(code[1], Op::Argument(0)));
    assert!(matches!(&code[2], Op::PopCall(f) if f.name() == "id"));
}

#[test]
fn parameters_compile_to_argument_slots() {
    let vm = emit("(function second (a b) b)");
    assert!(
        vm.code()
            .iter()
            .any(|op| matches!(op, Op::Argument(1)))
    );
}

#[test]
fn if_compiles_branch_and_skip() {
    let vm = emit("(if true 1 else 2)");
    let code = vm.code();
    // push true, branch, push 1, goto end, push 2
    assert!(matches!(code[1], Op::Branch(_, else_pc) if else_pc == 4));
    assert!(matches!(code[3], Op::Goto(target) if target == 5));
}

#[test]
fn if_without_else_branches_past_the_then() {
    let vm = emit("(if true 1)");
    let code = vm.code();
    assert!(matches!(code[1], Op::Branch(_, else_pc) if else_pc == 3));
}

#[test]
fn or_compiles_a_peek_jump() {
    let vm = emit("(or 0 1)");
    let code = vm.code();
    assert!(matches!(code[1], Op::Or(_, end_pc) if end_pc == 3));
}

#[test]
fn task_compiles_fork_and_stop() {
    let vm = emit("(task (yield))");
    let code = vm.code();
    assert!(matches!(code[0], Op::Task(end_pc) if end_pc == 3));
    assert!(matches!(&code[1], Op::Call(_, f) if f.name() == "yield"));
    assert!(matches!(code[2], Op::Stop));
}

#[test]
fn benchmark_compiles_count_op_body_stop() {
    let vm = emit("(benchmark 10 (+ 1 2))");
    let code = vm.code();
    assert!(matches!(&code[0], Op::Push(v) if v.as_int() == Some(10)));
    assert!(matches!(code[1], Op::Benchmark(_)));
    assert!(matches!(code[code.len() - 1], Op::Stop));
}

#[test]
fn unknown_parameter_fails_at_emit_time() {
    // The body references a parameter that was never declared; this fails
    // during emission, not evaluation.
    let err = emit_err("(function f (a) (+ a missing))");
    assert!(matches!(
        err,
        waxwing_foundation::Error::UnknownIdentifier(_, name) if name == "missing"
    ));
}

#[test]
fn function_shortage_reports_missing_argument() {
    let err = emit_err("(function f (a b) (+ a b)) (f 1)");
    assert!(matches!(err, waxwing_foundation::Error::MissingArgument(_)));
}

#[test]
fn macro_shortage_reports_missing_argument() {
    assert!(matches!(
        emit_err("(if true)"),
        waxwing_foundation::Error::MissingArgument(_)
    ));
    assert!(matches!(
        emit_err("(function f)"),
        waxwing_foundation::Error::MissingArgument(_)
    ));
}

#[test]
fn emitted_code_survives_a_failing_emission() {
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let mut vm = Vm::new(types.clone());

    let forms = read("test", "(+ 1 2) (ghost)", &types).unwrap();
    assert!(emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).is_err());
    let emitted = vm.code().len();
    assert!(emitted >= 3);

    // A later emission appends after the orphaned prefix and runs fine.
    let forms = read("test", "(- 9 4)", &types).unwrap();
    let from_pc = vm.emit_pc();
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm.eval(from_pc).unwrap();
    assert_eq!(vm.pop_result().and_then(|v| v.as_int()), Some(5));
}
