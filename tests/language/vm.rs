//! Evaluation semantics: calls, tail calls, branches, benchmarks.

use std::cell::Cell;
use std::rc::Rc;

use waxwing_foundation::{Error, Family, Position, Result};
use waxwing_language::vm::eval;
use waxwing_language::{
    EmitOptions, Function, Op, Types, Vm, emit_forms, read, standard_namespace,
};

fn eval_int(source: &str) -> i64 {
    eval(source).unwrap().unwrap().as_int().unwrap()
}

#[test]
fn arithmetic_and_comparison() {
    assert_eq!(eval_int("(+ 1 2)"), 3);
    assert_eq!(eval_int("(- 2 5)"), -3);
    assert_eq!(eval("(= 2 5)").unwrap().unwrap().as_bool(), Some(false));
}

#[test]
fn factorial_by_repeated_addition() {
    // Multiplication is not a builtin; build it from + and tail recursion.
    let source = "
        (function mul (a b acc)
          (if (< b 1) acc else (return (mul a (- b 1) (+ acc a)))))
        (function fact (n acc)
          (if (< n 2) acc else (return (fact (- n 1) (mul acc n 0)))))
        (fact 5 1)
    ";
    assert_eq!(eval_int(source), 120);
}

#[test]
fn tail_recursion_keeps_the_call_chain_flat() {
    thread_local! {
        static MAX_DEPTH: Cell<usize> = const { Cell::new(0) };
    }

    fn probe(vm: &mut Vm, position: &Position) -> Result<()> {
        let value = vm.pop(position)?;
        MAX_DEPTH.with(|depth| depth.set(depth.get().max(vm.call_depth())));
        vm.push(value);
        Ok(())
    }

    let types = Types::new();
    let namespace = standard_namespace(&types);
    let probe_fn = Rc::new(Function::primitive("probe", &["x"], probe));
    namespace.bind("probe", types.function(probe_fn));

    // Every iteration passes its condition through the probe, recording the
    // call-chain depth at that point.
    let source = "
        (function mul (a b acc)
          (if (probe (< b 1)) acc else (return (mul a (- b 1) (+ acc a)))))
        (function fact (n acc)
          (if (probe (< n 2)) acc else (return (fact (- n 1) (mul acc n 0)))))
        (fact 6 1)
    ";
    let forms = read("test", source, &types).unwrap();
    let mut vm = Vm::new(types);
    let from_pc = vm.emit_pc();
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm.eval(from_pc).unwrap();

    assert_eq!(vm.pop_result().and_then(|v| v.as_int()), Some(720));
    // fact's frame plus at most one mul frame; tail calls reuse frames.
    MAX_DEPTH.with(|depth| assert!(depth.get() <= 2, "depth was {}", depth.get()));
}

#[test]
fn deep_tail_recursion_terminates() {
    let source = "
        (function count-down (n)
          (if (< n 1) 0 else (return (count-down (- n 1)))))
        (count-down 10000)
    ";
    assert_eq!(eval_int(source), 0);
}

#[test]
fn or_equals_if_over_int_pairs() {
    // (or a b) has the effect of (if a a else b) on the stack, except that
    // the tested expression evaluates once.
    for a in [-2i64, 0, 1] {
        for b in [0i64, 7] {
            let with_or = eval(&format!("(or {a} {b})")).unwrap().unwrap();
            let with_if = eval(&format!("(if {a} {a} else {b})")).unwrap().unwrap();
            assert_eq!(with_or.as_int(), with_if.as_int(), "a={a} b={b}");
        }
    }
}

#[test]
fn or_evaluates_the_first_operand_once() {
    thread_local! {
        static CALLS: Cell<usize> = const { Cell::new(0) };
    }

    fn counting_seven(vm: &mut Vm, _position: &Position) -> Result<()> {
        CALLS.with(|calls| calls.set(calls.get() + 1));
        let value = vm.types().int(7);
        vm.push(value);
        Ok(())
    }

    let types = Types::new();
    let namespace = standard_namespace(&types);
    let seven = Rc::new(Function::primitive("seven", &[], counting_seven));
    namespace.bind("seven", types.function(seven));

    let forms = read("test", "(or (seven) 42)", &types).unwrap();
    let mut vm = Vm::new(types);
    let from_pc = vm.emit_pc();
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm.eval(from_pc).unwrap();

    assert_eq!(vm.pop_result().and_then(|v| v.as_int()), Some(7));
    CALLS.with(|calls| assert_eq!(calls.get(), 1));
}

#[test]
fn calling_with_too_few_values_is_an_eval_error() {
    // Emission catches form shortage; stack shortage is a runtime fault.
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let mut vm = Vm::new(types.clone());
    let plus = namespace.lookup("+").unwrap();
    let plus = Rc::clone(plus.as_function().unwrap());
    let one = types.int(1);
    vm.emit(Op::Push(one));
    vm.emit(Op::Call(Position::start("test"), plus));
    vm.emit(Op::Stop);
    let err = vm.eval(0).unwrap_err();
    assert_eq!(err.family(), Family::Eval);
    assert!(matches!(err, Error::MissingValue(_)));
}

#[test]
fn benchmark_times_the_body() {
    let result = eval("(benchmark 1000 (+ 1 2))").unwrap().unwrap();
    let duration = result.as_time().unwrap();
    // A thousand evaluations take a measurable, nonzero duration, which
    // also makes the Time value truthy.
    assert!(!duration.is_zero());
    assert!(result.is_truthy());
}

#[test]
fn benchmark_leaves_iteration_results_off_the_stack() {
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let forms = read("test", "(benchmark 10 (+ 1 2))", &types).unwrap();
    let mut vm = Vm::new(types);
    let from_pc = vm.emit_pc();
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm.eval(from_pc).unwrap();
    assert_eq!(vm.task().stack().len(), 1);
    assert!(vm.pop_result().unwrap().as_time().is_some());
}

#[test]
fn reemission_is_deterministic() {
    // Emitting the same form over a fresh VM yields the same result.
    let source = "(function inc (n) (+ n 1)) (inc (inc 40))";
    assert_eq!(eval_int(source), 42);
    assert_eq!(eval_int(source), 42);
}

#[test]
fn string_literals_evaluate_to_themselves() {
    let result = eval("\"hello\"").unwrap().unwrap();
    assert_eq!(result.as_str(), Some("hello"));
    assert!(result.is_truthy());
}
