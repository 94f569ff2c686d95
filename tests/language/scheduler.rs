//! Cooperative task scheduling.

use waxwing_language::vm::eval;
use waxwing_language::{EmitOptions, Op, Types, Vm, emit_forms, read, standard_namespace};

fn session(source: &str) -> Vm {
    let types = Types::new();
    let namespace = standard_namespace(&types);
    let forms = read("test", source, &types).unwrap();
    let mut vm = Vm::new(types);
    let from_pc = vm.emit_pc();
    emit_forms(&mut vm, &namespace, forms, EmitOptions::default()).unwrap();
    vm.emit(Op::Stop);
    vm.eval(from_pc).unwrap();
    vm
}

#[test]
fn task_forks_and_main_resumes_to_stop() {
    // The child yields once and parks past its body; the main task resumes
    // and runs to its stop with an empty stack.
    let vm = session("(task (yield)) (yield)");
    assert_eq!(vm.task_count(), 2);
    assert_eq!(vm.task().id(), 0);
    assert!(vm.task().stack().is_empty());
}

#[test]
fn parked_child_sits_past_its_body() {
    let mut vm = session("(task (yield)) (yield)");
    vm.rotate_tasks();
    let child = vm.task();
    assert_eq!(child.id(), 1);
    // The child's yield returned; its pc rests on the body's stop.
    assert!(matches!(vm.code()[child.pc()], Op::Stop));
}

#[test]
fn tasks_share_code_but_not_stacks() {
    // The child's pushes never land on the main task's stack.
    let result = eval("(task (+ 1 1)) (+ 2 2)").unwrap().unwrap();
    assert_eq!(result.as_int(), Some(4));
}

#[test]
fn yield_without_other_tasks_is_a_no_op() {
    let result = eval("(yield) (+ 1 2)").unwrap().unwrap();
    assert_eq!(result.as_int(), Some(3));
}

#[test]
fn any_task_reaching_stop_ends_the_evaluation() {
    // After the second main-task yield the child resumes on its body's
    // stop, which leaves the evaluation loop; the main task stays parked
    // before its addition, as an inert front-of-queue successor.
    let source = "(task (yield)) (yield) (yield) (+ 10 20)";
    let vm = session(source);
    assert_eq!(vm.task_count(), 2);
    assert_eq!(vm.task().id(), 1);
    assert!(vm.task().stack().is_empty());
}

#[test]
fn single_task_equivalence() {
    // Without task or yield opcodes, adding tasks that stop immediately
    // does not change the main task's result.
    let plain = eval("(+ 3 4)").unwrap().unwrap();
    let with_idle_tasks = eval("(task 0) (task 0) (+ 3 4)").unwrap().unwrap();
    assert_eq!(plain.as_int(), with_idle_tasks.as_int());
}
