//! The stack-based virtual machine and its cooperative task scheduler.
//!
//! The VM owns the append-only code buffer, the task queue, and the trace
//! flag. Emission appends opcodes (macros reserve `Nop` slots and patch them
//! once forward targets are known); evaluation dispatches on the current
//! task's program counter until a `Stop`.
//!
//! # Scheduling
//!
//! Tasks rotate FIFO: `yield` moves the front task to the back and dispatch
//! continues from the new front task's pc, without growing the host call
//! stack. Finished tasks stay in the queue as inert shells; a later
//! top-level [`Vm::eval`] resumes whichever task is at the front, which may
//! be a task from a previous evaluation.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use waxwing_foundation::{Error, Position, Result};

use crate::form::EmitOptions;
use crate::function::{CallFrame, Function};
use crate::opcode::Op;
use crate::task::Task;
use crate::types::Types;
use crate::value::Value;

/// The virtual machine.
pub struct Vm {
    types: Types,
    code: Vec<Op>,
    tasks: VecDeque<Task>,
    next_task_id: usize,
    trace: bool,
}

impl Vm {
    /// Creates a VM with a single main task.
    #[must_use]
    pub fn new(types: Types) -> Self {
        let mut tasks = VecDeque::new();
        tasks.push_back(Task::new(0, 0));
        Self {
            types,
            code: Vec::new(),
            tasks,
            next_task_id: 1,
            trace: false,
        }
    }

    /// Returns the builtin type registry.
    #[must_use]
    pub const fn types(&self) -> &Types {
        &self.types
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Appends an opcode and returns its index.
    ///
    /// While the trace flag is set, every opcode except `Trace` itself is
    /// preceded by a `Trace` opcode, which prints the instruction that
    /// follows it at run time.
    pub fn emit(&mut self, op: Op) -> usize {
        if self.trace && !matches!(op, Op::Trace) {
            self.code.push(Op::Trace);
        }
        let pc = self.code.len();
        self.code.push(op);
        pc
    }

    /// Returns the index the next emitted opcode will get.
    #[must_use]
    pub fn emit_pc(&self) -> usize {
        self.code.len()
    }

    /// Overwrites a reserved `Nop` slot with its final opcode.
    ///
    /// # Panics
    /// Panics if the slot does not hold a `Nop`; only reserved placeholders
    /// may be patched.
    pub fn patch(&mut self, pc: usize, op: Op) {
        assert!(
            matches!(self.code.get(pc), Some(Op::Nop)),
            "patch target {pc} must be a reserved nop"
        );
        self.code[pc] = op;
    }

    /// Returns the emitted code.
    #[must_use]
    pub fn code(&self) -> &[Op] {
        &self.code
    }

    /// Sets the trace flag. Also toggled at emit time by the `trace` macro.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Returns the trace flag.
    #[must_use]
    pub const fn trace_enabled(&self) -> bool {
        self.trace
    }

    // =========================================================================
    // Task and stack access
    // =========================================================================

    /// Returns the current task (the front of the queue).
    ///
    /// # Panics
    /// Does not panic: the VM starts with a main task and tasks are never
    /// removed, only rotated.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn task(&self) -> &Task {
        self.tasks.front().expect("the task queue is never empty")
    }

    fn task_mut(&mut self) -> &mut Task {
        self.tasks
            .front_mut()
            .expect("the task queue is never empty")
    }

    /// Returns the number of tasks, finished shells included.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Rotates the task queue: the current task moves to the back.
    pub fn rotate_tasks(&mut self) {
        self.tasks.rotate_left(1);
    }

    fn spawn_task(&mut self, pc: usize) {
        let id = self.next_task_id;
        self.next_task_id += 1;
        self.tasks.push_back(Task::new(id, pc));
    }

    /// Returns the current task's program counter.
    #[must_use]
    pub fn pc(&self) -> usize {
        self.task().pc
    }

    /// Sets the current task's program counter.
    pub fn jump(&mut self, pc: usize) {
        self.task_mut().pc = pc;
    }

    /// Pushes a value onto the current task's stack.
    pub fn push(&mut self, value: Value) {
        self.task_mut().stack.push(value);
    }

    /// Pops a value, failing with [`Error::MissingValue`] on an empty stack.
    pub fn pop(&mut self, position: &Position) -> Result<Value> {
        self.task_mut()
            .stack
            .pop()
            .ok_or_else(|| Error::MissingValue(position.clone()))
    }

    /// Peeks at the top of the current task's stack.
    pub fn peek(&self, position: &Position) -> Result<&Value> {
        self.task()
            .stack
            .last()
            .ok_or_else(|| Error::MissingValue(position.clone()))
    }

    /// Returns the current task's stack depth.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.task().stack.len()
    }

    /// Pops the top of the current task's stack, if any. Used by drivers to
    /// collect the result of an evaluation.
    pub fn pop_result(&mut self) -> Option<Value> {
        self.task_mut().stack.pop()
    }

    /// Returns the current task's call-chain depth.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.task().calls.len()
    }

    /// Installs a call frame on the current task.
    pub fn push_frame(&mut self, frame: CallFrame) {
        self.task_mut().calls.push(frame);
    }

    /// Reads argument `index` of the current call.
    pub fn argument(&self, index: usize) -> Result<Value> {
        let task = self.task();
        let Some(frame) = task.calls.last() else {
            return Err(Error::internal("argument reference outside a call"));
        };
        task.stack
            .get(frame.stack_offset + index)
            .cloned()
            .ok_or_else(|| Error::internal(format!("argument {index} out of range")))
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Runs the current task from `from_pc` until a `Stop`.
    ///
    /// A `yield` rotates the task queue and dispatch continues from the new
    /// front task. A program counter outside the code buffer is fatal; every
    /// emitted task body ends in an explicit `Stop`.
    pub fn eval(&mut self, from_pc: usize) -> Result<()> {
        self.task_mut().pc = from_pc;
        loop {
            let pc = self.task().pc;
            let op = self
                .code
                .get(pc)
                .cloned()
                .ok_or_else(|| Error::internal(format!("program counter {pc} out of range")))?;
            self.task_mut().pc = pc + 1;
            match op {
                Op::Nop => {}
                Op::Push(value) => self.push(value),
                Op::Argument(index) => {
                    let value = self.argument(index)?;
                    self.push(value);
                }
                Op::Branch(position, else_pc) => {
                    let value = self.pop(&position)?;
                    if !value.is_truthy() {
                        self.task_mut().pc = else_pc;
                    }
                }
                Op::Or(position, end_pc) => {
                    if self.peek(&position)?.is_truthy() {
                        self.task_mut().pc = end_pc;
                    } else {
                        self.pop(&position)?;
                    }
                }
                Op::Goto(target) => self.task_mut().pc = target,
                Op::Call(position, function) => function.call(self, &position)?,
                Op::TailCall(position, function) => self.tail_call(&position, &function)?,
                Op::PopCall(function) => self.pop_call(&function)?,
                Op::Task(end_pc) => {
                    let start_pc = self.task().pc;
                    self.spawn_task(start_pc);
                    self.task_mut().pc = end_pc;
                }
                Op::Benchmark(position) => self.benchmark(&position)?,
                Op::Trace => {
                    let next = self.task().pc;
                    if let Some(op) = self.code.get(next) {
                        eprintln!("{next:>4}  {op}");
                    }
                }
                Op::Stop => break,
            }
        }
        Ok(())
    }

    /// Invokes `function` reusing the current frame when possible.
    ///
    /// Without a current frame, or when the current frame belongs to a
    /// primitive, this degrades to plain call semantics. Otherwise the frame
    /// is overwritten in place, which keeps the call chain flat across
    /// self- and mutually-tail-recursive functions.
    fn tail_call(&mut self, position: &Position, function: &Rc<Function>) -> Result<()> {
        let Some(start_pc) = function.start_pc() else {
            return function.call(self, position);
        };
        let reusable = self
            .task()
            .calls
            .last()
            .is_some_and(|frame| frame.target.start_pc().is_some());
        if !reusable {
            return function.call(self, position);
        }
        let arity = function.parameters().len();
        if self.stack_len() < arity {
            return Err(Error::MissingValue(position.clone()));
        }
        let stack_offset = self.stack_len() - arity;
        let task = self.task_mut();
        if let Some(frame) = task.calls.last_mut() {
            frame.target = Rc::clone(function);
            frame.position = position.clone();
            frame.stack_offset = stack_offset;
        }
        task.pc = start_pc;
        Ok(())
    }

    /// Leaves the current call: restores the parent frame, removes the
    /// argument slots (keeping any return values pushed above them), and
    /// resumes at the saved return pc.
    fn pop_call(&mut self, function: &Rc<Function>) -> Result<()> {
        let task = self.task_mut();
        let Some(frame) = task.calls.pop() else {
            return Err(Error::internal(format!(
                "pop-call for {} without an active frame",
                function.name()
            )));
        };
        let arity = frame.target.parameters().len();
        task.stack
            .drain(frame.stack_offset..frame.stack_offset + arity);
        task.pc = frame.return_pc;
        Ok(())
    }

    /// Runs the body following the benchmark opcode `count` times via nested
    /// evaluation, truncating the stack between iterations, then pushes the
    /// elapsed time. With a count of zero no nested evaluation happens and
    /// execution falls through into the body once.
    fn benchmark(&mut self, position: &Position) -> Result<()> {
        let count = self.pop(position)?;
        let Some(count) = count.as_int() else {
            return Err(Error::internal("benchmark count must be an Int"));
        };
        let body_pc = self.task().pc;
        let depth = self.task().stack.len();
        let started = Instant::now();
        for _ in 0..count {
            self.eval(body_pc)?;
            self.task_mut().stack.truncate(depth);
        }
        let elapsed = self.types.time(started.elapsed());
        self.push(elapsed);
        Ok(())
    }
}

/// Reads, emits, and evaluates `source` in a fresh VM over the standard
/// namespace, returning the top of the stack.
pub fn eval(source: &str) -> Result<Option<Value>> {
    let types = Types::new();
    let namespace = crate::stdlib::standard_namespace(&types);
    let forms = crate::reader::read("eval", source, &types)?;
    let mut vm = Vm::new(types);
    let from_pc = vm.emit_pc();
    crate::form::emit_forms(&mut vm, &namespace, forms, EmitOptions::default())?;
    vm.emit(Op::Stop);
    vm.eval(from_pc)?;
    Ok(vm.pop_result())
}
