//! Stack machine interpreter for object units

use std::collections::HashMap;

use log::{debug, trace};

use crate::backend::object::*;
use crate::utils::{Error, Result};
use crate::vm::runtime::Runtime;

/// Frames beyond this depth raise `StackOverflow`
pub const MAX_CALL_DEPTH: usize = 1024;

/// One operand-stack or storage value. Booleans are ints.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(String),
    /// Index into the array heap
    Array(usize),
    /// Array slot that has not been assigned yet
    Null,
}

impl Value {
    /// Initial value of a slot of the given type
    pub fn zero(ty: SlotType) -> Value {
        match ty {
            SlotType::Int | SlotType::Boolean => Value::Int(0),
            SlotType::Float => Value::Float(0.0),
            SlotType::IntArray | SlotType::FloatArray | SlotType::BooleanArray => Value::Null,
        }
    }

    fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(Error::Malformed(format!("expected int, found {:?}", other))),
        }
    }

    fn as_float(&self) -> Result<f32> {
        match self {
            Value::Float(v) => Ok(*v),
            other => Err(Error::Malformed(format!("expected float, found {:?}", other))),
        }
    }

    fn as_array(&self) -> Result<usize> {
        match self {
            Value::Array(handle) => Ok(*handle),
            Value::Null => Err(Error::NullArray),
            other => Err(Error::Malformed(format!("expected array, found {:?}", other))),
        }
    }
}

struct Frame<'u> {
    routine: &'u Routine,
    pc: usize,
    locals: Vec<Value>,
}

pub struct Machine<'u, 'r> {
    unit: &'u ObjectUnit,
    routines: HashMap<&'u str, &'u Routine>,
    runtime: &'r mut dyn Runtime,
    frames: Vec<Frame<'u>>,
    stack: Vec<Value>,
    globals: HashMap<&'u str, Value>,
    heap: Vec<Vec<Value>>,
}

impl<'u, 'r> Machine<'u, 'r> {
    pub fn new(unit: &'u ObjectUnit, runtime: &'r mut dyn Runtime) -> Self {
        Self {
            unit,
            routines: unit.routines.iter().map(|r| (r.name.as_str(), r)).collect(),
            runtime,
            frames: Vec::new(),
            stack: Vec::new(),
            globals: unit
                .globals
                .iter()
                .map(|f| (f.name.as_str(), Value::zero(f.ty)))
                .collect(),
            heap: Vec::new(),
        }
    }

    /// Run the entry routine to completion
    pub fn run(&mut self) -> Result<()> {
        debug!("running {}", self.unit.qualified_name());
        let unit = self.unit;
        self.enter(&unit.entry)?;

        while let Some(frame) = self.frames.last_mut() {
            let routine = frame.routine;
            let instr = routine.code.get(frame.pc).ok_or_else(|| {
                Error::Malformed(format!("{} ran past its last instruction", routine.name))
            })?;
            frame.pc += 1;
            self.step(instr)?;
        }

        debug!("{} finished, {} arrays allocated", self.unit.name, self.heap.len());
        Ok(())
    }

    // ==================== Frames ====================

    /// Push a frame, moving the arguments off the operand stack into the parameter slots
    fn enter(&mut self, routine: &'u Routine) -> Result<()> {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(Error::StackOverflow);
        }
        let mut locals: Vec<Value> = routine.locals.iter().map(|&ty| Value::zero(ty)).collect();
        if locals.len() < routine.params.len() {
            return Err(Error::Malformed(format!("{} has fewer locals than parameters", routine.name)));
        }
        for slot in (0..routine.params.len()).rev() {
            locals[slot] = self.pop()?;
        }

        trace!("enter {} at depth {}", routine.name, self.frames.len());
        self.frames.push(Frame { routine, pc: 0, locals });
        Ok(())
    }

    fn leave(&mut self, result: Option<Value>) {
        if let Some(frame) = self.frames.pop() {
            trace!("leave {}", frame.routine.name);
        }
        if let Some(value) = result {
            self.stack.push(value);
        }
    }

    fn frame_mut(&mut self) -> Result<&mut Frame<'u>> {
        self.frames
            .last_mut()
            .ok_or_else(|| Error::Malformed("no active frame".to_string()))
    }

    fn local(&mut self, slot: u16) -> Result<&mut Value> {
        let frame = self.frame_mut()?;
        let name = &frame.routine.name;
        frame
            .locals
            .get_mut(usize::from(slot))
            .ok_or_else(|| Error::Malformed(format!("slot {} out of range in {}", slot, name)))
    }

    fn global(&mut self, field: &str) -> Result<&mut Value> {
        self.globals
            .get_mut(field)
            .ok_or_else(|| Error::Malformed(format!("unknown field {}", field)))
    }

    // ==================== Operand stack ====================

    fn pop(&mut self) -> Result<Value> {
        self.stack
            .pop()
            .ok_or_else(|| Error::Malformed("operand stack underflow".to_string()))
    }

    fn pop_int(&mut self) -> Result<i32> {
        self.pop()?.as_int()
    }

    fn pop_float(&mut self) -> Result<f32> {
        self.pop()?.as_float()
    }

    fn int_op(&mut self, op: impl FnOnce(i32, i32) -> i32) -> Result<()> {
        let b = self.pop_int()?;
        let a = self.pop_int()?;
        self.stack.push(Value::Int(op(a, b)));
        Ok(())
    }

    fn float_op(&mut self, op: impl FnOnce(f32, f32) -> f32) -> Result<()> {
        let b = self.pop_float()?;
        let a = self.pop_float()?;
        self.stack.push(Value::Float(op(a, b)));
        Ok(())
    }

    /// Pops an array handle and index; checks the index against the array
    fn element(&mut self) -> Result<(usize, usize)> {
        let index = self.pop_int()?;
        let handle = self.pop()?.as_array()?;
        let len = self.heap.get(handle).map_or(0, Vec::len);
        match usize::try_from(index) {
            Ok(i) if i < len => Ok((handle, i)),
            _ => Err(Error::IndexOutOfBounds { index, len }),
        }
    }

    // ==================== Execution ====================

    fn jump(&mut self, target: usize) -> Result<()> {
        self.frame_mut()?.pc = target;
        Ok(())
    }

    fn step(&mut self, instr: &'u Instr) -> Result<()> {
        match instr {
            Instr::IConst(v) => self.stack.push(Value::Int(*v)),
            Instr::FConst(v) => self.stack.push(Value::Float(*v)),
            Instr::SConst(s) => self.stack.push(Value::Str(s.clone())),

            Instr::ILoad(n) | Instr::FLoad(n) | Instr::ALoad(n) => {
                let value = self.local(*n)?.clone();
                self.stack.push(value);
            }
            Instr::IStore(n) | Instr::FStore(n) | Instr::AStore(n) => {
                let value = self.pop()?;
                *self.local(*n)? = value;
            }
            Instr::GetStatic(field) => {
                let value = self.global(field)?.clone();
                self.stack.push(value);
            }
            Instr::PutStatic(field) => {
                let value = self.pop()?;
                *self.global(field)? = value;
            }

            Instr::NewArray(elem) => {
                let size = self.pop_int()?;
                let len = usize::try_from(size).map_err(|_| Error::NegativeArraySize(size))?;
                let zero = match elem {
                    ElemType::Int => Value::Int(0),
                    ElemType::Float => Value::Float(0.0),
                };
                self.heap.push(vec![zero; len]);
                self.stack.push(Value::Array(self.heap.len() - 1));
            }
            Instr::IALoad | Instr::FALoad => {
                let (handle, i) = self.element()?;
                let value = self.heap[handle][i].clone();
                self.stack.push(value);
            }
            Instr::IAStore | Instr::FAStore => {
                let value = self.pop()?;
                let (handle, i) = self.element()?;
                self.heap[handle][i] = value;
            }

            Instr::IAdd => self.int_op(i32::wrapping_add)?,
            Instr::ISub => self.int_op(i32::wrapping_sub)?,
            Instr::IMul => self.int_op(i32::wrapping_mul)?,
            Instr::IDiv | Instr::IRem => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                if b == 0 {
                    return Err(Error::DivisionByZero);
                }
                let result = if *instr == Instr::IDiv { a.wrapping_div(b) } else { a.wrapping_rem(b) };
                self.stack.push(Value::Int(result));
            }
            Instr::INeg => {
                let v = self.pop_int()?;
                self.stack.push(Value::Int(v.wrapping_neg()));
            }
            Instr::FAdd => self.float_op(|a, b| a + b)?,
            Instr::FSub => self.float_op(|a, b| a - b)?,
            Instr::FMul => self.float_op(|a, b| a * b)?,
            Instr::FDiv => self.float_op(|a, b| a / b)?,
            Instr::FNeg => {
                let v = self.pop_float()?;
                self.stack.push(Value::Float(-v));
            }
            Instr::I2F => {
                let v = self.pop_int()?;
                self.stack.push(Value::Float(v as f32));
            }
            Instr::F2I => {
                // saturating, NaN becomes 0
                let v = self.pop_float()?;
                self.stack.push(Value::Int(v as i32));
            }
            Instr::IAnd => self.int_op(|a, b| a & b)?,
            Instr::IOr => self.int_op(|a, b| a | b)?,
            Instr::FCmpL | Instr::FCmpG => {
                let b = self.pop_float()?;
                let a = self.pop_float()?;
                let result = match a.partial_cmp(&b) {
                    Some(ordering) => ordering as i32,
                    None if *instr == Instr::FCmpL => -1,
                    None => 1,
                };
                self.stack.push(Value::Int(result));
            }

            Instr::If(cond, target) => {
                let v = self.pop_int()?;
                if cond.holds(v.cmp(&0)) {
                    self.jump(*target)?;
                }
            }
            Instr::IfICmp(cond, target) => {
                let b = self.pop_int()?;
                let a = self.pop_int()?;
                if cond.holds(a.cmp(&b)) {
                    self.jump(*target)?;
                }
            }
            Instr::Goto(target) => self.jump(*target)?,

            Instr::Invoke(name) => {
                let routine = *self
                    .routines
                    .get(name.as_str())
                    .ok_or_else(|| Error::Malformed(format!("unknown routine {}", name)))?;
                self.enter(routine)?;
            }
            Instr::InvokeRuntime(call) => self.runtime_call(*call)?,
            Instr::IReturn | Instr::FReturn => {
                let value = self.pop()?;
                self.leave(Some(value));
            }
            Instr::Return => self.leave(None),
        }
        Ok(())
    }

    fn runtime_call(&mut self, call: RuntimeCall) -> Result<()> {
        trace!("runtime.{}", call.name());
        match call {
            RuntimeCall::PrintInt => {
                let v = self.pop_int()?;
                self.runtime.print_int(v)?;
            }
            RuntimeCall::PrintFloat => {
                let v = self.pop_float()?;
                self.runtime.print_float(v)?;
            }
            RuntimeCall::PrintBoolean => {
                let v = self.pop_int()?;
                self.runtime.print_boolean(v != 0)?;
            }
            RuntimeCall::InputInt | RuntimeCall::InputFloat | RuntimeCall::InputBoolean => {
                let name = match self.pop()? {
                    Value::Str(name) => name,
                    other => return Err(Error::Malformed(format!("expected name, found {:?}", other))),
                };
                let value = match call {
                    RuntimeCall::InputInt => Value::Int(self.runtime.input_int(&name)?),
                    RuntimeCall::InputFloat => Value::Float(self.runtime.input_float(&name)?),
                    _ => Value::Int(i32::from(self.runtime.input_boolean(&name)?)),
                };
                self.stack.push(value);
            }
            RuntimeCall::AbortNoAlternative => {
                let line = self.pop_int()?;
                return Err(self.runtime.abort_no_alternative(line));
            }
            RuntimeCall::AbortNoFunctionReturn => {
                let line = self.pop_int()?;
                return Err(self.runtime.abort_no_function_return(line));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{compile, CompileOptions};
    use crate::vm::runtime::ScriptedRuntime;
    use pretty_assertions::assert_eq;

    fn run_with(source: &str, inputs: &[&str]) -> (Result<()>, Vec<String>) {
        let unit = compile(source, &CompileOptions::default()).unwrap();
        let mut runtime = ScriptedRuntime::new(inputs);
        let result = Machine::new(&unit, &mut runtime).run();
        (result, runtime.output)
    }

    fn run(source: &str) -> Vec<String> {
        let (result, output) = run_with(source, &[]);
        result.unwrap();
        output
    }

    fn last(source: &str) -> String {
        run(source).pop().unwrap()
    }

    #[test]
    fn test_swap() {
        assert_eq!(last("program p a, b <- 1, 2; a, b <- b, a; print a"), "2");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(last("program p print 3 / 2"), "1.5");
        assert_eq!(last("program p print (3 * 7 + 5) mod 7"), "5");
        assert_eq!(last("program p print (3 * 7 + 5) div 7"), "3");
        assert_eq!(last("program p print -7 div 2"), "-3");
        assert_eq!(last("program p print -7 mod 2"), "-1");
        assert_eq!(last("program p a <- 2.0; print -a < (2 * 4 + -100)"), "false");
    }

    #[test]
    fn test_coercion() {
        assert_eq!(last("program p int a; a <- 1.9; print a"), "1");
        assert_eq!(last("program p float a; a <- 1; print a"), "1.0");
        assert_eq!(last("program p float[4] a; a[2] <- 1; print a[2]"), "1.0");
        assert_eq!(last("program p boolean[1] a; a[0] <- false; print a[0]"), "false");
    }

    #[test]
    fn test_float_comparisons() {
        assert_eq!(
            run("program p a, b <- 1.0, 2.0; print b <= a; print a < b; print a = a; print a ~= b"),
            vec!["false", "true", "true", "true"]
        );
    }

    #[test]
    fn test_logic() {
        assert_eq!(
            run("program p t, f <- true, false; print t & f; print t | f; print ~t; print ~(t & f)"),
            vec!["false", "true", "false", "true"]
        );
    }

    #[test]
    fn test_alternation() {
        let source = "program p b <- true a <- 1
                      if
                        ~b :: a <- 2
                        b :: if b :: a <- -5 fi
                      fi
                      print a";
        assert_eq!(last(source), "-5");

        // first true guard wins
        assert_eq!(last("program p b <- true a <- 1 if b :: a <- -5 b :: a <- 15 fi print a"), "-5");
    }

    #[test]
    fn test_alternation_without_true_guard_aborts() {
        let source = "program p\nb <- false a <- 1\nif\n  b :: a <- -5\n  b & true :: a <- -5\nfi\nprint a";
        let (result, output) = run_with(source, &[]);
        assert_eq!(result.unwrap_err(), Error::NoAlternative { line: 3 });
        assert!(output.is_empty());
    }

    #[test]
    fn test_iteration() {
        let source = "program p a <- 0
                      do
                        a < 5 :: a <- a + 1
                        a < 10 :: a <- a + 4
                      od
                      print a";
        assert_eq!(last(source), "13");
        assert_eq!(last("program p a <- 0 do a > 5 :: a <- a + 1 od print a"), "0");

        let nested = "program p a <- 0 b <- 0 c <- 0
                      do a < 5 :: { a <- a + 1; do b < a :: { b <- b + 1; c <- c + 2 } od } od
                      print c";
        assert_eq!(last(nested), "10");
    }

    #[test]
    fn test_arrays() {
        assert_eq!(last("program p int[4] a; a[2] <- 1; print a[2]"), "1");
        assert_eq!(last("program p int[3] a; i <- 0 do i < 3 :: a[i], i <- i * i, i + 1 od print a[2]"), "4");
    }

    #[test]
    fn test_procedures() {
        assert_eq!(run("program p proc foo() { print 30; } print 15; foo();"), vec!["15", "30"]);
        assert_eq!(last("program p proc foo(int a, int b) { print a - b; } foo(10, 20);"), "-10");
        assert_eq!(last("program p a <- 10 proc foo(int b) { print a - b; } foo(20);"), "-10");
        assert_eq!(
            last("program p int[1] a; a[0] <- 10 proc foo(int b) { print a[0] - b; } foo(20);"),
            "-10"
        );
    }

    #[test]
    fn test_functions() {
        assert_eq!(last("program p fun foo() : int { return 30; } print 15; print foo();"), "30");
        assert_eq!(
            last("program p fun foo(int a, int b) : int { return a - b; } print 15; print foo(10.0, 20.0);"),
            "-10"
        );
        assert_eq!(
            last("program p fun foo() : int { int[1] b; b[0] <- 30; return b[0]; } print foo();"),
            "30"
        );
        assert_eq!(last("program p fun half(float x) : float { return x / 2 } print half(3)"), "1.5");
    }

    #[test]
    fn test_recursion() {
        let source = "program p
                      fun f(int n) : int { if n <= 0 :: return 0  n > 0 :: return 1 + f(n - 1) fi }
                      print f(5)";
        assert_eq!(last(source), "5");
    }

    #[test]
    fn test_missing_return_aborts() {
        let source = "program p\nfun f(int n) : int {\n if n > 0 :: return n  n <= 0 :: print 0 fi\n}\nprint f(0)";
        let (result, output) = run_with(source, &[]);
        assert_eq!(result.unwrap_err(), Error::NoFunctionReturn { line: 2 });
        assert_eq!(output, vec!["0"]);
    }

    #[test]
    fn test_input() {
        let (result, output) = run_with("program p input a, b; print a + b < 10", &["3", "4"]);
        result.unwrap();
        assert_eq!(output, vec!["true"]);

        let (result, _) = run_with("program p float x; input x; print x", &["oops"]);
        assert!(matches!(result, Err(Error::BadInput { .. })));
    }

    #[test]
    fn test_runtime_traps() {
        let (result, _) = run_with("program p a <- 0; print 1 div a", &[]);
        assert_eq!(result.unwrap_err(), Error::DivisionByZero);

        let (result, _) = run_with("program p int[2] a; print a[2]", &[]);
        assert_eq!(result.unwrap_err(), Error::IndexOutOfBounds { index: 2, len: 2 });

        let (result, _) = run_with("program p n <- -1; int[n] a", &[]);
        assert_eq!(result.unwrap_err(), Error::NegativeArraySize(-1));

        let (result, _) = run_with("program p proc f() { f() } f()", &[]);
        assert_eq!(result.unwrap_err(), Error::StackOverflow);
    }
}
