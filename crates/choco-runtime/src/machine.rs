//! Interpreter for linked modules
//!
//! Calls between generated functions push frames on an explicit frame
//! stack; only host imports are called directly.

use crate::error::Trap;
use crate::host::Host;
use crate::link::{LinkedFunction, LinkedModule, Op};
use crate::memory::Memory;

/// One activation of a generated function
struct Frame<'m> {
    function: &'m LinkedFunction,
    pc: usize,
    locals: Vec<i32>,
    stack: Vec<i32>,
}

impl<'m> Frame<'m> {
    fn pop(&mut self) -> Result<i32, Trap> {
        self.stack.pop().ok_or(Trap::StackUnderflow)
    }

    fn pop_args(&mut self, count: usize) -> Result<Vec<i32>, Trap> {
        if self.stack.len() < count {
            return Err(Trap::StackUnderflow);
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    fn binary(&mut self, op: impl FnOnce(i32, i32) -> Result<i32, Trap>) -> Result<(), Trap> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.stack.push(op(a, b)?);
        Ok(())
    }
}

/// What the frame loop does after an instruction
enum Flow {
    Next,
    Enter { index: usize, args: Vec<i32> },
    Leave,
}

/// Execution state of one module instance
pub struct Machine<'m, 'h> {
    module: &'m LinkedModule,
    memory: Memory,
    globals: Vec<i32>,
    host: &'h mut dyn Host,
    max_depth: usize,
}

impl<'m, 'h> Machine<'m, 'h> {
    pub fn new(
        module: &'m LinkedModule,
        memory: Memory,
        host: &'h mut dyn Host,
        max_depth: usize,
    ) -> Self {
        Self {
            module,
            memory,
            globals: module.globals.clone(),
            host,
            max_depth,
        }
    }

    pub fn global(&self, index: usize) -> Option<i32> {
        self.globals.get(index).copied()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Call a function by index and run it to completion
    pub fn invoke(&mut self, index: usize, args: &[i32]) -> Result<Option<i32>, Trap> {
        if let Some(import) = self.module.imports.get(index) {
            return import.function.call(&mut *self.host, args);
        }

        let mut frames = vec![self.enter(index, args.to_vec(), 0)?];
        loop {
            let Some(frame) = frames.last_mut() else {
                return Err(Trap::StackUnderflow);
            };
            let flow = match frame.function.code.get(frame.pc).copied() {
                Some(op) => {
                    frame.pc += 1;
                    self.step(op, frame)?
                }
                // Falling off the end returns the top of the stack
                None => Flow::Leave,
            };

            match flow {
                Flow::Next => {}
                Flow::Enter { index, args } => {
                    let frame = self.enter(index, args, frames.len())?;
                    frames.push(frame);
                }
                Flow::Leave => {
                    let mut done = frames.pop().ok_or(Trap::StackUnderflow)?;
                    let value = done.pop()?;
                    match frames.last_mut() {
                        Some(caller) => caller.stack.push(value),
                        None => return Ok(Some(value)),
                    }
                }
            }
        }
    }

    fn enter(&self, index: usize, args: Vec<i32>, depth: usize) -> Result<Frame<'m>, Trap> {
        let module = self.module;
        let function = index
            .checked_sub(module.imports.len())
            .and_then(|i| module.functions.get(i))
            .ok_or(Trap::UndefinedElement {
                index: index as i32,
            })?;
        if args.len() != function.params {
            return Err(Trap::IndirectCallTypeMismatch {
                expected: function.params,
                actual: args.len(),
            });
        }
        if depth >= self.max_depth {
            return Err(Trap::CallStackExhausted { depth });
        }

        let mut locals = args;
        locals.resize(function.slots, 0);
        Ok(Frame {
            function,
            pc: 0,
            locals,
            stack: Vec::with_capacity(8),
        })
    }

    /// Call `index` from `frame`: host imports run immediately, generated
    /// functions get a new frame
    fn call(&mut self, frame: &mut Frame<'m>, index: usize, params: usize) -> Result<Flow, Trap> {
        let args = frame.pop_args(params)?;
        if let Some(import) = self.module.imports.get(index) {
            if let Some(result) = import.function.call(&mut *self.host, &args)? {
                frame.stack.push(result);
            }
            return Ok(Flow::Next);
        }
        Ok(Flow::Enter { index, args })
    }

    fn step(&mut self, op: Op, frame: &mut Frame<'m>) -> Result<Flow, Trap> {
        let module = self.module;
        match op {
            Op::Const(n) => frame.stack.push(n),
            Op::LocalGet(slot) => frame.stack.push(frame.locals[slot]),
            Op::LocalSet(slot) => frame.locals[slot] = frame.pop()?,
            Op::GlobalGet(index) => frame.stack.push(self.globals[index]),
            Op::GlobalSet(index) => self.globals[index] = frame.pop()?,

            Op::Load(offset) => {
                let address = frame.pop()?;
                frame.stack.push(self.memory.load(address, offset)?);
            }
            Op::Store(offset) => {
                let value = frame.pop()?;
                let address = frame.pop()?;
                self.memory.store(address, offset, value)?;
            }

            Op::Add => frame.binary(|a, b| Ok(a.wrapping_add(b)))?,
            Op::Sub => frame.binary(|a, b| Ok(a.wrapping_sub(b)))?,
            Op::Mul => frame.binary(|a, b| Ok(a.wrapping_mul(b)))?,
            Op::DivS => frame.binary(|a, b| {
                if b == 0 {
                    return Err(Trap::DivisionByZero);
                }
                a.checked_div(b).ok_or(Trap::IntegerOverflow)
            })?,
            Op::RemS => frame.binary(|a, b| {
                if b == 0 {
                    return Err(Trap::DivisionByZero);
                }
                Ok(a.wrapping_rem(b))
            })?,
            Op::Eq => frame.binary(|a, b| Ok((a == b) as i32))?,
            Op::Ne => frame.binary(|a, b| Ok((a != b) as i32))?,
            Op::LtS => frame.binary(|a, b| Ok((a < b) as i32))?,
            Op::GtS => frame.binary(|a, b| Ok((a > b) as i32))?,
            Op::LeS => frame.binary(|a, b| Ok((a <= b) as i32))?,
            Op::GeS => frame.binary(|a, b| Ok((a >= b) as i32))?,
            Op::Eqz => {
                let value = frame.pop()?;
                frame.stack.push((value == 0) as i32);
            }

            Op::Call(index) => {
                let (params, _) = module.signature(index).ok_or(Trap::UndefinedElement {
                    index: index as i32,
                })?;
                return self.call(frame, index, params);
            }
            Op::CallIndirect { params } => {
                let element = frame.pop()?;
                let index = usize::try_from(element)
                    .ok()
                    .and_then(|e| module.table.get(e).copied())
                    .ok_or(Trap::UndefinedElement { index: element })?;
                match module.signature(index) {
                    Some((actual, true)) if actual == params => {}
                    Some((actual, _)) => {
                        return Err(Trap::IndirectCallTypeMismatch {
                            expected: params,
                            actual,
                        })
                    }
                    None => return Err(Trap::UndefinedElement { index: element }),
                }
                return self.call(frame, index, params);
            }

            Op::Drop => {
                frame.pop()?;
            }
            Op::Return => return Ok(Flow::Leave),
            Op::Unreachable => return Err(Trap::Unreachable),

            Op::Jump(target) => frame.pc = target,
            Op::JumpIf(target) => {
                if frame.pop()? != 0 {
                    frame.pc = target;
                }
            }
            Op::JumpUnless(target) => {
                if frame.pop()? == 0 {
                    frame.pc = target;
                }
            }
        }
        Ok(Flow::Next)
    }
}
