//! Instructions
//!
//! A flat stream of stack-machine instructions. Structured control flow is
//! expressed with `block`/`loop`/`if` openers closed by `end`; branches name
//! the label of an enclosing `block` or `loop`. Locals, globals, functions
//! and types are referred to by name and resolved when the module is linked.

use std::fmt;

/// A single instruction. Every value is an `i32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    I32Const(i32),

    LocalGet(String),
    LocalSet(String),
    GlobalGet(String),
    GlobalSet(String),

    /// `[addr] -> [value]`, reading `addr + offset`
    I32Load { offset: u32 },
    /// `[addr, value] -> []`, writing `addr + offset`
    I32Store { offset: u32 },

    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32RemS,
    I32Eq,
    I32Ne,
    I32LtS,
    I32GtS,
    I32LeS,
    I32GeS,
    I32Eqz,

    /// Direct call of a function or import
    Call(String),
    /// `[args.., table index] -> [result]`, checked against the named type
    CallIndirect { ty: String },

    Drop,
    Return,
    Unreachable,

    /// Opens a block; `br label` jumps past its `end`
    Block(String),
    /// Opens a loop; `br label` jumps back to its start
    Loop(String),
    /// `[cond] -> []`, runs the following instructions if `cond != 0`
    If,
    Else,
    End,
    Br(String),
    /// `[cond] -> []`, branches if `cond != 0`
    BrIf(String),
}

impl Instr {
    /// Whether this instruction opens a structured region closed by `end`
    pub fn opens_region(&self) -> bool {
        matches!(self, Instr::Block(_) | Instr::Loop(_) | Instr::If)
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::I32Const(n) => write!(f, "i32.const {}", n),
            Instr::LocalGet(name) => write!(f, "local.get ${}", name),
            Instr::LocalSet(name) => write!(f, "local.set ${}", name),
            Instr::GlobalGet(name) => write!(f, "global.get ${}", name),
            Instr::GlobalSet(name) => write!(f, "global.set ${}", name),
            Instr::I32Load { offset: 0 } => write!(f, "i32.load"),
            Instr::I32Load { offset } => write!(f, "i32.load offset={}", offset),
            Instr::I32Store { offset: 0 } => write!(f, "i32.store"),
            Instr::I32Store { offset } => write!(f, "i32.store offset={}", offset),
            Instr::I32Add => write!(f, "i32.add"),
            Instr::I32Sub => write!(f, "i32.sub"),
            Instr::I32Mul => write!(f, "i32.mul"),
            Instr::I32DivS => write!(f, "i32.div_s"),
            Instr::I32RemS => write!(f, "i32.rem_s"),
            Instr::I32Eq => write!(f, "i32.eq"),
            Instr::I32Ne => write!(f, "i32.ne"),
            Instr::I32LtS => write!(f, "i32.lt_s"),
            Instr::I32GtS => write!(f, "i32.gt_s"),
            Instr::I32LeS => write!(f, "i32.le_s"),
            Instr::I32GeS => write!(f, "i32.ge_s"),
            Instr::I32Eqz => write!(f, "i32.eqz"),
            Instr::Call(name) => write!(f, "call ${}", name),
            Instr::CallIndirect { ty } => write!(f, "call_indirect (type ${})", ty),
            Instr::Drop => write!(f, "drop"),
            Instr::Return => write!(f, "return"),
            Instr::Unreachable => write!(f, "unreachable"),
            Instr::Block(label) => write!(f, "block ${}", label),
            Instr::Loop(label) => write!(f, "loop ${}", label),
            Instr::If => write!(f, "if"),
            Instr::Else => write!(f, "else"),
            Instr::End => write!(f, "end"),
            Instr::Br(label) => write!(f, "br ${}", label),
            Instr::BrIf(label) => write!(f, "br_if ${}", label),
        }
    }
}
