//! Expression nodes

use super::{FunId, Ident, Literal, VarId};
use crate::token::Span;
use choco_types::Type;
use std::fmt;

/// An expression with its resolved type (set by the checker)
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),

    /// Identifier read; `binding` is the variable it resolved to
    Id {
        name: String,
        binding: Option<VarId>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `f(args)`: a function call, builtin call or object construction
    Call {
        callee: Ident,
        args: Vec<Expr>,
        target: Option<CallTarget>,
    },

    /// `object.field`
    Field { object: Box<Expr>, field: Ident },

    /// `object.method(args)`
    Method {
        object: Box<Expr>,
        method: Ident,
        args: Vec<Expr>,
    },
}

/// What a call resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    /// A user function; `captures` are the caller-side variables passed as
    /// trailing cell-address arguments, in the callee's capture order
    Function { id: FunId, captures: Vec<VarId> },
    /// Construction of the named class
    Construct { class: String },
    Builtin(Builtin),
}

/// Host-provided functions callable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Abs,
    Min,
    Max,
    Pow,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Print,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Pow,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Builtin::Print),
            "abs" => Some(Builtin::Abs),
            "min" => Some(Builtin::Min),
            "max" => Some(Builtin::Max),
            "pow" => Some(Builtin::Pow),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Pow => "pow",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Builtin::Print | Builtin::Abs => 1,
            Builtin::Min | Builtin::Max | Builtin::Pow => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Is,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FloorDiv | BinaryOp::Mod
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Is => "is",
        };
        write!(f, "{}", s)
    }
}
