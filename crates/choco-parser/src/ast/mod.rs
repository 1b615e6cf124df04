//! Typed abstract syntax tree.
//!
//! The tree is built once by the parser. Later stages annotate it in place
//! through the `Option` slots (`ty`, `binding`, `target`, `id`) and never
//! restructure it. Variable storage facts live outside the tree, in an arena
//! indexed by [`VarId`].

mod expression;
mod statement;

pub use expression::*;
pub use statement::*;

use crate::token::Span;
use choco_types::Type;
use std::fmt;

/// Index of a variable record in the checker's variable arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl VarId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var{}", self.0)
    }
}

/// Index of a function record in the checker's function table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunId(pub u32);

impl FunId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// An identifier occurrence with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A whole compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub var_defs: Vec<VarDef>,
    pub fun_defs: Vec<FunDef>,
    pub class_defs: Vec<ClassDef>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A type annotation as written (`int`, `bool`, `None` or a class name)
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub name: String,
    pub span: Span,
}

/// `name: type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypedVar {
    pub name: Ident,
    pub annotation: TypeAnnotation,
}

/// `name: type = literal`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub var: TypedVar,
    pub init: Literal,
    pub init_span: Span,
    pub span: Span,
    /// Set by the checker
    pub binding: Option<VarId>,
}

/// A function or method definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunDef {
    pub name: Ident,
    pub params: Vec<TypedVar>,
    /// `None` when no `->` annotation was written (returns `None`)
    pub ret: Option<TypeAnnotation>,
    pub body: FunBody,
    pub span: Span,
    /// Set by the checker
    pub id: Option<FunId>,
}

/// Declarations and statements of a function body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunBody {
    pub var_defs: Vec<VarDef>,
    pub fun_defs: Vec<FunDef>,
    pub decls: Vec<ScopeDecl>,
    pub stmts: Vec<Stmt>,
}

/// `class Name(Super):` with its fields and methods
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: Ident,
    pub superclass: Ident,
    pub fields: Vec<VarDef>,
    pub methods: Vec<FunDef>,
    pub span: Span,
}

/// Kind of a scope declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Nonlocal,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Nonlocal => write!(f, "nonlocal"),
        }
    }
}

/// `global x` or `nonlocal x`
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeDecl {
    pub name: Ident,
    pub kind: ScopeKind,
    pub span: Span,
}

/// A literal value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Number(i32),
    Bool(bool),
    None,
}

impl Literal {
    /// The type every occurrence of this literal has
    pub fn ty(&self) -> Type {
        match self {
            Literal::Number(_) => Type::Int,
            Literal::Bool(_) => Type::Bool,
            Literal::None => Type::None,
        }
    }

    /// Run-time word for this literal
    pub fn as_word(&self) -> i32 {
        match self {
            Literal::Number(n) => *n,
            Literal::Bool(b) => *b as i32,
            Literal::None => 0,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::None => write!(f, "None"),
        }
    }
}
