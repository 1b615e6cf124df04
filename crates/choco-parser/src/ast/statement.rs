//! Statement nodes

use super::{Expr, Ident, VarId};
use crate::token::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: LValue,
        value: Expr,
        span: Span,
    },

    /// Bare expression; its value is discarded (or becomes the module result)
    Expr { expr: Expr, span: Span },

    Return { value: Expr, span: Span },

    Pass { span: Span },

    If {
        if_branch: CondBody,
        elif_branches: Vec<CondBody>,
        else_body: Vec<Stmt>,
        span: Span,
    },

    While { branch: CondBody, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Pass { span }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. } => *span,
        }
    }
}

/// A condition with the statements it guards
#[derive(Debug, Clone, PartialEq)]
pub struct CondBody {
    pub cond: Expr,
    pub body: Vec<Stmt>,
}

/// Assignment target
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    Id {
        name: Ident,
        binding: Option<VarId>,
    },
    Field {
        object: Box<Expr>,
        field: Ident,
    },
}
