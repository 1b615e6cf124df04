//! Structural return-path coverage

use choco_parser::ast::Stmt;

/// Whether every path through `stmts` ends in a `return`
pub fn body_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(always_returns)
}

/// Whether `stmt` returns on every path.
///
/// A `while` never counts: its body may run zero times.
pub fn always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } => true,
        Stmt::If {
            if_branch,
            elif_branches,
            else_body,
            ..
        } => {
            !else_body.is_empty()
                && body_returns(&if_branch.body)
                && elif_branches.iter().all(|b| body_returns(&b.body))
                && body_returns(else_body)
        }
        _ => false,
    }
}
