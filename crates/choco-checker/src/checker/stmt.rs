//! Statement checking

use super::Checker;
use crate::env::SearchMode;
use crate::error::{CheckError, CheckResult};
use choco_parser::ast::*;
use choco_types::Type;

impl Checker {
    pub(super) fn check_block(&mut self, stmts: &mut [Stmt]) -> CheckResult<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> CheckResult<()> {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let value_ty = self.check_expr(value)?;
                let target_ty = self.check_target(target)?;
                self.expect_assignable(&value_ty, &target_ty, value.span)
            }

            Stmt::Expr { expr, .. } => self.check_expr(expr).map(|_| ()),

            Stmt::Return { value, span } => {
                let actual = self.check_expr(value)?;
                let expected = match self.frames.last() {
                    Some(frame) => frame.ret.clone(),
                    None => {
                        return Err(CheckError::mismatch("a statement", "return", *span));
                    }
                };
                self.expect_assignable(&actual, &expected, value.span)
            }

            Stmt::Pass { .. } => Ok(()),

            Stmt::If {
                if_branch,
                elif_branches,
                else_body,
                ..
            } => {
                self.check_cond_body(if_branch)?;
                for branch in elif_branches {
                    self.check_cond_body(branch)?;
                }
                self.check_block(else_body)
            }

            Stmt::While { branch, .. } => self.check_cond_body(branch),
        }
    }

    fn check_cond_body(&mut self, branch: &mut CondBody) -> CheckResult<()> {
        self.check_condition(&mut branch.cond)?;
        self.check_block(&mut branch.body)
    }

    /// Resolve an assignment target and return the type it stores.
    ///
    /// A name must be owned by the current scope or brought in with
    /// `global`/`nonlocal`.
    fn check_target(&mut self, target: &mut LValue) -> CheckResult<Type> {
        match target {
            LValue::Id { name, binding } => {
                let local = self
                    .var_env
                    .lookup(&name.name, SearchMode::Local)
                    .copied()
                    .filter(|&var| self.vars.get(var).writable);

                let Some(var) = local else {
                    return Err(if self.var_env.contains(&name.name, SearchMode::All) {
                        CheckError::UndeclaredAssignment {
                            name: name.name.clone(),
                            span: name.span,
                        }
                    } else {
                        CheckError::UndefinedVariable {
                            name: name.name.clone(),
                            span: name.span,
                        }
                    });
                };

                *binding = Some(var);
                Ok(self.vars.get(var).ty.ty.clone())
            }

            LValue::Field { object, field } => {
                let class = self.receiver_class(object)?;
                self.field_type(&class, field)
            }
        }
    }
}
