//! Statement lowering
//!
//! Statements leave the stack as they found it.

use super::function::FunctionEmitter;
use super::SCRATCH;
use crate::error::CompileResult;
use crate::ir::Instr;
use choco_parser::ast::{CondBody, LValue, Stmt};

impl<'a, 'b> FunctionEmitter<'a, 'b> {
    pub fn emit_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn emit_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Assign { target, value, .. } => match target {
                LValue::Id { name, binding } => {
                    let var = self.binding(*binding, &name.name)?;
                    if var.is_global() {
                        self.emit_expr(value)?;
                        self.emit(Instr::GlobalSet(var.name.clone()));
                    } else if var.is_indirect() {
                        self.emit(Instr::LocalGet(var.name.clone()));
                        self.emit_expr(value)?;
                        self.emit(Instr::I32Store { offset: 0 });
                    } else {
                        self.emit_expr(value)?;
                        self.emit(Instr::LocalSet(var.name.clone()));
                    }
                }
                LValue::Field { object, field } => {
                    self.emit_field_store(object, &field.name, value)?;
                }
            },

            Stmt::Expr { expr, .. } => {
                self.fb.add_local(SCRATCH);
                self.emit_expr(expr)?;
                self.emit(Instr::LocalSet(SCRATCH.to_string()));
            }

            Stmt::Return { value, .. } => {
                self.emit_expr(value)?;
                self.emit(Instr::Return);
            }

            Stmt::Pass { .. } => {}

            Stmt::If {
                if_branch,
                elif_branches,
                else_body,
                ..
            } => {
                let exit = self.fb.new_label("if_exit");
                self.emit(Instr::Block(exit.clone()));
                for branch in std::iter::once(if_branch).chain(elif_branches) {
                    self.emit_guarded(branch, &exit)?;
                }
                self.emit_block(else_body)?;
                self.emit(Instr::End);
            }

            Stmt::While { branch, .. } => {
                let exit = self.fb.new_label("while_exit");
                let head = self.fb.new_label("while_loop");
                self.emit(Instr::Block(exit.clone()));
                self.emit(Instr::Loop(head.clone()));
                self.emit_expr(&branch.cond)?;
                self.emit(Instr::I32Eqz);
                self.emit(Instr::BrIf(exit));
                self.emit_block(&branch.body)?;
                self.emit(Instr::Br(head));
                self.emit(Instr::End);
                self.emit(Instr::End);
            }
        }
        Ok(())
    }

    /// Run `branch.body` when its condition holds, then leave through `exit`
    fn emit_guarded(&mut self, branch: &CondBody, exit: &str) -> CompileResult<()> {
        self.emit_expr(&branch.cond)?;
        self.emit(Instr::If);
        self.emit_block(&branch.body)?;
        self.emit(Instr::Br(exit.to_string()));
        self.emit(Instr::End);
        Ok(())
    }
}
