//! Expression lowering
//!
//! Every expression leaves exactly one word on the stack.

use super::function::FunctionEmitter;
use crate::error::{CompileError, CompileResult};
use crate::ir::Instr;
use choco_parser::ast::{BinaryOp, Builtin, CallTarget, Expr, ExprKind, UnaryOp};
use choco_types::Type;

impl<'a, 'b> FunctionEmitter<'a, 'b> {
    pub fn emit_expr(&mut self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Literal(lit) => self.emit(Instr::I32Const(lit.as_word())),

            ExprKind::Id { name, binding } => {
                let var = self.binding(*binding, name)?;
                self.load_var(var);
            }

            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => {
                    self.emit(Instr::I32Const(0));
                    self.emit_expr(operand)?;
                    self.emit(Instr::I32Sub);
                }
                UnaryOp::Not => {
                    self.emit_expr(operand)?;
                    self.emit(Instr::I32Eqz);
                }
            },

            ExprKind::Binary { op, left, right } => {
                self.emit_expr(left)?;
                self.emit_expr(right)?;
                self.emit(binary_instr(*op));
            }

            ExprKind::Call {
                callee,
                args,
                target,
            } => {
                let target = target.as_ref().ok_or_else(|| {
                    CompileError::internal(format!("call of '{}' was not resolved", callee.name))
                })?;
                match target {
                    CallTarget::Function { id, captures } => {
                        let program = self.program;
                        for arg in args {
                            self.emit_expr(arg)?;
                        }
                        for &capture in captures {
                            self.load_cell(program.var(capture))?;
                        }
                        let name = program.function(*id).emitted_name.clone();
                        self.emit(Instr::Call(name));
                    }
                    CallTarget::Construct { class } => self.emit_construct(class)?,
                    CallTarget::Builtin(builtin) => self.emit_builtin(*builtin, args)?,
                }
            }

            ExprKind::Field { object, field } => {
                let offset = self.field_offset(object, &field.name)?;
                self.emit_checked_object(object)?;
                self.emit(Instr::I32Load { offset });
            }

            ExprKind::Method {
                object,
                method,
                args,
            } => self.emit_method_call(object, &method.name, args)?,
        }
        Ok(())
    }

    fn emit_builtin(&mut self, builtin: Builtin, args: &[Expr]) -> CompileResult<()> {
        for arg in args {
            self.emit_expr(arg)?;
        }
        match builtin {
            Builtin::Print => {
                let arg = args
                    .first()
                    .ok_or_else(|| CompileError::internal("print without an argument"))?;
                let import = match expr_type(arg)? {
                    Type::Int => "#print_num",
                    Type::Bool => "#print_bool",
                    Type::None => "#print_none",
                    Type::Object(class) => {
                        return Err(CompileError::internal(format!(
                            "print of a '{}' object passed checking",
                            class
                        )))
                    }
                };
                self.emit(Instr::Call(import.to_string()));
                self.emit(Instr::I32Const(0));
            }
            Builtin::Abs => self.emit(Instr::Call("#abs".to_string())),
            Builtin::Min => self.emit(Instr::Call("#min".to_string())),
            Builtin::Max => self.emit(Instr::Call("#max".to_string())),
            Builtin::Pow => self.emit(Instr::Call("#pow".to_string())),
        }
        Ok(())
    }
}

/// The type the checker assigned to `expr`
pub(super) fn expr_type(expr: &Expr) -> CompileResult<&Type> {
    expr.ty
        .as_ref()
        .ok_or_else(|| CompileError::internal("expression reached codegen without a type"))
}

fn binary_instr(op: BinaryOp) -> Instr {
    match op {
        BinaryOp::Add => Instr::I32Add,
        BinaryOp::Sub => Instr::I32Sub,
        BinaryOp::Mul => Instr::I32Mul,
        BinaryOp::FloorDiv => Instr::I32DivS,
        BinaryOp::Mod => Instr::I32RemS,
        BinaryOp::Eq | BinaryOp::Is => Instr::I32Eq,
        BinaryOp::Ne => Instr::I32Ne,
        BinaryOp::Lt => Instr::I32LtS,
        BinaryOp::Gt => Instr::I32GtS,
        BinaryOp::Le => Instr::I32LeS,
        BinaryOp::Ge => Instr::I32GeS,
    }
}
