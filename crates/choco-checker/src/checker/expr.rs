//! Expression checking

use super::Checker;
use crate::env::SearchMode;
use crate::error::{CheckError, CheckResult};
use choco_parser::ast::*;
use choco_parser::Span;
use choco_types::Type;

impl Checker {
    /// Assign a type to `expr` and its subexpressions.
    pub(super) fn check_expr(&mut self, expr: &mut Expr) -> CheckResult<Type> {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Literal(literal) => literal.ty(),

            ExprKind::Id { name, binding } => {
                let var = self.resolve_read(name, span)?;
                *binding = Some(var);
                self.vars.get(var).ty.ty.clone()
            }

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand)?;
                let expected = match op {
                    UnaryOp::Neg => Type::Int,
                    UnaryOp::Not => Type::Bool,
                };
                if operand_ty != expected {
                    return Err(CheckError::InvalidUnaryOp {
                        op: op.to_string(),
                        operand: operand_ty.to_string(),
                        span,
                    });
                }
                expected
            }

            ExprKind::Binary { op, left, right } => {
                let op = *op;
                let left_ty = self.check_expr(left)?;
                let right_ty = self.check_expr(right)?;
                binary_result(op, &left_ty, &right_ty).ok_or_else(|| {
                    CheckError::InvalidBinaryOp {
                        op: op.to_string(),
                        left: left_ty.to_string(),
                        right: right_ty.to_string(),
                        span,
                    }
                })?
            }

            ExprKind::Call {
                callee,
                args,
                target,
            } => self.check_call(callee, args, target, span)?,

            ExprKind::Field { object, field } => {
                let class = self.receiver_class(object)?;
                self.field_type(&class, field)?
            }

            ExprKind::Method {
                object,
                method,
                args,
            } => self.check_method_call(object, method, args, span)?,
        };

        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    /// Check that `expr` is a `bool` condition
    pub(super) fn check_condition(&mut self, expr: &mut Expr) -> CheckResult<()> {
        let ty = self.check_expr(expr)?;
        if ty == Type::Bool {
            Ok(())
        } else {
            Err(CheckError::mismatch(Type::Bool, ty, expr.span))
        }
    }

    /// Resolve an identifier read.
    ///
    /// Local and module names win. A name found only in an enclosing
    /// function is captured: it gets a read-only alias in the current scope.
    fn resolve_read(&mut self, name: &str, span: Span) -> CheckResult<VarId> {
        if let Some(&var) = self.var_env.lookup(name, SearchMode::LocalAndGlobal) {
            return Ok(var);
        }

        let Some(&origin) = self.var_env.lookup(name, SearchMode::Nonlocal) else {
            return Err(CheckError::UndefinedVariable {
                name: name.to_string(),
                span,
            });
        };

        // An enclosing `global x` makes `x` a plain module variable here too
        if self.vars.get(origin).is_global() {
            return Ok(origin);
        }

        let Some(owner) = self.frames.last().map(|frame| frame.fun) else {
            return Ok(origin);
        };
        let alias = self.alloc_capture(name, origin, false, span, owner);
        self.var_env.declare(name.to_string(), alias);
        Ok(alias)
    }

    pub(super) fn receiver_class(&mut self, object: &mut Expr) -> CheckResult<String> {
        let ty = self.check_expr(object)?;
        match ty {
            Type::Object(class) => Ok(class),
            other => Err(CheckError::NotAnObject {
                actual: other.to_string(),
                span: object.span,
            }),
        }
    }

    pub(super) fn field_type(&self, class: &str, field: &Ident) -> CheckResult<Type> {
        self.classes
            .get(class)
            .and_then(|layout| layout.field(&field.name))
            .map(|(_, layout)| layout.ty.clone())
            .ok_or_else(|| CheckError::UnknownField {
                class: class.to_string(),
                field: field.name.clone(),
                span: field.span,
            })
    }

    fn check_call(
        &mut self,
        callee: &Ident,
        args: &mut [Expr],
        target: &mut Option<CallTarget>,
        span: Span,
    ) -> CheckResult<Type> {
        let name = callee.name.as_str();

        if self.classes.contains(name) {
            if !args.is_empty() {
                return Err(CheckError::ArgumentCountMismatch {
                    name: name.to_string(),
                    expected: 0,
                    actual: args.len(),
                    span,
                });
            }
            *target = Some(CallTarget::Construct {
                class: name.to_string(),
            });
            return Ok(Type::object(name));
        }

        if let Some(&id) = self.fun_env.lookup(name, SearchMode::LocalAndGlobal) {
            let info = &self.functions[id.index()];
            let params = info.param_types.clone();
            let ret = info.ret.clone();
            let capture_names: Vec<String> = info.captures.iter().map(|c| c.name.clone()).collect();

            self.check_args(name, &params, args, span)?;

            let mut captures = Vec::with_capacity(capture_names.len());
            for capture in capture_names {
                let var = self
                    .var_env
                    .lookup(&capture, SearchMode::Local)
                    .copied()
                    .ok_or(CheckError::UnresolvedCapture {
                        name: capture,
                        span,
                    })?;
                captures.push(var);
            }

            *target = Some(CallTarget::Function { id, captures });
            return Ok(ret);
        }

        if let Some(builtin) = Builtin::from_name(name) {
            *target = Some(CallTarget::Builtin(builtin));
            return self.check_builtin(builtin, args, span);
        }

        Err(CheckError::UndefinedFunction {
            name: name.to_string(),
            span: callee.span,
        })
    }

    fn check_builtin(
        &mut self,
        builtin: Builtin,
        args: &mut [Expr],
        span: Span,
    ) -> CheckResult<Type> {
        if args.len() != builtin.arity() {
            return Err(CheckError::ArgumentCountMismatch {
                name: builtin.name().to_string(),
                expected: builtin.arity(),
                actual: args.len(),
                span,
            });
        }

        match builtin {
            Builtin::Print => {
                let ty = self.check_expr(&mut args[0])?;
                match ty {
                    Type::Int | Type::Bool | Type::None => Ok(Type::None),
                    other => Err(CheckError::CannotPrint {
                        actual: other.to_string(),
                        span: args[0].span,
                    }),
                }
            }
            Builtin::Abs | Builtin::Min | Builtin::Max | Builtin::Pow => {
                for arg in args.iter_mut() {
                    let ty = self.check_expr(arg)?;
                    if ty != Type::Int {
                        return Err(CheckError::mismatch(Type::Int, ty, arg.span));
                    }
                }
                Ok(Type::Int)
            }
        }
    }

    fn check_method_call(
        &mut self,
        object: &mut Expr,
        method: &Ident,
        args: &mut [Expr],
        span: Span,
    ) -> CheckResult<Type> {
        let class = self.receiver_class(object)?;
        let unknown = || CheckError::UnknownMethod {
            class: class.clone(),
            method: method.name.clone(),
            span: method.span,
        };

        let id = self
            .classes
            .get(&class)
            .and_then(|layout| layout.method_target(&method.name))
            .and_then(|target| self.method_funs.get(target))
            .copied()
            .ok_or_else(unknown)?;

        let info = &self.functions[id.index()];
        let params: Vec<Type> = info.param_types.iter().skip(1).cloned().collect();
        let ret = info.ret.clone();

        self.check_args(&method.name, &params, args, span)?;
        Ok(ret)
    }

    fn check_args(
        &mut self,
        name: &str,
        params: &[Type],
        args: &mut [Expr],
        span: Span,
    ) -> CheckResult<()> {
        if params.len() != args.len() {
            return Err(CheckError::ArgumentCountMismatch {
                name: name.to_string(),
                expected: params.len(),
                actual: args.len(),
                span,
            });
        }
        for (arg, param) in args.iter_mut().zip(params) {
            let ty = self.check_expr(arg)?;
            self.expect_assignable(&ty, param, arg.span)?;
        }
        Ok(())
    }
}

/// Result type of `left op right`, or `None` if the operands don't fit
fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    let both_int = *left == Type::Int && *right == Type::Int;
    if op.is_arithmetic() {
        both_int.then_some(Type::Int)
    } else if op.is_ordering() {
        both_int.then_some(Type::Bool)
    } else if op.is_equality() {
        // Objects compare by identity, with `is`
        (left == right && !left.is_object()).then_some(Type::Bool)
    } else {
        (left.is_nullable() && right.is_nullable()).then_some(Type::Bool)
    }
}
