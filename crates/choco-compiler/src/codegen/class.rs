//! Objects: construction, field access and method dispatch

use super::expr::expr_type;
use super::function::FunctionEmitter;
use super::{CHECK_INIT, NEW};
use crate::error::{CompileError, CompileResult};
use crate::ir::Instr;
use choco_checker::{ClassLayout, INIT_METHOD};
use choco_parser::ast::Expr;

impl<'a, 'b> FunctionEmitter<'a, 'b> {
    fn layout(&self, class: &str) -> CompileResult<&'a ClassLayout> {
        let program = self.program;
        program
            .classes
            .get(class)
            .ok_or_else(|| CompileError::internal(format!("class '{}' has no layout", class)))
    }

    fn receiver_layout(&self, object: &Expr) -> CompileResult<&'a ClassLayout> {
        let ty = expr_type(object)?;
        let class = ty.class_name().ok_or_else(|| {
            CompileError::internal(format!("member access on non-object type '{}'", ty))
        })?;
        self.layout(class)
    }

    /// Byte offset of `field` in objects of `object`'s static class
    pub(super) fn field_offset(&self, object: &Expr, field: &str) -> CompileResult<u32> {
        let layout = self.receiver_layout(object)?;
        let (index, _) = layout.field(field).ok_or_else(|| {
            CompileError::internal(format!("class '{}' has no field '{}'", layout.name, field))
        })?;
        Ok(ClassLayout::field_offset(index))
    }

    /// `[] -> [address]`, trapping in the host when the object is null
    pub(super) fn emit_checked_object(&mut self, object: &Expr) -> CompileResult<()> {
        self.emit_expr(object)?;
        self.emit(Instr::Call(CHECK_INIT.to_string()));
        Ok(())
    }

    /// Allocate an object, fill in its vtable base and field initializers,
    /// then run the class's `__init__` on it
    pub(super) fn emit_construct(&mut self, class: &str) -> CompileResult<()> {
        let layout = self.layout(class)?;
        let init = layout.method_target(INIT_METHOD).ok_or_else(|| {
            CompileError::internal(format!("class '{}' has no __init__", class))
        })?;

        self.fb.add_local(NEW);
        self.alloc_words(layout.object_words());
        self.emit(Instr::LocalSet(NEW.to_string()));

        self.emit(Instr::LocalGet(NEW.to_string()));
        self.emit(Instr::I32Const(layout.vtable_base as i32));
        self.emit(Instr::I32Store { offset: 0 });

        for (index, field) in layout.fields.iter().enumerate() {
            self.emit(Instr::LocalGet(NEW.to_string()));
            self.emit(Instr::I32Const(field.init.as_word()));
            self.emit(Instr::I32Store {
                offset: ClassLayout::field_offset(index),
            });
        }

        self.emit(Instr::LocalGet(NEW.to_string()));
        self.emit(Instr::Call(init.to_string()));
        self.emit(Instr::Drop);
        self.emit(Instr::LocalGet(NEW.to_string()));
        Ok(())
    }

    /// Dynamic dispatch: the receiver is evaluated once, then passed as the
    /// first argument and used to find the vtable entry
    pub(super) fn emit_method_call(
        &mut self,
        object: &Expr,
        method: &str,
        args: &[Expr],
    ) -> CompileResult<()> {
        let layout = self.receiver_layout(object)?;
        let (slot, _) = layout.method(method).ok_or_else(|| {
            CompileError::internal(format!("class '{}' has no method '{}'", layout.name, method))
        })?;

        self.emit_checked_object(object)?;
        let receiver = self.fb.new_temp("#recv");
        self.emit(Instr::LocalSet(receiver.clone()));
        self.emit(Instr::LocalGet(receiver.clone()));
        for arg in args {
            self.emit_expr(arg)?;
        }

        self.emit(Instr::LocalGet(receiver));
        self.emit(Instr::I32Load { offset: 0 });
        self.emit(Instr::I32Const(slot as i32));
        self.emit(Instr::I32Add);
        let ty = self.module.signature(args.len() + 1);
        self.emit(Instr::CallIndirect { ty });
        Ok(())
    }

    /// `obj.field = value`
    pub(super) fn emit_field_store(
        &mut self,
        object: &Expr,
        field: &str,
        value: &Expr,
    ) -> CompileResult<()> {
        let offset = self.field_offset(object, field)?;
        self.emit_checked_object(object)?;
        self.emit_expr(value)?;
        self.emit(Instr::I32Store { offset });
        Ok(())
    }
}
