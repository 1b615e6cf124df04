//! Per-function emission state and variable access

use super::{ALLOC, CELL};
use crate::error::{CompileError, CompileResult};
use crate::ir::{Function, Instr};
use crate::module_builder::{FunctionBuilder, ModuleBuilder};
use choco_checker::{CheckedProgram, FunctionInfo, VarInfo};
use choco_parser::ast::{VarDef, VarId};

/// Emits the body of one generated function
pub struct FunctionEmitter<'a, 'b> {
    pub(super) program: &'a CheckedProgram,
    pub(super) module: &'b mut ModuleBuilder,
    pub(super) fb: FunctionBuilder,
}

impl<'a, 'b> FunctionEmitter<'a, 'b> {
    pub fn new(program: &'a CheckedProgram, module: &'b mut ModuleBuilder, name: &str) -> Self {
        Self {
            program,
            module,
            fb: FunctionBuilder::new(name),
        }
    }

    pub fn emit(&mut self, instr: Instr) {
        self.fb.emit(instr);
    }

    pub fn finish(self) -> Function {
        self.fb.build()
    }

    /// Declare parameters (declared ones, then captures) and var-def locals
    pub fn declare_frame(&mut self, info: &FunctionInfo) -> CompileResult<()> {
        for &param in info.params.iter() {
            self.fb.add_param(self.program.var(param).name.clone())?;
        }
        for alias in info.captures.aliases() {
            self.fb.add_param(self.program.var(alias).name.clone())?;
        }
        for &local in &info.locals {
            self.fb.add_local(self.program.var(local).name.clone());
        }
        Ok(())
    }

    /// Move each captured parameter's incoming value into a fresh cell and
    /// keep the cell address in the parameter slot
    pub fn box_captured_params(&mut self, info: &FunctionInfo) {
        for &param in &info.params {
            let var = self.program.var(param);
            if !var.refed {
                continue;
            }
            let name = var.name.clone();
            self.fb.add_local(CELL);
            self.alloc_words(1);
            self.emit(Instr::LocalSet(CELL.to_string()));
            self.emit(Instr::LocalGet(CELL.to_string()));
            self.emit(Instr::LocalGet(name.clone()));
            self.emit(Instr::I32Store { offset: 0 });
            self.emit(Instr::LocalGet(CELL.to_string()));
            self.emit(Instr::LocalSet(name));
        }
    }

    /// Initialize a function-level var-def, in a cell when it is captured
    pub fn init_var_def(&mut self, def: &VarDef) -> CompileResult<()> {
        let var = self.binding(def.binding, &def.var.name.name)?;
        let name = var.name.clone();
        let word = def.init.as_word();
        if var.refed {
            self.alloc_words(1);
            self.emit(Instr::LocalSet(name.clone()));
            self.emit(Instr::LocalGet(name));
            self.emit(Instr::I32Const(word));
            self.emit(Instr::I32Store { offset: 0 });
        } else {
            self.emit(Instr::I32Const(word));
            self.emit(Instr::LocalSet(name));
        }
        Ok(())
    }

    /// `[] -> [address]`
    pub(super) fn alloc_words(&mut self, words: u32) {
        self.emit(Instr::I32Const(words as i32));
        self.emit(Instr::Call(ALLOC.to_string()));
    }

    /// Resolve a checker-assigned binding
    pub(super) fn binding(&self, binding: Option<VarId>, name: &str) -> CompileResult<&'a VarInfo> {
        let program = self.program;
        binding
            .map(|id| program.var(id))
            .ok_or_else(|| CompileError::internal(format!("variable '{}' was not resolved", name)))
    }

    /// `[] -> [value]`
    pub(super) fn load_var(&mut self, var: &VarInfo) {
        if var.is_global() {
            self.emit(Instr::GlobalGet(var.name.clone()));
        } else {
            self.emit(Instr::LocalGet(var.name.clone()));
            if var.is_indirect() {
                self.emit(Instr::I32Load { offset: 0 });
            }
        }
    }

    /// `[] -> [cell address]` for a variable passed to a nested function
    pub(super) fn load_cell(&mut self, var: &VarInfo) -> CompileResult<()> {
        if var.is_global() || !var.is_indirect() {
            return Err(CompileError::internal(format!(
                "variable '{}' is captured but has no cell",
                var.name
            )));
        }
        self.emit(Instr::LocalGet(var.name.clone()));
        Ok(())
    }
}
