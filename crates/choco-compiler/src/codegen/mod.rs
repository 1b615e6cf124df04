//! Code generation
//!
//! Lowers a checked program to a [`Module`]. Memory model:
//!
//! - every value is one `i32`; `None` and the null object are 0
//! - objects live on a bump-allocated heap as `[vtable base, fields..]`
//! - a variable captured by a nested function lives in a one-word heap cell;
//!   its local slot, and every capture parameter that aliases it, holds the
//!   cell address
//! - methods dispatch through one indirect-call table holding every class's
//!   vtable segment
//!
//! All names the generator introduces start with `#`, which no source
//! identifier can contain.

mod class;
mod expr;
mod function;
mod stmt;

pub use function::FunctionEmitter;

use crate::error::{CompileError, CompileResult};
use crate::ir::{Export, Function, Import, Instr, Memory, Module};
use crate::module_builder::{FunctionBuilder, ModuleBuilder};
use crate::options::CompilerOptions;
use choco_checker::CheckedProgram;
use choco_parser::ast::{FunDef, Stmt};

/// Bump allocator: `(words) -> address`
pub const ALLOC: &str = "#alloc";
/// Next free heap address
pub const HEAP: &str = "#heap";
/// Null-object guard import: `(address) -> address`
pub const CHECK_INIT: &str = "#check_init";
/// The generated entry function
pub const ENTRY: &str = "#entry";
/// Sink for discarded expression statement values
pub const SCRATCH: &str = "#scratch";
/// Object under construction
pub const NEW: &str = "#new";
/// Cell being filled while boxing a parameter
pub const CELL: &str = "#cell";

/// Host functions: `(internal name, field, params, has result)`
const HOST_FUNCTIONS: [(&str, &str, usize, bool); 7] = [
    ("#print_num", "print_num", 1, false),
    ("#print_bool", "print_bool", 1, false),
    ("#print_none", "print_none", 1, false),
    ("#abs", "abs", 1, true),
    ("#min", "min", 2, true),
    ("#max", "max", 2, true),
    ("#pow", "pow", 2, true),
];

/// Generates a module from a checked program
pub struct CodeGenerator<'a> {
    program: &'a CheckedProgram,
    options: &'a CompilerOptions,
    builder: ModuleBuilder,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(program: &'a CheckedProgram, options: &'a CompilerOptions) -> Self {
        let memory = Memory {
            module: options.memory_module.clone(),
            field: options.memory_field.clone(),
            min_pages: options.memory_pages,
        };
        Self {
            program,
            options,
            builder: ModuleBuilder::new(memory),
        }
    }

    pub fn generate(mut self) -> CompileResult<Module> {
        let _span = tracing::debug_span!("codegen").entered();
        let program = self.program;

        self.declare_imports();
        self.declare_globals();

        for info in &program.functions {
            self.builder.signature(info.total_arity());
        }
        self.builder.set_table(program.classes.vtable().entries().to_vec());

        self.builder.add_function(alloc_function());
        let root_init = self.emit_root_init()?;
        self.builder.add_function(root_init);
        for class in &program.program.class_defs {
            for method in &class.methods {
                self.emit_function_tree(method)?;
            }
        }
        for fun in &program.program.fun_defs {
            self.emit_function_tree(fun)?;
        }

        let has_result = matches!(program.program.stmts.last(), Some(Stmt::Expr { .. }));
        let entry = self.emit_entry(has_result)?;
        self.builder.add_function(entry);
        self.builder.set_export(Export {
            name: self.options.entry_export.clone(),
            function: ENTRY.to_string(),
            has_result,
        });

        let module = self.builder.build()?;
        tracing::debug!(
            functions = module.functions.len(),
            table = module.table.len(),
            globals = module.globals.len(),
            "codegen complete"
        );
        Ok(module)
    }

    fn declare_imports(&mut self) {
        for (name, field, params, has_result) in HOST_FUNCTIONS {
            self.builder.add_import(Import {
                module: self.options.import_module.clone(),
                field: field.to_string(),
                name: name.to_string(),
                params,
                has_result,
            });
        }
        self.builder.add_import(Import {
            module: self.options.check_module.clone(),
            field: "check_init".to_string(),
            name: CHECK_INIT.to_string(),
            params: 1,
            has_result: true,
        });
    }

    fn declare_globals(&mut self) {
        self.builder.add_global(HEAP, self.options.heap_base as i32);
        for def in &self.program.program.var_defs {
            self.builder
                .add_global(def.var.name.name.clone(), def.init.as_word());
        }
    }

    /// Emit `fun` and every function nested in it
    fn emit_function_tree(&mut self, fun: &FunDef) -> CompileResult<()> {
        let function = self.emit_function(fun)?;
        self.builder.add_function(function);
        for nested in &fun.body.fun_defs {
            self.emit_function_tree(nested)?;
        }
        Ok(())
    }

    fn emit_function(&mut self, fun: &FunDef) -> CompileResult<Function> {
        let program = self.program;
        let id = fun.id.ok_or_else(|| {
            CompileError::internal(format!("function '{}' was not checked", fun.name.name))
        })?;
        let info = program.function(id);
        let _span = tracing::trace_span!("emit_function", name = %info.emitted_name).entered();

        let mut emitter = FunctionEmitter::new(program, &mut self.builder, &info.emitted_name);
        emitter.declare_frame(info)?;
        emitter.box_captured_params(info);
        for def in &fun.body.var_defs {
            emitter.init_var_def(def)?;
        }
        emitter.emit_block(&fun.body.stmts)?;
        emitter.emit(Instr::I32Const(0));
        Ok(emitter.finish())
    }

    /// The implicit root `__init__` does nothing
    fn emit_root_init(&self) -> CompileResult<Function> {
        let info = self.program.function(self.program.root_init);
        let mut fb = FunctionBuilder::new(info.emitted_name.clone());
        for &param in &info.params {
            fb.add_param(self.program.var(param).name.clone())?;
        }
        fb.emit(Instr::I32Const(0));
        Ok(fb.build())
    }

    /// The top-level statements, returning the last expression statement's
    /// value when there is one
    fn emit_entry(&mut self, has_result: bool) -> CompileResult<Function> {
        let program = self.program;
        let _span = tracing::trace_span!("emit_entry").entered();

        let mut emitter = FunctionEmitter::new(program, &mut self.builder, ENTRY);
        emitter.emit_block(&program.program.stmts)?;
        if has_result {
            emitter.emit(Instr::LocalGet(SCRATCH.to_string()));
        } else {
            emitter.emit(Instr::I32Const(0));
        }
        Ok(emitter.finish())
    }
}

/// `#alloc(words)`: return the current heap top and advance it
fn alloc_function() -> Function {
    let mut fb = FunctionBuilder::new(ALLOC);
    let words = "#words";
    let ptr = "#ptr";
    // A fresh builder has no parameters yet
    let _ = fb.add_param(words);
    fb.add_local(ptr);

    fb.emit(Instr::GlobalGet(HEAP.to_string()));
    fb.emit(Instr::LocalSet(ptr.to_string()));
    fb.emit(Instr::GlobalGet(HEAP.to_string()));
    fb.emit(Instr::LocalGet(words.to_string()));
    fb.emit(Instr::I32Const(4));
    fb.emit(Instr::I32Mul);
    fb.emit(Instr::I32Add);
    fb.emit(Instr::GlobalSet(HEAP.to_string()));
    fb.emit(Instr::LocalGet(ptr.to_string()));
    fb.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_shape() {
        let alloc = alloc_function();
        assert_eq!(alloc.params, vec!["#words".to_string()]);
        assert_eq!(alloc.locals, vec!["#ptr".to_string()]);
        assert_eq!(alloc.body.last(), Some(&Instr::LocalGet("#ptr".into())));
    }

    #[test]
    fn test_root_init_follows_alloc() {
        let module = crate::compile("class A(object):\n  x:int = 1\nprint(A().x)\n").unwrap();
        let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(&names[..2], [ALLOC, "object$__init__"]);

        let root = &module.functions[1];
        assert_eq!(root.params.len(), 1);
        assert_eq!(root.body, vec![Instr::I32Const(0)]);
    }
}
