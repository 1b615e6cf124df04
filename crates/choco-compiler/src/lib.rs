//! Choco Compiler
//!
//! Drives parsing and checking, then lowers the checked program to a
//! stack-machine [`Module`](ir::Module) that imports its memory and host
//! functions and exports a single entry function.
//!
//! ```ignore
//! let module = choco_compiler::compile("print(1 + 2)")?;
//! println!("{}", module.pretty_print());
//! ```

pub mod codegen;
pub mod error;
pub mod ir;
pub mod module_builder;
pub mod options;

pub use codegen::CodeGenerator;
pub use error::{CompileError, CompileResult, ErrorKind};
pub use ir::{Instr, Module, PrettyPrint};
pub use options::{CompilerOptions, OptionsError};

use choco_checker::CheckedProgram;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=choco_compiler=debug`
/// or `RUST_LOG=choco_checker=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Source-to-module compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn compile(&self, source: &str) -> CompileResult<Module> {
        let _span = tracing::info_span!("compile", bytes = source.len()).entered();
        let program = choco_parser::parse(source)?;
        let checked = choco_checker::check(program)?;
        self.compile_checked(&checked)
    }

    /// Generate code for an already checked program
    pub fn compile_checked(&self, program: &CheckedProgram) -> CompileResult<Module> {
        CodeGenerator::new(program, &self.options).generate()
    }
}

/// Compile with default options
pub fn compile(source: &str) -> CompileResult<Module> {
    Compiler::default().compile(source)
}

pub fn compile_with_options(source: &str, options: &CompilerOptions) -> CompileResult<Module> {
    Compiler::new(options.clone()).compile(source)
}

/// Compile and render the module as text
pub fn compile_to_text(source: &str) -> CompileResult<String> {
    Ok(compile(source)?.pretty_print())
}
