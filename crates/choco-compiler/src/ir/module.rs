//! Module structure
//!
//! The output of code generation: everything an assembler or the reference
//! runtime needs to load and run a program.

use super::instr::Instr;

/// A host function the module imports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Import module name
    pub module: String,
    /// Field name within the import module
    pub field: String,
    /// Name the module's code calls it by
    pub name: String,
    pub params: usize,
    pub has_result: bool,
}

/// Imported linear memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    pub module: String,
    pub field: String,
    /// Minimum size in 64 KiB pages
    pub min_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    pub name: String,
    pub mutable: bool,
    pub init: i32,
}

/// `(i32 x params) -> i32`, the signature shape for indirect calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub name: String,
    pub params: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    /// Non-parameter locals, zero-initialized on entry
    pub locals: Vec<String>,
    pub body: Vec<Instr>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Exported entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub function: String,
    /// Whether the entry's return value is the program's result
    pub has_result: bool,
}

/// A complete generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub imports: Vec<Import>,
    pub memory: Memory,
    pub types: Vec<FuncType>,
    pub globals: Vec<Global>,
    /// Indirect-call table contents, starting at index 0
    pub table: Vec<String>,
    pub functions: Vec<Function>,
    pub export: Export,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn import(&self, name: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.name == name)
    }

    pub fn func_type(&self, name: &str) -> Option<&FuncType> {
        self.types.iter().find(|t| t.name == name)
    }
}
