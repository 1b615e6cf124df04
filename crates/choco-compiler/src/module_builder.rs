//! Module builder for constructing generated modules

use crate::error::{CompileError, CompileResult};
use crate::ir::{Export, FuncType, Function, Global, Import, Instr, Memory, Module};
use rustc_hash::{FxHashMap, FxHashSet};

/// Helper for building modules
pub struct ModuleBuilder {
    imports: Vec<Import>,
    memory: Memory,
    types: Vec<FuncType>,
    type_index: FxHashMap<usize, usize>,
    globals: Vec<Global>,
    table: Vec<String>,
    functions: Vec<Function>,
    export: Option<Export>,
}

impl ModuleBuilder {
    pub fn new(memory: Memory) -> Self {
        Self {
            imports: Vec::new(),
            memory,
            types: Vec::new(),
            type_index: FxHashMap::default(),
            globals: Vec::new(),
            table: Vec::new(),
            functions: Vec::new(),
            export: None,
        }
    }

    pub fn add_import(&mut self, import: Import) {
        self.imports.push(import);
    }

    pub fn add_global(&mut self, name: impl Into<String>, init: i32) {
        self.globals.push(Global {
            name: name.into(),
            mutable: true,
            init,
        });
    }

    /// The signature type for `arity` parameters, creating it on first use
    pub fn signature(&mut self, arity: usize) -> String {
        if let Some(&index) = self.type_index.get(&arity) {
            return self.types[index].name.clone();
        }
        let name = format!("#sig{}", arity);
        self.type_index.insert(arity, self.types.len());
        self.types.push(FuncType {
            name: name.clone(),
            params: arity,
        });
        name
    }

    pub fn set_table(&mut self, entries: Vec<String>) {
        self.table = entries;
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn set_export(&mut self, export: Export) {
        self.export = Some(export);
    }

    /// Build the final module
    pub fn build(mut self) -> CompileResult<Module> {
        let export = self
            .export
            .take()
            .ok_or_else(|| CompileError::internal("module has no entry export"))?;

        let mut seen = FxHashSet::default();
        let duplicate = self
            .imports
            .iter()
            .map(|i| i.name.as_str())
            .chain(self.functions.iter().map(|f| f.name.as_str()))
            .find(|name| !seen.insert(*name));
        if let Some(name) = duplicate {
            return Err(CompileError::internal(format!(
                "function '{}' defined twice",
                name
            )));
        }

        self.types.sort_by_key(|ty| ty.params);

        Ok(Module {
            imports: self.imports,
            memory: self.memory,
            types: self.types,
            globals: self.globals,
            table: self.table,
            functions: self.functions,
            export,
        })
    }
}

/// Helper for building one function body
pub struct FunctionBuilder {
    name: String,
    params: Vec<String>,
    locals: Vec<String>,
    declared: FxHashSet<String>,
    body: Vec<Instr>,
    next_label: u32,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            locals: Vec::new(),
            declared: FxHashSet::default(),
            body: Vec::new(),
            next_label: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_param(&mut self, name: impl Into<String>) -> CompileResult<()> {
        let name = name.into();
        if !self.declared.insert(name.clone()) {
            return Err(CompileError::internal(format!(
                "parameter '{}' declared twice in '{}'",
                name, self.name
            )));
        }
        self.params.push(name);
        Ok(())
    }

    /// Declare a local. Declaring the same name again is a no-op.
    pub fn add_local(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.declared.insert(name.clone()) {
            self.locals.push(name);
        }
    }

    pub fn emit(&mut self, instr: Instr) {
        self.body.push(instr);
    }

    /// A label name unique within this function
    pub fn new_label(&mut self, prefix: &str) -> String {
        let label = format!("{}{}", prefix, self.next_label);
        self.next_label += 1;
        label
    }

    /// A fresh local unique within this function
    pub fn new_temp(&mut self, prefix: &str) -> String {
        let name = self.new_label(prefix);
        self.add_local(name.clone());
        name
    }

    /// Get current code position
    pub fn current_position(&self) -> usize {
        self.body.len()
    }

    pub fn build(self) -> Function {
        Function {
            name: self.name,
            params: self.params,
            locals: self.locals,
            body: self.body,
        }
    }
}
