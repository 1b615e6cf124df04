//! Module linking
//!
//! Resolves every name in a module to an index and flattens structured
//! control flow into jumps. Imports come first in the function index space.

use crate::error::LinkError;
use crate::host::HostFunction;
use choco_compiler::ir::{Function, Instr, Module};
use rustc_hash::FxHashMap;

/// A linked instruction. Jump targets are positions in the same body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Const(i32),
    LocalGet(usize),
    LocalSet(usize),
    GlobalGet(usize),
    GlobalSet(usize),
    Load(u32),
    Store(u32),
    Add,
    Sub,
    Mul,
    DivS,
    RemS,
    Eq,
    Ne,
    LtS,
    GtS,
    LeS,
    GeS,
    Eqz,
    Call(usize),
    CallIndirect { params: usize },
    Drop,
    Return,
    Unreachable,
    Jump(usize),
    JumpIf(usize),
    JumpUnless(usize),
}

#[derive(Debug, Clone)]
pub struct LinkedFunction {
    pub name: String,
    pub params: usize,
    /// Parameters plus locals
    pub slots: usize,
    pub code: Vec<Op>,
}

#[derive(Debug, Clone, Copy)]
pub struct LinkedImport {
    pub function: HostFunction,
}

#[derive(Debug, Clone)]
pub struct LinkedModule {
    pub imports: Vec<LinkedImport>,
    pub functions: Vec<LinkedFunction>,
    pub globals: Vec<i32>,
    /// Function indices
    pub table: Vec<usize>,
    pub memory_pages: u32,
    pub entry: usize,
    pub entry_has_result: bool,
}

impl LinkedModule {
    /// Parameter count and result presence of a function index
    pub fn signature(&self, index: usize) -> Option<(usize, bool)> {
        if let Some(import) = self.imports.get(index) {
            return Some((import.function.params(), import.function.has_result()));
        }
        self.functions
            .get(index - self.imports.len())
            .map(|f| (f.params, true))
    }
}

pub fn link(module: &Module) -> Result<LinkedModule, LinkError> {
    let _span = tracing::debug_span!("link", functions = module.functions.len()).entered();

    let mut imports = Vec::with_capacity(module.imports.len());
    for import in &module.imports {
        let function =
            HostFunction::from_field(&import.field).ok_or_else(|| LinkError::UnknownImport {
                module: import.module.clone(),
                field: import.field.clone(),
            })?;
        if function.params() != import.params || function.has_result() != import.has_result {
            return Err(LinkError::ImportSignature {
                field: import.field.clone(),
            });
        }
        imports.push(LinkedImport { function });
    }

    let function_index: FxHashMap<&str, usize> = module
        .imports
        .iter()
        .map(|i| i.name.as_str())
        .chain(module.functions.iter().map(|f| f.name.as_str()))
        .enumerate()
        .map(|(index, name)| (name, index))
        .collect();
    let global_index: FxHashMap<&str, usize> = module
        .globals
        .iter()
        .enumerate()
        .map(|(index, g)| (g.name.as_str(), index))
        .collect();

    let resolver = Resolver {
        module,
        functions: &function_index,
        globals: &global_index,
    };

    let functions = module
        .functions
        .iter()
        .map(|f| resolver.link_function(f))
        .collect::<Result<Vec<_>, _>>()?;

    let table = module
        .table
        .iter()
        .map(|name| resolver.function(name))
        .collect::<Result<Vec<_>, _>>()?;

    let entry = resolver.function(&module.export.function)?;

    tracing::trace!(
        imports = imports.len(),
        functions = functions.len(),
        table = table.len(),
        "linked module"
    );

    Ok(LinkedModule {
        imports,
        functions,
        globals: module.globals.iter().map(|g| g.init).collect(),
        table,
        memory_pages: module.memory.min_pages,
        entry,
        entry_has_result: module.export.has_result,
    })
}

struct Resolver<'a> {
    module: &'a Module,
    functions: &'a FxHashMap<&'a str, usize>,
    globals: &'a FxHashMap<&'a str, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionKind {
    Block,
    Loop,
    If,
}

/// An open `block`, `loop` or `if`
struct Region<'a> {
    label: Option<&'a str>,
    kind: RegionKind,
    /// Loop head
    start: usize,
    /// Jumps to patch with the region's end
    pending: Vec<usize>,
}

impl<'a> Resolver<'a> {
    fn function(&self, name: &str) -> Result<usize, LinkError> {
        self.functions
            .get(name)
            .copied()
            .ok_or_else(|| LinkError::UnknownFunction(name.to_string()))
    }

    fn global(&self, name: &str) -> Result<usize, LinkError> {
        self.globals
            .get(name)
            .copied()
            .ok_or_else(|| LinkError::UnknownGlobal(name.to_string()))
    }

    fn link_function(&self, function: &Function) -> Result<LinkedFunction, LinkError> {
        let slots: FxHashMap<&str, usize> = function
            .params
            .iter()
            .chain(function.locals.iter())
            .enumerate()
            .map(|(index, name)| (name.as_str(), index))
            .collect();
        let local = |name: &str| {
            slots
                .get(name)
                .copied()
                .ok_or_else(|| LinkError::UnknownLocal {
                    function: function.name.clone(),
                    name: name.to_string(),
                })
        };
        let unbalanced = || LinkError::UnbalancedBlock(function.name.clone());

        let mut code: Vec<Op> = Vec::with_capacity(function.body.len());
        let mut regions: Vec<Region> = Vec::new();

        for instr in &function.body {
            let op = match instr {
                Instr::I32Const(n) => Op::Const(*n),
                Instr::LocalGet(name) => Op::LocalGet(local(name.as_str())?),
                Instr::LocalSet(name) => Op::LocalSet(local(name.as_str())?),
                Instr::GlobalGet(name) => Op::GlobalGet(self.global(name)?),
                Instr::GlobalSet(name) => Op::GlobalSet(self.global(name)?),
                Instr::I32Load { offset } => Op::Load(*offset),
                Instr::I32Store { offset } => Op::Store(*offset),
                Instr::I32Add => Op::Add,
                Instr::I32Sub => Op::Sub,
                Instr::I32Mul => Op::Mul,
                Instr::I32DivS => Op::DivS,
                Instr::I32RemS => Op::RemS,
                Instr::I32Eq => Op::Eq,
                Instr::I32Ne => Op::Ne,
                Instr::I32LtS => Op::LtS,
                Instr::I32GtS => Op::GtS,
                Instr::I32LeS => Op::LeS,
                Instr::I32GeS => Op::GeS,
                Instr::I32Eqz => Op::Eqz,
                Instr::Call(name) => Op::Call(self.function(name)?),
                Instr::CallIndirect { ty } => {
                    let ty = self
                        .module
                        .func_type(ty)
                        .ok_or_else(|| LinkError::UnknownType(ty.clone()))?;
                    Op::CallIndirect { params: ty.params }
                }
                Instr::Drop => Op::Drop,
                Instr::Return => Op::Return,
                Instr::Unreachable => Op::Unreachable,

                Instr::Block(label) | Instr::Loop(label) => {
                    let kind = if matches!(instr, Instr::Loop(_)) {
                        RegionKind::Loop
                    } else {
                        RegionKind::Block
                    };
                    regions.push(Region {
                        label: Some(label.as_str()),
                        kind,
                        start: code.len(),
                        pending: Vec::new(),
                    });
                    continue;
                }
                Instr::If => {
                    regions.push(Region {
                        label: None,
                        kind: RegionKind::If,
                        start: code.len(),
                        pending: vec![code.len()],
                    });
                    Op::JumpUnless(usize::MAX)
                }
                Instr::Else => {
                    let region = regions.last_mut().ok_or_else(unbalanced)?;
                    if region.kind != RegionKind::If {
                        return Err(unbalanced());
                    }
                    let skip_else = code.len();
                    code.push(Op::Jump(usize::MAX));
                    // The false branch of the condition starts here
                    for at in region.pending.drain(..) {
                        patch(&mut code, at, skip_else + 1);
                    }
                    region.pending.push(skip_else);
                    continue;
                }
                Instr::End => {
                    let region = regions.pop().ok_or_else(unbalanced)?;
                    let end = code.len();
                    for at in region.pending {
                        patch(&mut code, at, end);
                    }
                    continue;
                }
                Instr::Br(label) | Instr::BrIf(label) => {
                    let region = regions
                        .iter_mut()
                        .rev()
                        .find(|r| r.label == Some(label.as_str()))
                        .ok_or_else(|| LinkError::UnknownLabel {
                            function: function.name.clone(),
                            label: label.clone(),
                        })?;
                    let conditional = matches!(instr, Instr::BrIf(_));
                    let target = if region.kind == RegionKind::Loop {
                        region.start
                    } else {
                        region.pending.push(code.len());
                        usize::MAX
                    };
                    if conditional {
                        Op::JumpIf(target)
                    } else {
                        Op::Jump(target)
                    }
                }
            };
            code.push(op);
        }

        if !regions.is_empty() {
            return Err(unbalanced());
        }

        Ok(LinkedFunction {
            name: function.name.clone(),
            params: function.params.len(),
            slots: slots.len(),
            code,
        })
    }
}

fn patch(code: &mut [Op], at: usize, target: usize) {
    if let Some(Op::Jump(t) | Op::JumpIf(t) | Op::JumpUnless(t)) = code.get_mut(at) {
        *t = target;
    }
}
