//! Variable and function records
//!
//! Storage facts discovered during checking (whether a variable is captured,
//! whether its slot holds a cell address) live here, indexed by [`VarId`] and
//! [`FunId`], rather than in the tree.

use crate::captures::FunctionCaptures;
use choco_parser::ast::{FunId, VarId};
use choco_parser::Span;
use choco_types::{SlotType, Type};

/// Where a variable is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Module-level variable
    Global,
    /// Function parameter (including a method's `self`)
    Param,
    /// Function-level var-def
    Local,
    /// Alias of a variable owned by an enclosing function. The alias slot
    /// is a synthetic trailing parameter holding the origin's cell address.
    Capture { origin: VarId },
}

/// Everything known about one variable
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub name: String,
    pub ty: SlotType,
    pub kind: VarKind,
    /// Set when some nested function captures this variable. Its storage is
    /// then allocated in a heap cell at declaration.
    pub refed: bool,
    /// Whether assignments through this binding are allowed
    pub writable: bool,
    /// Declaring function; `None` for globals
    pub owner: Option<FunId>,
    pub span: Span,
}

impl VarInfo {
    /// Whether reads and writes go through a heap cell
    pub fn is_indirect(&self) -> bool {
        self.ty.boxed || self.refed
    }

    pub fn is_global(&self) -> bool {
        matches!(self.kind, VarKind::Global)
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.kind, VarKind::Capture { .. })
    }
}

/// Arena of every variable in a program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarArena {
    vars: Vec<VarInfo>,
}

impl VarArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, info: VarInfo) -> VarId {
        let id = VarId::new(self.vars.len() as u32);
        self.vars.push(info);
        id
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn get(&self, id: VarId) -> &VarInfo {
        &self.vars[id.index()]
    }

    pub fn get_mut(&mut self, id: VarId) -> &mut VarInfo {
        &mut self.vars[id.index()]
    }

    /// Record that a nested function captures `id`.
    ///
    /// Captures of captures need nothing: the alias already holds a cell
    /// address that can be passed on.
    pub fn mark_captured(&mut self, id: VarId) {
        let info = self.get_mut(id);
        if matches!(info.kind, VarKind::Local | VarKind::Param) {
            info.refed = true;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VarInfo)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, info)| (VarId::new(i as u32), info))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Signature and storage summary of one emitted function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// Name as written in source
    pub name: String,
    /// Name of the generated function (`outer$inner`, `Class$method`)
    pub emitted_name: String,
    /// Declared parameters, receiver first for methods
    pub params: Vec<VarId>,
    pub param_types: Vec<Type>,
    pub ret: Type,
    /// Synthetic trailing parameters
    pub captures: FunctionCaptures,
    /// Var-defs of the body
    pub locals: Vec<VarId>,
    /// Defining class for methods
    pub class: Option<String>,
    /// Enclosing function for nested functions
    pub parent: Option<FunId>,
    /// Generated without a source body (the root `__init__`)
    pub synthetic: bool,
    pub span: Span,
}

impl FunctionInfo {
    /// Arguments a call site supplies explicitly
    pub fn explicit_arity(&self) -> usize {
        if self.class.is_some() {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    /// Parameters of the generated function, captures included
    pub fn total_arity(&self) -> usize {
        self.params.len() + self.captures.len()
    }

    pub fn is_method(&self) -> bool {
        self.class.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, kind: VarKind) -> VarInfo {
        VarInfo {
            name: name.to_string(),
            ty: SlotType::plain(Type::Int),
            kind,
            refed: false,
            writable: true,
            owner: None,
            span: Span::default(),
        }
    }

    #[test]
    fn test_mark_captured_local() {
        let mut arena = VarArena::new();
        let x = arena.alloc(var("x", VarKind::Local));
        assert!(!arena.get(x).is_indirect());
        arena.mark_captured(x);
        assert!(arena.get(x).refed);
        assert!(arena.get(x).is_indirect());
    }

    #[test]
    fn test_mark_captured_alias_is_noop() {
        let mut arena = VarArena::new();
        let x = arena.alloc(var("x", VarKind::Param));
        let mut alias = var("x", VarKind::Capture { origin: x });
        alias.ty = SlotType::boxed(Type::Int);
        let a = arena.alloc(alias);
        arena.mark_captured(a);
        assert!(!arena.get(a).refed);
        assert!(arena.get(a).is_indirect());
    }

    #[test]
    fn test_ids_are_dense() {
        let mut arena = VarArena::new();
        let a = arena.alloc(var("a", VarKind::Global));
        let b = arena.alloc(var("b", VarKind::Global));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.iter().count(), 2);
    }
}
