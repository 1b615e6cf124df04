//! Type checker and closure analyzer
//!
//! Checks a parsed program in dependency order and annotates it in place:
//!
//! 1. class layouts are resolved
//! 2. module-level names are checked for clashes and globals are declared
//! 3. method signatures are declared root to leaves (so overrides can be
//!    compared against their ancestors), then top-level function signatures
//! 4. method bodies, function bodies and the top-level statements are checked
//!
//! Function bodies are checked recursively. A nested function is checked
//! before the statements of the function that defines it, so by the time a
//! call to it is checked its captures are known and can be matched against
//! the caller's variables.

mod expr;
mod stmt;

use crate::captures::{CaptureInfo, FunctionCaptures};
use crate::env::{Env, SearchMode};
use crate::error::{CheckError, CheckResult};
use crate::hierarchy::{method_target, ClassTable, INIT_METHOD};
use crate::returns::body_returns;
use crate::vars::{FunctionInfo, VarArena, VarInfo, VarKind};
use choco_parser::ast::*;
use choco_parser::Span;
use choco_types::{AssignabilityContext, SlotType, Type, OBJECT_CLASS};
use rustc_hash::{FxHashMap, FxHashSet};

/// Output of a successful check
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    /// The annotated tree
    pub program: Program,
    pub classes: ClassTable,
    pub vars: VarArena,
    /// Every function to emit, indexed by [`FunId`]
    pub functions: Vec<FunctionInfo>,
    /// Module-level variables in declaration order
    pub globals: Vec<VarId>,
    /// The implicit root `__init__`
    pub root_init: FunId,
}

impl CheckedProgram {
    pub fn function(&self, id: FunId) -> &FunctionInfo {
        &self.functions[id.index()]
    }

    pub fn var(&self, id: VarId) -> &VarInfo {
        self.vars.get(id)
    }

    /// Look up a function by its emitted name
    pub fn function_named(&self, emitted: &str) -> Option<(FunId, &FunctionInfo)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, info)| info.emitted_name == emitted)
            .map(|(i, info)| (FunId::new(i as u32), info))
    }
}

/// Check `program`, returning it annotated together with the facts the code
/// generator needs.
pub fn check(mut program: Program) -> CheckResult<CheckedProgram> {
    let _span = tracing::debug_span!("check").entered();

    let classes = ClassTable::resolve(&program.class_defs)?;
    let mut checker = Checker::new(classes);

    checker.check_module_names(&program)?;
    checker.declare_globals(&mut program.var_defs)?;
    let root_init = checker.declare_root_init();
    let methods = checker.declare_methods(&mut program.class_defs)?;

    let mut functions = Vec::with_capacity(program.fun_defs.len());
    for fun in &mut program.fun_defs {
        let emitted = fun.name.name.clone();
        let id = checker.declare_signature(fun, emitted, None, None)?;
        checker.fun_env.declare(fun.name.name.clone(), id);
        functions.push(id);
    }

    for (class_index, method_index, id) in methods {
        let method = &mut program.class_defs[class_index].methods[method_index];
        checker.check_function(method, id)?;
    }
    for (fun, id) in program.fun_defs.iter_mut().zip(functions) {
        checker.check_function(fun, id)?;
    }
    checker.check_block(&mut program.stmts)?;

    tracing::debug!(
        classes = checker.classes.len(),
        functions = checker.functions.len(),
        vars = checker.vars.len(),
        "check complete"
    );

    Ok(CheckedProgram {
        program,
        classes: checker.classes,
        vars: checker.vars,
        functions: checker.functions,
        globals: checker.globals,
        root_init,
    })
}

/// Per-function state while its body is checked
struct Frame {
    fun: FunId,
    ret: Type,
    captures: FunctionCaptures,
    /// Names explicitly declared in this body
    names: FxHashSet<String>,
}

pub(crate) struct Checker {
    classes: ClassTable,
    vars: VarArena,
    functions: Vec<FunctionInfo>,
    var_env: Env<VarId>,
    fun_env: Env<FunId>,
    frames: Vec<Frame>,
    /// Emitted method name to its function record
    method_funs: FxHashMap<String, FunId>,
    globals: Vec<VarId>,
}

impl Checker {
    fn new(classes: ClassTable) -> Self {
        Self {
            classes,
            vars: VarArena::new(),
            functions: Vec::new(),
            var_env: Env::new(),
            fun_env: Env::new(),
            frames: Vec::new(),
            method_funs: FxHashMap::default(),
            globals: Vec::new(),
        }
    }

    // ========================================================================
    // Module-level declarations
    // ========================================================================

    /// Variables, functions and classes share the module namespace with the
    /// builtins and the builtin type names.
    fn check_module_names(&self, program: &Program) -> CheckResult<()> {
        let mut names: FxHashSet<&str> = FxHashSet::default();
        names.extend(Builtin::ALL.iter().map(|b| b.name()));
        names.extend([OBJECT_CLASS, "int", "bool"]);

        let declared = program
            .class_defs
            .iter()
            .map(|c| &c.name)
            .chain(program.var_defs.iter().map(|v| &v.var.name))
            .chain(program.fun_defs.iter().map(|f| &f.name));

        for ident in declared {
            if !names.insert(ident.name.as_str()) {
                return Err(CheckError::DuplicateIdentifier {
                    name: ident.name.clone(),
                    span: ident.span,
                });
            }
        }
        Ok(())
    }

    fn declare_globals(&mut self, defs: &mut [VarDef]) -> CheckResult<()> {
        for def in defs {
            let ty = self.resolve_annotation(&def.var.annotation)?;
            self.check_initializer(def, &ty)?;
            let id = self.vars.alloc(VarInfo {
                name: def.var.name.name.clone(),
                ty: SlotType::plain(ty),
                kind: VarKind::Global,
                refed: false,
                writable: true,
                owner: None,
                span: def.span,
            });
            def.binding = Some(id);
            self.var_env.declare(def.var.name.name.clone(), id);
            self.globals.push(id);
        }
        Ok(())
    }

    fn declare_root_init(&mut self) -> FunId {
        let id = FunId::new(self.functions.len() as u32);
        let receiver = self.vars.alloc(VarInfo {
            name: "self".to_string(),
            ty: SlotType::plain(Type::object(OBJECT_CLASS)),
            kind: VarKind::Param,
            refed: false,
            writable: true,
            owner: Some(id),
            span: Span::default(),
        });
        let emitted = method_target(OBJECT_CLASS, INIT_METHOD);
        self.functions.push(FunctionInfo {
            name: INIT_METHOD.to_string(),
            emitted_name: emitted.clone(),
            params: vec![receiver],
            param_types: vec![Type::object(OBJECT_CLASS)],
            ret: Type::None,
            captures: FunctionCaptures::new(),
            locals: Vec::new(),
            class: Some(OBJECT_CLASS.to_string()),
            parent: None,
            synthetic: true,
            span: Span::default(),
        });
        self.method_funs.insert(emitted, id);
        id
    }

    /// Declare every method signature, ancestors first.
    ///
    /// Returns `(class index, method index, id)` for each method so the
    /// bodies can be checked afterwards.
    fn declare_methods(
        &mut self,
        class_defs: &mut [ClassDef],
    ) -> CheckResult<Vec<(usize, usize, FunId)>> {
        let by_name: FxHashMap<String, usize> = class_defs
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.name.clone(), i))
            .collect();
        let order: Vec<String> = self
            .classes
            .iter()
            .filter(|layout| layout.name != OBJECT_CLASS)
            .map(|layout| layout.name.clone())
            .collect();

        let mut declared = Vec::new();
        for class in order {
            let Some(&class_index) = by_name.get(&class) else {
                continue;
            };
            for (method_index, method) in class_defs[class_index].methods.iter_mut().enumerate()
            {
                let emitted = method_target(&class, &method.name.name);
                let id = self.declare_signature(method, emitted.clone(), Some(&class), None)?;
                self.check_method_signature(&class, id)?;
                self.method_funs.insert(emitted, id);
                declared.push((class_index, method_index, id));
            }
        }
        Ok(declared)
    }

    /// Resolve a function's parameter and return types and allocate its
    /// parameters.
    fn declare_signature(
        &mut self,
        fun: &mut FunDef,
        emitted_name: String,
        class: Option<&str>,
        parent: Option<FunId>,
    ) -> CheckResult<FunId> {
        let id = FunId::new(self.functions.len() as u32);

        let mut params = Vec::with_capacity(fun.params.len());
        let mut param_types = Vec::with_capacity(fun.params.len());
        for param in &fun.params {
            let ty = self.resolve_annotation(&param.annotation)?;
            params.push(self.vars.alloc(VarInfo {
                name: param.name.name.clone(),
                ty: SlotType::plain(ty.clone()),
                kind: VarKind::Param,
                refed: false,
                writable: true,
                owner: Some(id),
                span: param.name.span,
            }));
            param_types.push(ty);
        }

        let ret = match &fun.ret {
            Some(annotation) => self.resolve_annotation(annotation)?,
            None => Type::None,
        };

        self.functions.push(FunctionInfo {
            name: fun.name.name.clone(),
            emitted_name,
            params,
            param_types,
            ret,
            captures: FunctionCaptures::new(),
            locals: Vec::new(),
            class: class.map(str::to_string),
            parent,
            synthetic: false,
            span: fun.span,
        });
        fun.id = Some(id);
        Ok(id)
    }

    fn check_method_signature(&self, class: &str, id: FunId) -> CheckResult<()> {
        let info = &self.functions[id.index()];
        let invalid = |reason: &str| CheckError::InvalidMethodSignature {
            class: class.to_string(),
            method: info.name.clone(),
            reason: reason.to_string(),
            span: info.span,
        };

        let receiver_ok = info
            .params
            .first()
            .map(|&p| self.vars.get(p))
            .is_some_and(|p| p.name == "self" && p.ty.ty == Type::object(class));
        if !receiver_ok {
            return Err(invalid(&format!(
                "first parameter must be 'self' of type {}",
                class
            )));
        }

        if info.name == INIT_METHOD && (info.params.len() != 1 || info.ret != Type::None) {
            return Err(invalid("__init__ takes only 'self' and returns None"));
        }

        let inherited = self
            .classes
            .get(class)
            .and_then(|layout| layout.superclass.as_deref())
            .and_then(|superclass| self.classes.get(superclass))
            .and_then(|layout| layout.method_target(&info.name))
            .and_then(|target| self.method_funs.get(target));
        let Some(&ancestor) = inherited else {
            return Ok(());
        };
        let ancestor = &self.functions[ancestor.index()];

        let bad_override = |reason: String| CheckError::BadOverride {
            class: class.to_string(),
            method: info.name.clone(),
            reason,
            span: info.span,
        };

        if ancestor.params.len() != info.params.len() {
            return Err(bad_override(format!(
                "expected {} parameter(s), found {}",
                ancestor.params.len(),
                info.params.len()
            )));
        }
        for (expected, actual) in ancestor.param_types[1..].iter().zip(&info.param_types[1..]) {
            if expected != actual {
                return Err(bad_override(format!(
                    "parameter type {} differs from inherited {}",
                    actual, expected
                )));
            }
        }
        let ctx = AssignabilityContext::new(&self.classes);
        if !ctx.is_assignable(&info.ret, &ancestor.ret) {
            return Err(bad_override(format!(
                "return type {} is not assignable to inherited {}",
                info.ret, ancestor.ret
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Function bodies
    // ========================================================================

    fn check_function(&mut self, fun: &mut FunDef, id: FunId) -> CheckResult<()> {
        let _span = tracing::trace_span!(
            "check_function",
            name = %self.functions[id.index()].emitted_name
        )
        .entered();

        let ret = self.functions[id.index()].ret.clone();
        self.var_env.push_scope();
        self.fun_env.push_scope();
        self.frames.push(Frame {
            fun: id,
            ret,
            captures: FunctionCaptures::new(),
            names: FxHashSet::default(),
        });

        let result = self.check_function_scope(fun, id);

        self.var_env.pop_scope();
        self.fun_env.pop_scope();
        let frame = self.frames.pop();
        result?;

        if let Some(frame) = frame {
            tracing::trace!(
                function = %self.functions[id.index()].emitted_name,
                captures = frame.captures.len(),
                "function checked"
            );
            self.functions[id.index()].captures = frame.captures;
        }
        Ok(())
    }

    fn check_function_scope(&mut self, fun: &mut FunDef, id: FunId) -> CheckResult<()> {
        let params = self.functions[id.index()].params.clone();
        for (param, var) in fun.params.iter().zip(params) {
            self.declare_name(&param.name, var)?;
        }

        for decl in &fun.body.decls {
            self.check_scope_decl(decl, id)?;
        }

        for def in &mut fun.body.var_defs {
            let ty = self.resolve_annotation(&def.var.annotation)?;
            self.check_initializer(def, &ty)?;
            let var = self.vars.alloc(VarInfo {
                name: def.var.name.name.clone(),
                ty: SlotType::plain(ty),
                kind: VarKind::Local,
                refed: false,
                writable: true,
                owner: Some(id),
                span: def.span,
            });
            self.declare_name(&def.var.name, var)?;
            def.binding = Some(var);
            self.functions[id.index()].locals.push(var);
        }

        let ret = self.functions[id.index()].ret.clone();
        if ret != Type::None && !body_returns(&fun.body.stmts) {
            return Err(CheckError::MissingReturn {
                name: fun.name.name.clone(),
                span: fun.name.span,
            });
        }

        let parent_name = self.functions[id.index()].emitted_name.clone();
        for nested in &mut fun.body.fun_defs {
            self.claim_name(&nested.name)?;
            let emitted = format!("{}${}", parent_name, nested.name.name);
            let nested_id = self.declare_signature(nested, emitted, None, Some(id))?;
            self.fun_env.declare(nested.name.name.clone(), nested_id);
            self.check_function(nested, nested_id)?;
            self.propagate_captures(nested_id);
        }

        self.check_block(&mut fun.body.stmts)
    }

    fn check_scope_decl(&mut self, decl: &ScopeDecl, id: FunId) -> CheckResult<()> {
        let invalid = || CheckError::InvalidScopeDecl {
            name: decl.name.name.clone(),
            kind: decl.kind.to_string(),
            span: decl.span,
        };

        match decl.kind {
            ScopeKind::Global => {
                let var = self
                    .var_env
                    .lookup(&decl.name.name, SearchMode::Global)
                    .copied()
                    .filter(|&v| self.vars.get(v).is_global())
                    .ok_or_else(invalid)?;
                self.declare_name(&decl.name, var)
            }
            ScopeKind::Nonlocal => {
                let origin = self
                    .var_env
                    .lookup(&decl.name.name, SearchMode::Nonlocal)
                    .copied()
                    .filter(|&v| !self.vars.get(v).is_global())
                    .ok_or_else(invalid)?;
                self.claim_name(&decl.name)?;
                let alias = self.alloc_capture(&decl.name.name, origin, true, decl.span, id);
                self.var_env.declare(decl.name.name.clone(), alias);
                Ok(())
            }
        }
    }

    /// Thread the captures of a just-checked nested function through the
    /// current function: a capture not owned here becomes a capture here too.
    fn propagate_captures(&mut self, nested: FunId) {
        let Some(frame) = self.frames.last() else {
            return;
        };
        let owner = frame.fun;
        let pending: Vec<CaptureInfo> = self.functions[nested.index()]
            .captures
            .iter()
            .filter(|c| self.var_env.lookup(&c.name, SearchMode::Local).is_none())
            .cloned()
            .collect();

        for capture in pending {
            let alias = self.alloc_capture(&capture.name, capture.origin, false, capture.span, owner);
            self.var_env.declare(capture.name.clone(), alias);
        }
    }

    /// Allocate an alias for `origin` in the current function and record it
    /// as a capture.
    fn alloc_capture(
        &mut self,
        name: &str,
        origin: VarId,
        writable: bool,
        span: Span,
        owner: FunId,
    ) -> VarId {
        let ty = self.vars.get(origin).ty.ty.clone();
        let alias = self.vars.alloc(VarInfo {
            name: name.to_string(),
            ty: SlotType::boxed(ty),
            kind: VarKind::Capture { origin },
            refed: false,
            writable,
            owner: Some(owner),
            span,
        });
        self.vars.mark_captured(origin);

        if let Some(frame) = self.frames.last_mut() {
            frame.captures.add(CaptureInfo {
                name: name.to_string(),
                alias,
                origin,
                writable,
                span,
            });
        }
        alias
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn claim_name(&mut self, ident: &Ident) -> CheckResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if frame.names.insert(ident.name.clone()) {
            Ok(())
        } else {
            Err(CheckError::DuplicateIdentifier {
                name: ident.name.clone(),
                span: ident.span,
            })
        }
    }

    fn declare_name(&mut self, ident: &Ident, var: VarId) -> CheckResult<()> {
        self.claim_name(ident)?;
        self.var_env.declare(ident.name.clone(), var);
        Ok(())
    }

    fn resolve_annotation(&self, annotation: &TypeAnnotation) -> CheckResult<Type> {
        Type::from_annotation(&annotation.name, |name| self.classes.contains(name)).map_err(|_| {
            CheckError::UndefinedType {
                name: annotation.name.clone(),
                span: annotation.span,
            }
        })
    }

    /// An `int`/`bool` variable needs a literal of its own type; an object
    /// variable starts out as `None`.
    fn check_initializer(&self, def: &VarDef, ty: &Type) -> CheckResult<()> {
        let literal = def.init.ty();
        let ok = literal == *ty || (ty.is_object() && literal == Type::None);
        if ok {
            Ok(())
        } else {
            Err(CheckError::InvalidInitializer {
                name: def.var.name.name.clone(),
                expected: ty.to_string(),
                actual: literal.to_string(),
                span: def.init_span,
            })
        }
    }

    fn expect_assignable(&self, from: &Type, to: &Type, span: Span) -> CheckResult<()> {
        AssignabilityContext::new(&self.classes)
            .expect_assignable(from, to)
            .map_err(|_| CheckError::mismatch(to, from, span))
    }
}
