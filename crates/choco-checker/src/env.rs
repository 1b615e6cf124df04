//! Scope environment
//!
//! A stack of name → value scopes. The bottom scope is the module scope and
//! always exists; each function body pushes one scope on top of it.

use rustc_hash::FxHashMap;

/// Which scopes a lookup may search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// The current scope only
    Local,
    /// The bottom (module) scope only
    Global,
    /// Scopes strictly between the bottom and the current one, nearest first
    Nonlocal,
    /// The current scope, then the bottom scope
    LocalAndGlobal,
    /// Every scope, nearest first
    All,
}

/// Stack of scopes mapping names to values
#[derive(Debug, Clone)]
pub struct Env<T> {
    scopes: Vec<FxHashMap<String, T>>,
}

impl<T> Default for Env<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Env<T> {
    /// Create an environment holding only the bottom scope
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Number of scopes, including the bottom one
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Enter a new innermost scope
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the innermost scope, returning its contents.
    ///
    /// The bottom scope is never popped.
    pub fn pop_scope(&mut self) -> Option<FxHashMap<String, T>> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Bind `name` in the current scope, returning any value it replaces
    pub fn declare(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name, value),
            None => None,
        }
    }

    /// Look up `name` in the scopes selected by `mode`
    pub fn lookup(&self, name: &str, mode: SearchMode) -> Option<&T> {
        self.scope_order(mode)
            .into_iter()
            .find_map(|index| self.scopes[index].get(name))
    }

    /// Whether `name` is bound in the scopes selected by `mode`
    pub fn contains(&self, name: &str, mode: SearchMode) -> bool {
        self.lookup(name, mode).is_some()
    }

    /// Indices of the scopes searched by `mode`, in search order
    fn scope_order(&self, mode: SearchMode) -> Vec<usize> {
        let top = self.scopes.len() - 1;
        match mode {
            SearchMode::Local => vec![top],
            SearchMode::Global => vec![0],
            SearchMode::Nonlocal => (1..top).rev().collect(),
            SearchMode::LocalAndGlobal => {
                if top == 0 {
                    vec![0]
                } else {
                    vec![top, 0]
                }
            }
            SearchMode::All => (0..=top).rev().collect(),
        }
    }
}
