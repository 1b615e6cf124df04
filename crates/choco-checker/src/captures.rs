//! Closure capture analysis
//!
//! Records which enclosing variables a nested function captures. Each
//! capture becomes a trailing synthetic parameter of the function carrying
//! the address of the captured variable's heap cell.

use choco_parser::ast::VarId;
use choco_parser::Span;
use rustc_hash::FxHashMap;

/// A single captured variable
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureInfo {
    /// Name of the captured variable
    pub name: String,
    /// The alias variable inside the capturing function
    pub alias: VarId,
    /// Variable in an enclosing function that owns the storage
    pub origin: VarId,
    /// Whether the capture was declared `nonlocal` (and may be assigned)
    pub writable: bool,
    /// First place the capture was introduced
    pub span: Span,
}

/// All captures of one function, in parameter order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionCaptures {
    captures: Vec<CaptureInfo>,
    indices: FxHashMap<String, usize>,
}

impl FunctionCaptures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capture. A name that is already captured keeps its first entry.
    pub fn add(&mut self, info: CaptureInfo) {
        if !self.indices.contains_key(&info.name) {
            self.indices.insert(info.name.clone(), self.captures.len());
            self.captures.push(info);
        }
    }

    pub fn is_captured(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CaptureInfo> {
        self.indices.get(name).map(|&idx| &self.captures[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptureInfo> {
        self.captures.iter()
    }

    /// Alias variables in parameter order
    pub fn aliases(&self) -> impl Iterator<Item = VarId> + '_ {
        self.captures.iter().map(|c| c.alias)
    }

    /// Captures declared `nonlocal`
    pub fn writable(&self) -> impl Iterator<Item = &CaptureInfo> {
        self.captures.iter().filter(|c| c.writable)
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(name: &str, alias: u32, writable: bool) -> CaptureInfo {
        CaptureInfo {
            name: name.to_string(),
            alias: VarId::new(alias),
            origin: VarId::new(0),
            writable,
            span: Span::default(),
        }
    }

    #[test]
    fn test_first_capture_wins() {
        let mut captures = FunctionCaptures::new();
        captures.add(capture("a", 1, true));
        captures.add(capture("b", 2, false));
        captures.add(capture("a", 3, false));

        assert_eq!(captures.len(), 2);
        assert_eq!(captures.get("a").map(|c| c.alias), Some(VarId::new(1)));
        let order: Vec<_> = captures.aliases().collect();
        assert_eq!(order, vec![VarId::new(1), VarId::new(2)]);
    }

    #[test]
    fn test_writable_filter() {
        let mut captures = FunctionCaptures::new();
        captures.add(capture("a", 1, true));
        captures.add(capture("b", 2, false));
        let names: Vec<_> = captures.writable().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        assert!(captures.is_captured("b"));
        assert!(!captures.is_captured("c"));
    }
}
