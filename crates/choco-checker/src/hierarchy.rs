//! Class hierarchy resolution
//!
//! Computes, for every class, its field layout and virtual method table.
//! Classes are visited breadth-first from the implicit `object` root, so a
//! class is always laid out after its superclass and each layout extends the
//! superclass's layout:
//!
//! - inherited field indices never move; own fields are appended
//! - an override reuses the inherited method slot; new methods are appended
//! - the method target of every own method points at this class's
//!   implementation, so dispatch through a shared slot reaches the most
//!   derived override
//!
//! Objects are laid out as `[vtable base, field 0, field 1, ...]`, one
//! 32-bit word per slot.

use crate::error::{CheckError, CheckResult};
use choco_parser::ast::{ClassDef, Literal};
use choco_parser::Span;
use choco_types::{ClassHierarchy, Type, OBJECT_CLASS};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::ops::Range;

/// Size in bytes of one object slot
pub const WORD_SIZE: u32 = 4;

/// Name of the constructor method
pub const INIT_METHOD: &str = "__init__";

/// One field of a class layout
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub ty: Type,
    pub init: Literal,
    /// Class that declared the field
    pub owner: String,
}

/// One vtable slot of a class layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub name: String,
    /// Emitted function implementing this slot for the class
    pub target: String,
    /// Class whose implementation `target` is
    pub owner: String,
}

/// Resolved layout of a single class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayout {
    pub name: String,
    pub superclass: Option<String>,
    /// Fields in slot order, inherited first
    pub fields: Vec<FieldLayout>,
    pub field_index: FxHashMap<String, usize>,
    /// Methods in slot order, inherited slots first
    pub methods: Vec<MethodEntry>,
    pub method_slot: FxHashMap<String, usize>,
    /// First table index of this class's vtable segment
    pub vtable_base: u32,
    pub span: Span,
}

impl ClassLayout {
    fn root() -> Self {
        let init = MethodEntry {
            name: INIT_METHOD.to_string(),
            target: method_target(OBJECT_CLASS, INIT_METHOD),
            owner: OBJECT_CLASS.to_string(),
        };
        let mut method_slot = FxHashMap::default();
        method_slot.insert(INIT_METHOD.to_string(), 0);

        Self {
            name: OBJECT_CLASS.to_string(),
            superclass: None,
            fields: Vec::new(),
            field_index: FxHashMap::default(),
            methods: vec![init],
            method_slot,
            vtable_base: 0,
            span: Span::default(),
        }
    }

    /// Look up a field and its index
    pub fn field(&self, name: &str) -> Option<(usize, &FieldLayout)> {
        let index = *self.field_index.get(name)?;
        self.fields.get(index).map(|field| (index, field))
    }

    /// Look up a method and its vtable slot
    pub fn method(&self, name: &str) -> Option<(usize, &MethodEntry)> {
        let slot = *self.method_slot.get(name)?;
        self.methods.get(slot).map(|entry| (slot, entry))
    }

    /// Emitted function name the slot for `name` dispatches to
    pub fn method_target(&self, name: &str) -> Option<&str> {
        self.method(name).map(|(_, entry)| entry.target.as_str())
    }

    /// Words occupied by an instance: the vtable word plus one per field
    pub fn object_words(&self) -> u32 {
        1 + self.fields.len() as u32
    }

    /// Byte offset of field `index` within an instance
    pub fn field_offset(index: usize) -> u32 {
        WORD_SIZE * (index as u32 + 1)
    }

    /// Table indices occupied by this class's vtable segment
    pub fn vtable_range(&self) -> Range<u32> {
        self.vtable_base..self.vtable_base + self.methods.len() as u32
    }
}

/// Emitted name of a method implementation
pub fn method_target(class: &str, method: &str) -> String {
    format!("{}${}", class, method)
}

/// The indirect-call table: every class's vtable segment, in hierarchy order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vtable {
    entries: Vec<String>,
    segments: FxHashMap<String, Range<u32>>,
}

impl Vtable {
    /// All table entries in index order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Table range of a class's segment
    pub fn segment(&self, class: &str) -> Option<Range<u32>> {
        self.segments.get(class).cloned()
    }

    /// Resolve the dispatch key `(class base, slot)` to its target
    pub fn lookup(&self, base: u32, slot: usize) -> Option<&str> {
        self.entries
            .get(base as usize + slot)
            .map(|target| target.as_str())
    }
}

/// Layouts of every class in the program, root first, in hierarchy order
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTable {
    layouts: Vec<ClassLayout>,
    index: FxHashMap<String, usize>,
}

impl ClassTable {
    /// Resolve the layouts of `classes` plus the implicit root.
    pub fn resolve(classes: &[ClassDef]) -> CheckResult<Self> {
        let _span = tracing::debug_span!("resolve_classes", count = classes.len()).entered();

        let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
        for (i, class) in classes.iter().enumerate() {
            let name = class.name.name.as_str();
            if is_reserved_class_name(name) || by_name.insert(name, i).is_some() {
                return Err(CheckError::DuplicateIdentifier {
                    name: name.to_string(),
                    span: class.name.span,
                });
            }
        }

        let mut children: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (i, class) in classes.iter().enumerate() {
            let superclass = class.superclass.name.as_str();
            if superclass != OBJECT_CLASS && !by_name.contains_key(superclass) {
                return Err(CheckError::UnknownSuperclass {
                    class: class.name.name.clone(),
                    superclass: superclass.to_string(),
                    span: class.superclass.span,
                });
            }
            children.entry(superclass).or_default().push(i);
        }

        let is_class = |name: &str| name == OBJECT_CLASS || by_name.contains_key(name);

        let mut table = ClassTable {
            layouts: vec![ClassLayout::root()],
            index: FxHashMap::default(),
        };
        table.index.insert(OBJECT_CLASS.to_string(), 0);
        let mut next_base = table.layouts[0].methods.len() as u32;

        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(OBJECT_CLASS);

        while let Some(parent_name) = queue.pop_front() {
            let Some(kids) = children.get(parent_name) else {
                continue;
            };
            for &child in kids {
                let def = &classes[child];
                let parent = table.layout_of(parent_name)?;
                let mut layout = extend_layout(parent, def, &is_class)?;
                layout.vtable_base = next_base;
                next_base += layout.methods.len() as u32;

                tracing::trace!(
                    class = %layout.name,
                    fields = layout.fields.len(),
                    methods = layout.methods.len(),
                    vtable_base = layout.vtable_base,
                    "resolved class layout"
                );

                table.index.insert(layout.name.clone(), table.layouts.len());
                table.layouts.push(layout);
                queue.push_back(def.name.name.as_str());
            }
        }

        if let Some(orphan) = classes
            .iter()
            .find(|class| !table.index.contains_key(&class.name.name))
        {
            return Err(CheckError::InheritanceCycle {
                class: orphan.name.name.clone(),
                span: orphan.name.span,
            });
        }

        Ok(table)
    }

    fn layout_of(&self, name: &str) -> CheckResult<&ClassLayout> {
        // Parents are always laid out before their children are dequeued
        self.get(name).ok_or_else(|| CheckError::InheritanceCycle {
            class: name.to_string(),
            span: Span::default(),
        })
    }

    /// Layout of the named class
    pub fn get(&self, name: &str) -> Option<&ClassLayout> {
        self.index.get(name).map(|&i| &self.layouts[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Layouts in hierarchy (breadth-first) order, root first
    pub fn iter(&self) -> impl Iterator<Item = &ClassLayout> {
        self.layouts.iter()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Build the indirect-call table from every class's methods
    pub fn vtable(&self) -> Vtable {
        let mut vtable = Vtable::default();
        for layout in &self.layouts {
            let start = vtable.entries.len() as u32;
            vtable
                .entries
                .extend(layout.methods.iter().map(|m| m.target.clone()));
            let end = vtable.entries.len() as u32;
            vtable.segments.insert(layout.name.clone(), start..end);
        }
        vtable
    }
}

impl ClassHierarchy for ClassTable {
    fn superclass_of(&self, class: &str) -> Option<&str> {
        self.get(class).and_then(|layout| layout.superclass.as_deref())
    }
}

fn is_reserved_class_name(name: &str) -> bool {
    matches!(name, "object" | "int" | "bool" | "None")
}

/// Lay out `def` as an extension of `parent`
fn extend_layout(
    parent: &ClassLayout,
    def: &ClassDef,
    is_class: &dyn Fn(&str) -> bool,
) -> CheckResult<ClassLayout> {
    let class = def.name.name.clone();
    let mut fields = parent.fields.clone();
    let mut field_index = parent.field_index.clone();
    let mut methods = parent.methods.clone();
    let mut method_slot = parent.method_slot.clone();

    for field in &def.fields {
        let name = &field.var.name.name;
        if field_index.contains_key(name) || method_slot.contains_key(name) {
            return Err(CheckError::DuplicateField {
                class: class.clone(),
                field: name.clone(),
                span: field.var.name.span,
            });
        }
        let annotation = &field.var.annotation;
        let ty = Type::from_annotation(&annotation.name, is_class).map_err(|_| {
            CheckError::UndefinedType {
                name: annotation.name.clone(),
                span: annotation.span,
            }
        })?;

        field_index.insert(name.clone(), fields.len());
        fields.push(FieldLayout {
            name: name.clone(),
            ty,
            init: field.init,
            owner: class.clone(),
        });
    }

    let mut own_methods: FxHashSet<&str> = FxHashSet::default();
    for method in &def.methods {
        let name = &method.name.name;
        if !own_methods.insert(name.as_str()) {
            return Err(CheckError::DuplicateIdentifier {
                name: name.clone(),
                span: method.name.span,
            });
        }
        if field_index.contains_key(name) {
            return Err(CheckError::DuplicateField {
                class: class.clone(),
                field: name.clone(),
                span: method.name.span,
            });
        }

        let entry = MethodEntry {
            name: name.clone(),
            target: method_target(&class, name),
            owner: class.clone(),
        };
        match method_slot.get(name) {
            Some(&slot) => methods[slot] = entry,
            None => {
                method_slot.insert(name.clone(), methods.len());
                methods.push(entry);
            }
        }
    }

    Ok(ClassLayout {
        name: class,
        superclass: Some(parent.name.clone()),
        fields,
        field_index,
        methods,
        method_slot,
        vtable_base: 0,
        span: def.span,
    })
}
