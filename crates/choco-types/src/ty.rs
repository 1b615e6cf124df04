//! Core type definitions for the Choco type system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the implicit root of every class hierarchy
pub const OBJECT_CLASS: &str = "object";

/// A value type
///
/// Every value of every type is represented as a single 32-bit word at run
/// time: ints directly, bools as 0/1, `None` as 0 and objects as heap
/// addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// 32-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// The type of the `None` literal
    None,
    /// Reference to an instance of the named class
    Object(String),
}

impl Type {
    /// Build an object type for the given class name
    pub fn object(class: impl Into<String>) -> Self {
        Type::Object(class.into())
    }

    /// Resolve a type annotation by name.
    ///
    /// `int`, `bool` and `None` are builtin. Any other name must satisfy
    /// `is_class`.
    pub fn from_annotation(
        name: &str,
        is_class: impl Fn(&str) -> bool,
    ) -> Result<Self, crate::TypeError> {
        match name {
            "int" => Ok(Type::Int),
            "bool" => Ok(Type::Bool),
            "None" => Ok(Type::None),
            other if is_class(other) => Ok(Type::Object(other.to_string())),
            other => Err(crate::TypeError::UndefinedType {
                name: other.to_string(),
            }),
        }
    }

    /// Whether this is an object reference type
    pub fn is_object(&self) -> bool {
        matches!(self, Type::Object(_))
    }

    /// Whether values of this type may take part in `is` comparisons
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Object(_) | Type::None)
    }

    /// The class name of an object type
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::None => write!(f, "None"),
            Type::Object(name) => write!(f, "{}", name),
        }
    }
}

/// A type together with how its storage is reached.
///
/// `boxed` is a storage property: the variable's slot holds the address of a
/// one-word heap cell rather than the value itself. It never takes part in
/// type comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotType {
    /// The value type
    pub ty: Type,
    /// Whether reads and writes go through a heap cell
    pub boxed: bool,
}

impl SlotType {
    /// Directly stored value
    pub fn plain(ty: Type) -> Self {
        Self { ty, boxed: false }
    }

    /// Value stored behind a heap cell
    pub fn boxed(ty: Type) -> Self {
        Self { ty, boxed: true }
    }

    /// Compare value types, ignoring storage
    pub fn same_type(&self, other: &SlotType) -> bool {
        self.ty == other.ty
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.boxed {
            write!(f, "box<{}>", self.ty)
        } else {
            write!(f, "{}", self.ty)
        }
    }
}
