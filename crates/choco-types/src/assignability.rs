//! Assignability rules for the Choco type system
//!
//! `T` is assignable to `U` when a value of type `T` may be stored or passed
//! where `U` is expected:
//!
//! - `T == U`
//! - `T` is `None` and `U` is any object type
//! - `T` and `U` are object types and `T`'s class inherits from `U`'s class

use crate::ty::Type;
use crate::TypeError;
use rustc_hash::FxHashSet;

/// Read access to the superclass relation
pub trait ClassHierarchy {
    /// Superclass name of `class`, `None` for the root or unknown classes
    fn superclass_of(&self, class: &str) -> Option<&str>;
}

impl ClassHierarchy for rustc_hash::FxHashMap<String, String> {
    fn superclass_of(&self, class: &str) -> Option<&str> {
        self.get(class).map(|s| s.as_str())
    }
}

/// Context for checking assignability against a class hierarchy
pub struct AssignabilityContext<'a, H: ClassHierarchy + ?Sized> {
    classes: &'a H,
}

impl<'a, H: ClassHierarchy + ?Sized> AssignabilityContext<'a, H> {
    /// Create a new assignability context
    pub fn new(classes: &'a H) -> Self {
        Self { classes }
    }

    /// Check if a value of type `from` can be stored where `to` is expected
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        if from == to {
            return true;
        }

        match (from, to) {
            (Type::None, Type::Object(_)) => true,
            (Type::Object(sub), Type::Object(sup)) => self.is_subclass(sub, sup),
            _ => false,
        }
    }

    /// Check assignability, producing a mismatch error on failure
    pub fn expect_assignable(&self, from: &Type, to: &Type) -> Result<(), TypeError> {
        if self.is_assignable(from, to) {
            Ok(())
        } else {
            Err(TypeError::Mismatch {
                expected: to.to_string(),
                actual: from.to_string(),
            })
        }
    }

    /// Whether `sub` is `sup` or inherits from it (transitively)
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = Some(sub);

        while let Some(name) = current {
            if name == sup {
                return true;
            }
            // Guards against malformed hierarchies handed in by callers
            if !seen.insert(name) {
                return false;
            }
            current = self.classes.superclass_of(name);
        }

        false
    }
}
