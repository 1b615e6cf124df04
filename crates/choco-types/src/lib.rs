//! Choco Type System
//!
//! Value types, storage flags and the assignability relation shared by the
//! checker and the code generator.

#![warn(missing_docs)]

pub mod assignability;
pub mod error;
pub mod ty;

pub use assignability::{AssignabilityContext, ClassHierarchy};
pub use error::TypeError;
pub use ty::{SlotType, Type, OBJECT_CLASS};
