//! Type system errors

use thiserror::Error;

/// Errors that can occur while resolving and comparing types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Type mismatch between expected and actual types
    #[error("Type mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Annotation naming a class that does not exist
    #[error("Invalid type annotation; there is no class named: {name}")]
    UndefinedType {
        /// Type name that was not found
        name: String,
    },
}
