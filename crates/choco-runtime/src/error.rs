//! Runtime errors

use thiserror::Error;

/// A fault raised while executing a module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Trap {
    /// A field or method was used on the null object
    #[error("Object not initialized")]
    ObjectNotInitialized,

    #[error("Integer division by zero")]
    DivisionByZero,

    #[error("Integer overflow")]
    IntegerOverflow,

    #[error("Memory access out of bounds at address {address}")]
    MemoryOutOfBounds { address: u64 },

    /// Indirect call through a table index with no entry
    #[error("Undefined table element {index}")]
    UndefinedElement { index: i32 },

    #[error("Indirect call type mismatch: expected {expected} parameters, found {actual}")]
    IndirectCallTypeMismatch { expected: usize, actual: usize },

    #[error("Call stack exhausted at depth {depth}")]
    CallStackExhausted { depth: usize },

    #[error("Invalid argument {value} to '{function}'")]
    InvalidArgument { function: String, value: i32 },

    #[error("Operand stack underflow")]
    StackUnderflow,

    #[error("Unreachable executed")]
    Unreachable,
}

/// A module that cannot be instantiated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Unknown import '{module}.{field}'")]
    UnknownImport { module: String, field: String },

    #[error("Import '{field}' has the wrong signature")]
    ImportSignature { field: String },

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Unknown global '{0}'")]
    UnknownGlobal(String),

    #[error("Unknown local '{name}' in '{function}'")]
    UnknownLocal { function: String, name: String },

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Unknown label '{label}' in '{function}'")]
    UnknownLabel { function: String, label: String },

    #[error("Unbalanced block structure in '{0}'")]
    UnbalancedBlock(String),

    #[error("Memory of {required} pages exceeds the limit of {limit}")]
    MemoryTooLarge { required: u32, limit: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Trap(#[from] Trap),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    /// The trap, if execution faulted
    pub fn trap(&self) -> Option<&Trap> {
        match self {
            RuntimeError::Trap(trap) => Some(trap),
            RuntimeError::Link(_) => None,
        }
    }
}
