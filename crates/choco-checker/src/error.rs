//! Error types for layout resolution and type checking
//!
//! Every error carries the source span it refers to and belongs to one of
//! three categories reported by [`CheckError::kind`].

use choco_parser::Span;
use thiserror::Error;

/// Result type for checker operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Category of a checker error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckErrorKind {
    /// Undeclared or inaccessible name
    Reference,
    /// Type mismatch or invalid signature
    Type,
    /// Invalid class layout or duplicate declaration
    Layout,
}

/// Errors that can occur during checking
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckError {
    // ------------------------------------------------------------------
    // Reference errors
    // ------------------------------------------------------------------
    /// Read of a name that is not visible
    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        /// Variable name
        name: String,
        /// Location of the reference
        span: Span,
    },

    /// Call to a name that is neither a function, a class nor a builtin
    #[error("Undefined function '{name}'")]
    UndefinedFunction {
        /// Function name
        name: String,
        /// Location of the call
        span: Span,
    },

    /// Assignment to a name not owned by or declared in the current scope
    #[error("Cannot assign variable '{name}' that is not explicitly declared in this scope")]
    UndeclaredAssignment {
        /// Variable name
        name: String,
        /// Location of the assignment target
        span: Span,
    },

    /// `global`/`nonlocal` naming a variable outside the required band
    #[error("'{name}' is not a {kind} variable")]
    InvalidScopeDecl {
        /// Declared name
        name: String,
        /// `global` or `nonlocal`
        kind: String,
        /// Location of the declaration
        span: Span,
    },

    /// Field access on a class without that field
    #[error("Class '{class}' has no field '{field}'")]
    UnknownField {
        /// Receiver class
        class: String,
        /// Field name
        field: String,
        /// Location of the access
        span: Span,
    },

    /// Method call on a class without that method
    #[error("Class '{class}' has no method '{method}'")]
    UnknownMethod {
        /// Receiver class
        class: String,
        /// Method name
        method: String,
        /// Location of the call
        span: Span,
    },

    /// A nested function's capture could not be matched in its caller
    #[error("Captured variable '{name}' is not reachable from this call")]
    UnresolvedCapture {
        /// Captured variable name
        name: String,
        /// Location of the call
        span: Span,
    },

    // ------------------------------------------------------------------
    // Type errors
    // ------------------------------------------------------------------
    /// Type mismatch
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
        /// Location of the offending expression
        span: Span,
    },

    /// Binary operator applied to unsupported operand types
    #[error("Operator '{op}' cannot be applied to {left} and {right}")]
    InvalidBinaryOp {
        /// Operator
        op: String,
        /// Left operand type
        left: String,
        /// Right operand type
        right: String,
        /// Location of the expression
        span: Span,
    },

    /// Unary operator applied to an unsupported operand type
    #[error("Operator '{op}' cannot be applied to {operand}")]
    InvalidUnaryOp {
        /// Operator
        op: String,
        /// Operand type
        operand: String,
        /// Location of the expression
        span: Span,
    },

    /// Wrong number of call arguments
    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    ArgumentCountMismatch {
        /// Callee name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
        /// Location of the call
        span: Span,
    },

    /// Field access or method call on a non-object value
    #[error("Expected an object, got {actual}")]
    NotAnObject {
        /// Actual type
        actual: String,
        /// Location of the receiver
        span: Span,
    },

    /// Annotation naming an unknown class
    #[error("Invalid type annotation; there is no class named: {name}")]
    UndefinedType {
        /// Annotation text
        name: String,
        /// Location of the annotation
        span: Span,
    },

    /// A non-`None` function with a path that does not return
    #[error("All paths in function '{name}' must have a return statement")]
    MissingReturn {
        /// Function name
        name: String,
        /// Location of the function
        span: Span,
    },

    /// Override signature incompatible with the ancestor's
    #[error("Method '{method}' in class '{class}' overrides with an incompatible signature: {reason}")]
    BadOverride {
        /// Overriding class
        class: String,
        /// Method name
        method: String,
        /// What differs
        reason: String,
        /// Location of the override
        span: Span,
    },

    /// Method whose receiver or parameters break the method rules
    #[error("Invalid signature for method '{method}' in class '{class}': {reason}")]
    InvalidMethodSignature {
        /// Class name
        class: String,
        /// Method name
        method: String,
        /// What is wrong
        reason: String,
        /// Location of the method
        span: Span,
    },

    /// Variable initializer of the wrong literal type
    #[error("Invalid initializer for '{name}': expected {expected}, got {actual}")]
    InvalidInitializer {
        /// Variable name
        name: String,
        /// Declared type
        expected: String,
        /// Literal type
        actual: String,
        /// Location of the initializer
        span: Span,
    },

    /// `print` of a value with no print routine
    #[error("Cannot print a value of type {actual}")]
    CannotPrint {
        /// Argument type
        actual: String,
        /// Location of the argument
        span: Span,
    },

    // ------------------------------------------------------------------
    // Layout errors
    // ------------------------------------------------------------------
    /// Name declared twice in one scope
    #[error("Duplicate declaration of identifier '{name}' in the same scope")]
    DuplicateIdentifier {
        /// Name
        name: String,
        /// Location of the duplicate
        span: Span,
    },

    /// Field re-declared along the inheritance chain
    #[error("Cannot re-define attribute '{field}' in class '{class}'")]
    DuplicateField {
        /// Class name
        class: String,
        /// Field or method name
        field: String,
        /// Location of the re-declaration
        span: Span,
    },

    /// Superclass that does not exist
    #[error("Class '{class}' extends unknown class '{superclass}'")]
    UnknownSuperclass {
        /// Class name
        class: String,
        /// Named superclass
        superclass: String,
        /// Location of the superclass reference
        span: Span,
    },

    /// Class not reachable from the root (inheritance cycle)
    #[error("Class '{class}' is part of an inheritance cycle")]
    InheritanceCycle {
        /// Class name
        class: String,
        /// Location of the class
        span: Span,
    },
}

impl CheckError {
    /// Get the category of this error
    pub fn kind(&self) -> CheckErrorKind {
        use CheckError::*;

        match self {
            UndefinedVariable { .. }
            | UndefinedFunction { .. }
            | UndeclaredAssignment { .. }
            | InvalidScopeDecl { .. }
            | UnknownField { .. }
            | UnknownMethod { .. }
            | UnresolvedCapture { .. } => CheckErrorKind::Reference,

            TypeMismatch { .. }
            | InvalidBinaryOp { .. }
            | InvalidUnaryOp { .. }
            | ArgumentCountMismatch { .. }
            | NotAnObject { .. }
            | UndefinedType { .. }
            | MissingReturn { .. }
            | BadOverride { .. }
            | InvalidMethodSignature { .. }
            | InvalidInitializer { .. }
            | CannotPrint { .. } => CheckErrorKind::Type,

            DuplicateIdentifier { .. }
            | DuplicateField { .. }
            | UnknownSuperclass { .. }
            | InheritanceCycle { .. } => CheckErrorKind::Layout,
        }
    }

    /// Get the source location of this error
    pub fn span(&self) -> Span {
        use CheckError::*;

        match self {
            UndefinedVariable { span, .. }
            | UndefinedFunction { span, .. }
            | UndeclaredAssignment { span, .. }
            | InvalidScopeDecl { span, .. }
            | UnknownField { span, .. }
            | UnknownMethod { span, .. }
            | UnresolvedCapture { span, .. }
            | TypeMismatch { span, .. }
            | InvalidBinaryOp { span, .. }
            | InvalidUnaryOp { span, .. }
            | ArgumentCountMismatch { span, .. }
            | NotAnObject { span, .. }
            | UndefinedType { span, .. }
            | MissingReturn { span, .. }
            | BadOverride { span, .. }
            | InvalidMethodSignature { span, .. }
            | InvalidInitializer { span, .. }
            | CannotPrint { span, .. }
            | DuplicateIdentifier { span, .. }
            | DuplicateField { span, .. }
            | UnknownSuperclass { span, .. }
            | InheritanceCycle { span, .. } => *span,
        }
    }

    pub(crate) fn mismatch(expected: impl ToString, actual: impl ToString, span: Span) -> Self {
        CheckError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
            span,
        }
    }
}
