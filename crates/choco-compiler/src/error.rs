//! Compilation errors

use choco_checker::{CheckError, CheckErrorKind, Diagnostic};
use choco_parser::{ParseError, Span};
use std::fmt;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Stable category of a compilation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Reference,
    Type,
    Layout,
    /// A defect in the compiler itself
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Reference => "reference error",
            ErrorKind::Type => "type error",
            ErrorKind::Layout => "layout error",
            ErrorKind::Internal => "internal error",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Parse(_) => ErrorKind::Parse,
            CompileError::Check(err) => match err.kind() {
                CheckErrorKind::Reference => ErrorKind::Reference,
                CheckErrorKind::Type => ErrorKind::Type,
                CheckErrorKind::Layout => ErrorKind::Layout,
            },
            CompileError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Source location, when the error has one
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Parse(err) => Some(err.span),
            CompileError::Check(err) => Some(err.span()),
            CompileError::Internal { .. } => None,
        }
    }

    /// Build a source diagnostic for user-facing errors
    pub fn diagnostic(&self, file_id: usize) -> Option<Diagnostic> {
        match self {
            CompileError::Parse(err) => Some(Diagnostic::from_parse_error(err, file_id)),
            CompileError::Check(err) => Some(Diagnostic::from_check_error(err, file_id)),
            CompileError::Internal { .. } => None,
        }
    }
}
