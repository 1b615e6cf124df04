//! Parse error types and error reporting

use crate::lexer::LexError;
use crate::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,

    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken { expected: String, found: Token },

    /// Invalid syntax
    InvalidSyntax { reason: String },

    /// Integer literal outside the 32-bit range
    InvalidNumber { value: String },

    /// A declaration appearing after the first statement of its block
    DeclarationAfterStatement,

    /// Tokenization failed
    Lex(LexError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: impl Into<String>, found: Token, span: Span) -> Self {
        let expected = expected.into();
        let message = format!("Expected {}, found '{}'", expected, found);

        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            kind: ParseErrorKind::InvalidSyntax {
                reason: reason.clone(),
            },
            span,
            message: format!("Invalid syntax: {}", reason),
            suggestion: None,
        }
    }

    /// Create an "invalid number" error.
    pub fn invalid_number(value: impl Into<String>, span: Span) -> Self {
        let value = value.into();
        Self {
            message: format!("Integer literal {} does not fit in 32 bits", value),
            kind: ParseErrorKind::InvalidNumber { value },
            span,
            suggestion: None,
        }
    }

    /// Create a "declaration after statement" error.
    pub fn declaration_after_statement(span: Span) -> Self {
        Self {
            kind: ParseErrorKind::DeclarationAfterStatement,
            span,
            message: "Declarations must come before statements".to_string(),
            suggestion: Some("move this declaration above the first statement".to_string()),
        }
    }

    /// Add a suggestion to this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self {
            span: *error.span(),
            message: error.description(),
            kind: ParseErrorKind::Lex(error),
            suggestion: None,
        }
    }
}
