//! Choco Parser
//!
//! Lexer, recursive-descent parser and the typed AST shared by every later
//! compiler stage.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parser::{parse, ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};
