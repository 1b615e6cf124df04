//! Token definitions for the Choco language.
//!
//! Besides keywords, operators and literals the token stream carries the
//! layout tokens `Newline`, `Indent` and `Dedent` produced from leading
//! whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A token in the Choco language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Declarations
    Def,
    Class,
    Global,
    Nonlocal,

    // Control flow
    If,
    Elif,
    Else,
    While,
    Return,
    Pass,

    // Word operators
    Is,
    Not,

    // Literals
    True,
    False,
    None,
    IntLiteral(i64),
    Identifier(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    SlashSlash,
    Percent,

    // Comparison
    EqualEqual,
    BangEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Punctuation
    Equal,
    LeftParen,
    RightParen,
    Colon,
    Comma,
    Dot,
    Arrow,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl Token {
    /// Whether this token opens a bracketed region (newlines are ignored inside)
    pub fn opens_group(&self) -> bool {
        matches!(self, Token::LeftParen)
    }

    /// Whether this token closes a bracketed region
    pub fn closes_group(&self) -> bool {
        matches!(self, Token::RightParen)
    }
}

/// Source location: byte range plus 1-based line and column of the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Def => write!(f, "def"),
            Token::Class => write!(f, "class"),
            Token::Global => write!(f, "global"),
            Token::Nonlocal => write!(f, "nonlocal"),
            Token::If => write!(f, "if"),
            Token::Elif => write!(f, "elif"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Return => write!(f, "return"),
            Token::Pass => write!(f, "pass"),
            Token::Is => write!(f, "is"),
            Token::Not => write!(f, "not"),
            Token::True => write!(f, "True"),
            Token::False => write!(f, "False"),
            Token::None => write!(f, "None"),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::SlashSlash => write!(f, "//"),
            Token::Percent => write!(f, "%"),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::LessEqual => write!(f, "<="),
            Token::GreaterEqual => write!(f, ">="),
            Token::Equal => write!(f, "="),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Arrow => write!(f, "->"),
            Token::Newline => write!(f, "newline"),
            Token::Indent => write!(f, "indent"),
            Token::Dedent => write!(f, "dedent"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
