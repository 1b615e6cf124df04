//! Parser for the Choco language
//!
//! A recursive descent parser over the token stream produced by the lexer.
//! It stops at the first error: nothing downstream runs on a malformed
//! program.

pub mod decl;
pub mod error;
pub mod expr;
pub mod stmt;

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Parser state for the Choco language.
pub struct Parser {
    /// Pre-tokenized input, always terminated by `Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Number of enclosing function bodies
    function_depth: usize,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize().map_err(|errors| {
            errors
                .into_iter()
                .next()
                .map(ParseError::from)
                .unwrap_or_else(|| ParseError::invalid_syntax("lexing failed", Span::default()))
        })?;

        Ok(Self {
            tokens,
            pos: 0,
            function_depth: 0,
        })
    }

    /// Parse the entire source file into a Program AST.
    ///
    /// Module-level declarations (variables, functions, classes) come first,
    /// followed by the top-level statements.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start = self.current_span();
        let mut var_defs = Vec::new();
        let mut fun_defs = Vec::new();
        let mut class_defs = Vec::new();

        loop {
            match self.peek() {
                Token::Def => fun_defs.push(self.parse_fun_def()?),
                Token::Class => class_defs.push(self.parse_class_def()?),
                _ if self.at_var_def() => var_defs.push(self.parse_var_def()?),
                _ => break,
            }
        }

        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.at_declaration() {
                return Err(ParseError::declaration_after_statement(self.current_span()));
            }
            stmts.push(self.parse_stmt()?);
        }

        let span = start.merge(&self.current_span());
        Ok(Program {
            var_defs,
            fun_defs,
            class_defs,
            stmts,
            span,
        })
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    pub(crate) fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(index)
            .map(|(token, _)| token)
            .unwrap_or(&Token::Eof)
    }

    pub(crate) fn current_span(&self) -> Span {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(index)
            .map(|(_, span)| *span)
            .unwrap_or_default()
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos == 0 {
            return self.current_span();
        }
        self.tokens
            .get(self.pos - 1)
            .map(|(_, span)| *span)
            .unwrap_or_default()
    }

    pub(crate) fn advance(&mut self) -> (Token, Span) {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        let entry = self
            .tokens
            .get(index)
            .cloned()
            .unwrap_or((Token::Eof, Span::default()));
        if !matches!(entry.0, Token::Eof) {
            self.pos += 1;
        }
        entry
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        self.peek() == token
    }

    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    pub(crate) fn expect(&mut self, token: Token, what: &str) -> Result<Span, ParseError> {
        if self.check(&token) {
            Ok(self.advance().1)
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<Ident, ParseError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                let (_, span) = self.advance();
                Ok(Ident::new(name, span))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    pub(crate) fn unexpected(&self, what: &str) -> ParseError {
        ParseError::unexpected_token(what, self.peek().clone(), self.current_span())
    }

    /// `name :` starts a variable definition
    pub(crate) fn at_var_def(&self) -> bool {
        matches!(self.peek(), Token::Identifier(_)) && matches!(self.peek_at(1), Token::Colon)
    }

    pub(crate) fn at_declaration(&self) -> bool {
        matches!(
            self.peek(),
            Token::Def | Token::Class | Token::Global | Token::Nonlocal
        ) || self.at_var_def()
    }
}

/// Parse source text into a program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program() {
        let program = parse("").unwrap();
        assert!(program.var_defs.is_empty());
        assert!(program.stmts.is_empty());
    }

    #[test]
    fn test_declarations_then_statements() {
        let program = parse("x:int = 1\ndef f():\n  pass\nclass A(object):\n  pass\nx = 2\n").unwrap();
        assert_eq!(program.var_defs.len(), 1);
        assert_eq!(program.fun_defs.len(), 1);
        assert_eq!(program.class_defs.len(), 1);
        assert_eq!(program.stmts.len(), 1);
    }

    #[test]
    fn test_declaration_after_statement() {
        let err = parse("x:int = 1\nx = 2\ny:int = 3\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DeclarationAfterStatement);
        assert_eq!(err.span.line, 3);
    }

    #[test]
    fn test_lex_error_surfaces() {
        let err = parse("x = $\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
    }
}
