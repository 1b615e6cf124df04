//! Lexer for the Choco language.
//!
//! Tokens within a line are recognised by logos. Leading whitespace is
//! handled here, line by line: an indentation increase produces `Indent`,
//! each closed level produces `Dedent`, and every logical line ends with
//! `Newline`. Lines inside parentheses are joined and do not affect
//! indentation.

use crate::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing a single line.
///
/// Converted to the main `Token` enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\x0C]+", logos::skip)]
    Whitespace,

    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[token("def")]
    Def,
    #[token("class")]
    Class,
    #[token("global")]
    Global,
    #[token("nonlocal")]
    Nonlocal,
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("pass")]
    Pass,
    #[token("is")]
    Is,
    #[token("not")]
    Not,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    None,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("=")]
    Equal,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
}

impl LogosToken {
    fn into_token(self) -> Token {
        match self {
            LogosToken::Def => Token::Def,
            LogosToken::Class => Token::Class,
            LogosToken::Global => Token::Global,
            LogosToken::Nonlocal => Token::Nonlocal,
            LogosToken::If => Token::If,
            LogosToken::Elif => Token::Elif,
            LogosToken::Else => Token::Else,
            LogosToken::While => Token::While,
            LogosToken::Return => Token::Return,
            LogosToken::Pass => Token::Pass,
            LogosToken::Is => Token::Is,
            LogosToken::Not => Token::Not,
            LogosToken::True => Token::True,
            LogosToken::False => Token::False,
            LogosToken::None => Token::None,
            LogosToken::Int(n) => Token::IntLiteral(n),
            LogosToken::Identifier(name) => Token::Identifier(name),
            LogosToken::Plus => Token::Plus,
            LogosToken::Minus => Token::Minus,
            LogosToken::Star => Token::Star,
            LogosToken::SlashSlash => Token::SlashSlash,
            LogosToken::Percent => Token::Percent,
            LogosToken::EqualEqual => Token::EqualEqual,
            LogosToken::BangEqual => Token::BangEqual,
            LogosToken::Less => Token::Less,
            LogosToken::Greater => Token::Greater,
            LogosToken::LessEqual => Token::LessEqual,
            LogosToken::GreaterEqual => Token::GreaterEqual,
            LogosToken::Equal => Token::Equal,
            LogosToken::LeftParen => Token::LeftParen,
            LogosToken::RightParen => Token::RightParen,
            LogosToken::Colon => Token::Colon,
            LogosToken::Comma => Token::Comma,
            LogosToken::Dot => Token::Dot,
            LogosToken::Arrow => Token::Arrow,
            // Skipped by logos, never produced
            LogosToken::Whitespace | LogosToken::Comment => Token::Newline,
        }
    }
}

/// Tab stops for indentation width
const TAB_WIDTH: u32 = 8;

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unexpected character '{char}' at {}:{}", .span.line, .span.column)]
    UnexpectedCharacter { char: char, span: Span },
    #[error("Invalid number '{text}' at {}:{}", .span.line, .span.column)]
    InvalidNumber { text: String, span: Span },
    #[error(
        "Unindent does not match any outer indentation level at {}:{}",
        .span.line,
        .span.column
    )]
    InconsistentDedent { span: Span },
    #[error("Unclosed '(' at end of file at {}:{}", .span.line, .span.column)]
    UnclosedParen { span: Span },
}

pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
    indents: Vec<u32>,
    depth: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            indents: vec![0],
            depth: 0,
        }
    }

    /// Format all errors with source context
    pub fn format_errors(errors: &[LexError], source: &str) -> String {
        errors
            .iter()
            .map(|e| e.format_with_source(source))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let source = self.source;
        let mut offset = 0usize;
        let mut line_no = 0u32;

        for raw_line in source.split_inclusive('\n') {
            line_no += 1;
            let line_start = offset;
            offset += raw_line.len();

            let line = raw_line.trim_end_matches(['\n', '\r']);
            let (width, content_start) = measure_indent(line);
            let content = &line[content_start..];

            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            if self.depth == 0 {
                let span = Span::new(
                    line_start,
                    line_start + content_start,
                    line_no,
                    1,
                );
                self.handle_indent(width, span);
            }

            self.lex_line(content, line_start + content_start, line_no, content_start as u32 + 1);

            if self.depth == 0 {
                let end = line_start + line.len();
                self.tokens.push((
                    Token::Newline,
                    Span::new(end, end, line_no, line.len() as u32 + 1),
                ));
            }
        }

        let end = source.len();
        let eof_span = Span::new(end, end, line_no.max(1), 1);

        if self.depth > 0 {
            self.errors.push(LexError::UnclosedParen { span: eof_span });
        }

        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push((Token::Dedent, eof_span));
        }
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    fn handle_indent(&mut self, width: u32, span: Span) {
        let current = self.indents.last().copied().unwrap_or(0);

        if width > current {
            self.indents.push(width);
            self.tokens.push((Token::Indent, span));
            return;
        }

        while width < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.tokens.push((Token::Dedent, span));
        }

        if width != self.indents.last().copied().unwrap_or(0) {
            self.errors.push(LexError::InconsistentDedent { span });
        }
    }

    fn lex_line(&mut self, content: &str, base: usize, line: u32, column: u32) {
        let mut lex = LogosToken::lexer(content);

        while let Some(result) = lex.next() {
            let range = lex.span();
            let span = Span::new(
                base + range.start,
                base + range.end,
                line,
                column + range.start as u32,
            );

            match result {
                Ok(token) => {
                    let token = token.into_token();
                    if token.opens_group() {
                        self.depth += 1;
                    } else if token.closes_group() {
                        self.depth = self.depth.saturating_sub(1);
                    }
                    self.tokens.push((token, span));
                }
                Err(()) => {
                    let text = lex.slice();
                    if text.chars().all(|c| c.is_ascii_digit()) {
                        self.errors.push(LexError::InvalidNumber {
                            text: text.to_string(),
                            span,
                        });
                    } else {
                        let char = text.chars().next().unwrap_or('\0');
                        self.errors.push(LexError::UnexpectedCharacter { char, span });
                    }
                }
            }
        }
    }
}

/// Indentation width of a line and the byte offset where its content starts
fn measure_indent(line: &str) -> (u32, usize) {
    let mut width = 0u32;
    for (i, ch) in line.char_indices() {
        match ch {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => return (width, i),
        }
    }
    (width, line.len())
}

impl LexError {
    /// Get the span of this error
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::InconsistentDedent { span }
            | LexError::UnclosedParen { span } => span,
        }
    }

    /// Get a description of this error
    pub fn description(&self) -> String {
        match self {
            LexError::UnexpectedCharacter { char, .. } => {
                format!("Unexpected character '{}'", char)
            }
            LexError::InvalidNumber { text, .. } => format!("Invalid number '{}'", text),
            LexError::InconsistentDedent { .. } => {
                "Unindent does not match any outer indentation level".to_string()
            }
            LexError::UnclosedParen { .. } => "Unclosed '(' at end of file".to_string(),
        }
    }

    /// Format the error with the offending source line
    pub fn format_with_source(&self, source: &str) -> String {
        let span = self.span();
        let mut result = format!(
            "Error at {}:{}: {}\n",
            span.line,
            span.column,
            self.description()
        );

        if let Some(error_line) = source.lines().nth(span.line.saturating_sub(1) as usize) {
            result.push_str("  |\n");
            result.push_str(&format!("{:3} | {}\n", span.line, error_line));
            result.push_str(&format!(
                "  | {}^\n",
                " ".repeat(span.column.saturating_sub(1) as usize)
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .expect("should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_simple_line() {
        assert_eq!(
            kinds("x:int = 5"),
            vec![
                Token::Identifier("x".to_string()),
                Token::Colon,
                Token::Identifier("int".to_string()),
                Token::Equal,
                Token::IntLiteral(5),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let tokens = kinds("while True:\n  pass\nx");
        assert_eq!(
            tokens,
            vec![
                Token::While,
                Token::True,
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Pass,
                Token::Newline,
                Token::Dedent,
                Token::Identifier("x".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_dedent_at_eof() {
        let tokens = kinds("def f():\n  if True:\n    pass\n");
        let dedents = tokens.iter().filter(|t| **t == Token::Dedent).count();
        assert_eq!(dedents, 2);
        assert_eq!(tokens.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_blank_and_comment_lines_ignored() {
        let tokens = kinds("x = 1\n\n   # comment\nx = 2 # trailing\n");
        assert!(!tokens.contains(&Token::Indent));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Newline).count(), 2);
    }

    #[test]
    fn test_parens_join_lines() {
        let tokens = kinds("f(1,\n    2)\n");
        assert!(!tokens.contains(&Token::Indent));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Newline).count(), 1);
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a // b <= c -> d != e"),
            vec![
                Token::Identifier("a".to_string()),
                Token::SlashSlash,
                Token::Identifier("b".to_string()),
                Token::LessEqual,
                Token::Identifier("c".to_string()),
                Token::Arrow,
                Token::Identifier("d".to_string()),
                Token::BangEqual,
                Token::Identifier("e".to_string()),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(kinds("define")[0], Token::Identifier("define".to_string()));
        assert_eq!(kinds("is_ok")[0], Token::Identifier("is_ok".to_string()));
    }

    #[test]
    fn test_span_columns() {
        let tokens = Lexer::new("if x:\n  y = 10").tokenize().unwrap();
        let (tok, span) = &tokens[5];
        assert_eq!(tok, &Token::Identifier("y".to_string()));
        assert_eq!((span.line, span.column), (2, 3));
        let (tok, span) = &tokens[7];
        assert_eq!(tok, &Token::IntLiteral(10));
        assert_eq!(span.slice("if x:\n  y = 10"), "10");
    }

    #[test]
    fn test_inconsistent_dedent() {
        let errors = Lexer::new("if x:\n    a\n  b\n").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::InconsistentDedent { .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let errors = Lexer::new("x = $").tokenize().unwrap_err();
        assert!(matches!(
            errors[0],
            LexError::UnexpectedCharacter { char: '$', .. }
        ));
    }

    #[test]
    fn test_unclosed_paren() {
        let errors = Lexer::new("f(1,\n").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::UnclosedParen { .. }));
    }
}
