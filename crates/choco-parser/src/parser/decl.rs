//! Declaration parsing: variables, functions, classes, scope declarations

use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

impl Parser {
    /// `name : type = literal NEWLINE`
    pub(crate) fn parse_var_def(&mut self) -> Result<VarDef, ParseError> {
        let var = self.parse_typed_var()?;
        self.expect(Token::Equal, "'=' after variable type")?;
        let init_start = self.current_span();
        let init = self.parse_literal_init()?;
        let init_span = init_start.merge(&self.previous_span());
        let span = var.name.span.merge(&init_span);
        self.expect(Token::Newline, "newline after variable definition")?;

        Ok(VarDef {
            var,
            init,
            init_span,
            span,
            binding: None,
        })
    }

    pub(crate) fn parse_typed_var(&mut self) -> Result<TypedVar, ParseError> {
        let name = self.expect_identifier("variable name")?;
        self.expect(Token::Colon, "':' before type")?;
        let annotation = self.parse_type_annotation()?;
        Ok(TypedVar { name, annotation })
    }

    pub(crate) fn parse_type_annotation(&mut self) -> Result<TypeAnnotation, ParseError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                let (_, span) = self.advance();
                Ok(TypeAnnotation { name, span })
            }
            Token::None => {
                let (_, span) = self.advance();
                Ok(TypeAnnotation {
                    name: "None".to_string(),
                    span,
                })
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    /// Variable initializers are literals, optionally a negated integer
    fn parse_literal_init(&mut self) -> Result<Literal, ParseError> {
        let negative = self.eat(&Token::Minus);
        let (token, span) = self.advance();
        let literal = match token {
            Token::IntLiteral(n) => {
                let value = if negative { -n } else { n };
                let value = i32::try_from(value)
                    .map_err(|_| ParseError::invalid_number(value.to_string(), span))?;
                Literal::Number(value)
            }
            Token::True if !negative => Literal::Bool(true),
            Token::False if !negative => Literal::Bool(false),
            Token::None if !negative => Literal::None,
            other => {
                return Err(ParseError::unexpected_token("a literal initializer", other, span)
                    .with_suggestion("variable definitions must be initialized with a literal"))
            }
        };
        Ok(literal)
    }

    /// `def name(params) [-> type]: body`
    pub(crate) fn parse_fun_def(&mut self) -> Result<FunDef, ParseError> {
        let start = self.expect(Token::Def, "'def'")?;
        let name = self.expect_identifier("function name")?;

        self.expect(Token::LeftParen, "'(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                params.push(self.parse_typed_var()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen, "')' after parameters")?;

        let ret = if self.eat(&Token::Arrow) {
            Some(self.parse_type_annotation()?)
        } else {
            None
        };

        self.expect(Token::Colon, "':' after function signature")?;
        self.expect(Token::Newline, "newline before function body")?;
        self.expect(Token::Indent, "indented function body")?;

        self.function_depth += 1;
        let body = self.parse_fun_body();
        self.function_depth -= 1;
        let body = body?;

        let span = start.merge(&self.previous_span());
        self.expect(Token::Dedent, "end of function body")?;

        Ok(FunDef {
            name,
            params,
            ret,
            body,
            span,
            id: None,
        })
    }

    fn parse_fun_body(&mut self) -> Result<FunBody, ParseError> {
        let mut body = FunBody::default();

        loop {
            match self.peek() {
                Token::Def => body.fun_defs.push(self.parse_fun_def()?),
                Token::Global | Token::Nonlocal => body.decls.push(self.parse_scope_decl()?),
                _ if self.at_var_def() => body.var_defs.push(self.parse_var_def()?),
                _ => break,
            }
        }

        while !self.check(&Token::Dedent) && !self.at_end() {
            if self.at_declaration() {
                return Err(ParseError::declaration_after_statement(self.current_span()));
            }
            body.stmts.push(self.parse_stmt()?);
        }

        if body.stmts.is_empty() {
            return Err(ParseError::invalid_syntax(
                "function body must contain at least one statement",
                self.current_span(),
            )
            .with_suggestion("add 'pass'"));
        }

        Ok(body)
    }

    /// `global name` / `nonlocal name`
    fn parse_scope_decl(&mut self) -> Result<ScopeDecl, ParseError> {
        let (token, start) = self.advance();
        let kind = match token {
            Token::Global => ScopeKind::Global,
            Token::Nonlocal => ScopeKind::Nonlocal,
            other => return Err(ParseError::unexpected_token("'global' or 'nonlocal'", other, start)),
        };
        let name = self.expect_identifier("variable name")?;
        let span = start.merge(&name.span);
        self.expect(Token::Newline, "newline after scope declaration")?;
        Ok(ScopeDecl { name, kind, span })
    }

    /// `class Name(Super): body`
    pub(crate) fn parse_class_def(&mut self) -> Result<ClassDef, ParseError> {
        let start = self.expect(Token::Class, "'class'")?;
        let name = self.expect_identifier("class name")?;
        self.expect(Token::LeftParen, "'(' after class name")?;
        let superclass = self.expect_identifier("superclass name")?;
        self.expect(Token::RightParen, "')' after superclass")?;
        self.expect(Token::Colon, "':' after class header")?;
        self.expect(Token::Newline, "newline before class body")?;
        self.expect(Token::Indent, "indented class body")?;

        let mut fields = Vec::new();
        let mut methods = Vec::new();

        while !self.check(&Token::Dedent) && !self.at_end() {
            match self.peek() {
                Token::Def => methods.push(self.parse_fun_def()?),
                Token::Pass => {
                    self.advance();
                    self.expect(Token::Newline, "newline after 'pass'")?;
                }
                _ if self.at_var_def() => fields.push(self.parse_var_def()?),
                _ => {
                    return Err(ParseError::invalid_syntax(
                        "class bodies may only contain fields, methods and 'pass'",
                        self.current_span(),
                    ))
                }
            }
        }

        let span = start.merge(&self.previous_span());
        self.expect(Token::Dedent, "end of class body")?;

        Ok(ClassDef {
            name,
            superclass,
            fields,
            methods,
            span,
        })
    }
}
