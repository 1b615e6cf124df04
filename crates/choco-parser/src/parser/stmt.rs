//! Statement parsing

use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

impl Parser {
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::Pass => {
                let (_, span) = self.advance();
                self.expect(Token::Newline, "newline after 'pass'")?;
                Ok(Stmt::Pass { span })
            }
            Token::Return => self.parse_return(),
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let (_, start) = self.advance();
        if self.function_depth == 0 {
            return Err(ParseError::invalid_syntax("'return' outside function", start));
        }

        let value = if self.check(&Token::Newline) {
            Expr::new(ExprKind::Literal(Literal::None), start)
        } else {
            self.parse_expr()?
        };
        let span = start.merge(&value.span);
        self.expect(Token::Newline, "newline after return")?;
        Ok(Stmt::Return { value, span })
    }

    /// Expression statement or assignment
    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expr()?;

        if self.eat(&Token::Equal) {
            let value = self.parse_expr()?;
            let span = expr.span.merge(&value.span);
            let target = match expr.kind {
                ExprKind::Id { name, .. } => LValue::Id {
                    name: Ident::new(name, expr.span),
                    binding: None,
                },
                ExprKind::Field { object, field } => LValue::Field { object, field },
                _ => {
                    return Err(ParseError::invalid_syntax(
                        "can only assign to a variable or a field",
                        expr.span,
                    ))
                }
            };
            self.expect(Token::Newline, "newline after assignment")?;
            return Ok(Stmt::Assign {
                target,
                value,
                span,
            });
        }

        let span = expr.span;
        self.expect(Token::Newline, "newline after expression")?;
        Ok(Stmt::Expr { expr, span })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(Token::If, "'if'")?;
        let if_branch = self.parse_cond_body()?;

        let mut elif_branches = Vec::new();
        while self.eat(&Token::Elif) {
            elif_branches.push(self.parse_cond_body()?);
        }

        let else_body = if self.eat(&Token::Else) {
            self.expect(Token::Colon, "':' after 'else'")?;
            self.parse_block()?
        } else {
            Vec::new()
        };

        let span = start.merge(&self.previous_span());
        Ok(Stmt::If {
            if_branch,
            elif_branches,
            else_body,
            span,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(Token::While, "'while'")?;
        let branch = self.parse_cond_body()?;
        let span = start.merge(&self.previous_span());
        Ok(Stmt::While { branch, span })
    }

    /// `cond : block`
    fn parse_cond_body(&mut self) -> Result<CondBody, ParseError> {
        let cond = self.parse_expr()?;
        self.expect(Token::Colon, "':' after condition")?;
        let body = self.parse_block()?;
        Ok(CondBody { cond, body })
    }

    /// `NEWLINE INDENT stmt+ DEDENT`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::Newline, "newline before block")?;
        self.expect(Token::Indent, "indented block")?;

        let mut stmts = Vec::new();
        while !self.check(&Token::Dedent) && !self.at_end() {
            if self.at_declaration() {
                return Err(ParseError::declaration_after_statement(self.current_span())
                    .with_suggestion("declarations are only allowed at the start of a function or module"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(Token::Dedent, "end of block")?;
        Ok(stmts)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::{parse, ParseErrorKind};

    #[test]
    fn test_assign_targets() {
        let program = parse("x = 1\na.b = 2\n").unwrap();
        assert!(matches!(
            &program.stmts[0],
            Stmt::Assign { target: LValue::Id { name, .. }, .. } if name.name == "x"
        ));
        assert!(matches!(
            &program.stmts[1],
            Stmt::Assign { target: LValue::Field { field, .. }, .. } if field.name == "b"
        ));
    }

    #[test]
    fn test_invalid_assign_target() {
        let err = parse("f() = 1\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn test_if_elif_else() {
        let source = "if a:\n  pass\nelif b:\n  pass\nelif c:\n  pass\nelse:\n  pass\n";
        let program = parse(source).unwrap();
        match &program.stmts[0] {
            Stmt::If {
                elif_branches,
                else_body,
                ..
            } => {
                assert_eq!(elif_branches.len(), 2);
                assert_eq!(else_body.len(), 1);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_while() {
        let program = parse("while x < 10:\n  x = x + 1\n").unwrap();
        assert!(matches!(&program.stmts[0], Stmt::While { branch, .. } if branch.body.len() == 1));
    }

    #[test]
    fn test_bare_return_is_none() {
        let program = parse("def f():\n  return\n").unwrap();
        match &program.fun_defs[0].body.stmts[0] {
            Stmt::Return { value, .. } => {
                assert_eq!(value.kind, ExprKind::Literal(Literal::None))
            }
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse("return 1\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn test_declaration_in_block() {
        let err = parse("def f():\n  if True:\n    x:int = 1\n  pass\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DeclarationAfterStatement);
    }
}
