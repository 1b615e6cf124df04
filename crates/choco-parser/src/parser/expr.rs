//! Expression parsing
//!
//! Precedence, loosest first:
//!
//! | Level      | Operators                          |
//! |------------|------------------------------------|
//! | not        | `not`                              |
//! | comparison | `== != < > <= >= is` (no chaining) |
//! | additive   | `+ -`                              |
//! | multiply   | `* // %`                           |
//! | unary      | `-`                                |
//! | postfix    | call, `.field`, `.method(...)`     |

use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_not()
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            let (_, start) = self.advance();
            let operand = self.parse_not()?;
            let span = start.merge(&operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        let Some(op) = comparison_op(self.peek()) else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_additive()?;

        if comparison_op(self.peek()).is_some() {
            return Err(ParseError::invalid_syntax(
                "comparison operators cannot be chained",
                self.current_span(),
            ));
        }

        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::SlashSlash => BinaryOp::FloorDiv,
                Token::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Minus) {
            let (_, start) = self.advance();
            // `-2147483648` is the only literal whose magnitude overflows i32
            if let Token::IntLiteral(n) = *self.peek() {
                if n == -i64::from(i32::MIN) {
                    let (_, end) = self.advance();
                    return Ok(Expr::new(
                        ExprKind::Literal(Literal::Number(i32::MIN)),
                        start.merge(&end),
                    ));
                }
            }
            let operand = self.parse_unary()?;
            let span = start.merge(&operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.eat(&Token::Dot) {
            let member = self.expect_identifier("field or method name")?;
            if self.check(&Token::LeftParen) {
                let args = self.parse_args()?;
                let span = expr.span.merge(&self.previous_span());
                expr = Expr::new(
                    ExprKind::Method {
                        object: Box::new(expr),
                        method: member,
                        args,
                    },
                    span,
                );
            } else {
                let span = expr.span.merge(&member.span);
                expr = Expr::new(
                    ExprKind::Field {
                        object: Box::new(expr),
                        field: member,
                    },
                    span,
                );
            }
        }

        if self.check(&Token::LeftParen) {
            return Err(ParseError::invalid_syntax(
                "only named functions and methods can be called",
                self.current_span(),
            ));
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let (token, span) = self.advance();
        let kind = match token {
            Token::IntLiteral(n) => {
                let value =
                    i32::try_from(n).map_err(|_| ParseError::invalid_number(n.to_string(), span))?;
                ExprKind::Literal(Literal::Number(value))
            }
            Token::True => ExprKind::Literal(Literal::Bool(true)),
            Token::False => ExprKind::Literal(Literal::Bool(false)),
            Token::None => ExprKind::Literal(Literal::None),
            Token::Identifier(name) => {
                if self.check(&Token::LeftParen) {
                    let args = self.parse_args()?;
                    let call_span = span.merge(&self.previous_span());
                    return Ok(Expr::new(
                        ExprKind::Call {
                            callee: Ident::new(name, span),
                            args,
                            target: None,
                        },
                        call_span,
                    ));
                }
                ExprKind::Id {
                    name,
                    binding: None,
                }
            }
            Token::LeftParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RightParen, "')'")?;
                return Ok(inner);
            }
            other => return Err(ParseError::unexpected_token("an expression", other, span)),
        };
        Ok(Expr::new(kind, span))
    }

    /// `( [expr (, expr)*] )`
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(Token::LeftParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen, "')' after arguments")?;
        Ok(args)
    }
}

fn comparison_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::EqualEqual => Some(BinaryOp::Eq),
        Token::BangEqual => Some(BinaryOp::Ne),
        Token::Less => Some(BinaryOp::Lt),
        Token::Greater => Some(BinaryOp::Gt),
        Token::LessEqual => Some(BinaryOp::Le),
        Token::GreaterEqual => Some(BinaryOp::Ge),
        Token::Is => Some(BinaryOp::Is),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(&right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::{parse, ParseErrorKind};

    fn expr_of(source: &str) -> Expr {
        let program = parse(source).unwrap();
        match program.stmts.into_iter().next() {
            Some(Stmt::Expr { expr, .. }) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn render(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(lit) => lit.to_string(),
            ExprKind::Id { name, .. } => name.clone(),
            ExprKind::Unary { op, operand } => format!("({} {})", op, render(operand)),
            ExprKind::Binary { op, left, right } => {
                format!("({} {} {})", render(left), op, render(right))
            }
            ExprKind::Call { callee, args, .. } => {
                let args: Vec<_> = args.iter().map(render).collect();
                format!("{}({})", callee.name, args.join(", "))
            }
            ExprKind::Field { object, field } => format!("{}.{}", render(object), field.name),
            ExprKind::Method {
                object,
                method,
                args,
            } => {
                let args: Vec<_> = args.iter().map(render).collect();
                format!("{}.{}({})", render(object), method.name, args.join(", "))
            }
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(render(&expr_of("1 + 2 * 3 - 4\n")), "((1 + (2 * 3)) - 4)");
        assert_eq!(render(&expr_of("a // b % c\n")), "((a // b) % c)");
    }

    #[test]
    fn test_unary_binds_tighter_than_multiply() {
        assert_eq!(render(&expr_of("-a * b\n")), "((- a) * b)");
    }

    #[test]
    fn test_min_int_literal() {
        let expr = expr_of("-2147483648\n");
        assert_eq!(expr.kind, ExprKind::Literal(Literal::Number(i32::MIN)));
        assert_eq!(render(&expr_of("--2147483648\n")), "(- -2147483648)");
        let err = parse("2147483648\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidNumber { .. }));
    }

    #[test]
    fn test_not_is_loosest() {
        assert_eq!(render(&expr_of("not a == b\n")), "(not (a == b))");
    }

    #[test]
    fn test_comparison_chain_rejected() {
        let err = parse("a < b < c\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(render(&expr_of("a.b.c(1, x).d\n")), "a.b.c(1, x).d");
        assert_eq!(render(&expr_of("f(g(1), 2)\n")), "f(g(1), 2)");
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(render(&expr_of("(1 + 2) * 3\n")), "((1 + 2) * 3)");
    }

    #[test]
    fn test_is_none() {
        assert_eq!(render(&expr_of("x is None\n")), "(x is None)");
    }

    #[test]
    fn test_call_on_expression_rejected() {
        let err = parse("(f)(1)\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
    }
}
