//! Tests for expression and statement typing

use choco_checker::{check, CheckError, CheckErrorKind, CheckedProgram};
use choco_parser::ast::*;
use choco_parser::parse;
use choco_types::Type;

fn check_source(source: &str) -> Result<CheckedProgram, CheckError> {
    let program = parse(source).expect("should parse");
    check(program)
}

fn expect_ok(source: &str) -> CheckedProgram {
    let result = check_source(source);
    assert!(result.is_ok(), "Expected no errors, got: {:?}", result.err());
    result.unwrap()
}

fn expect_err(source: &str) -> CheckError {
    match check_source(source) {
        Ok(_) => panic!("Expected a check error for:\n{}", source),
        Err(err) => err,
    }
}

fn last_expr_type(program: &CheckedProgram) -> Option<Type> {
    match program.program.stmts.last() {
        Some(Stmt::Expr { expr, .. }) => expr.ty.clone(),
        _ => None,
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_every_expression_is_typed() {
    let program = expect_ok("x:int = 5\nx + 1 > 3\n");
    let Some(Stmt::Expr { expr, .. }) = program.program.stmts.last() else {
        panic!("Expected expression statement");
    };
    assert_eq!(expr.ty, Some(Type::Bool));
    let ExprKind::Binary { left, .. } = &expr.kind else {
        panic!("Expected comparison");
    };
    assert_eq!(left.ty, Some(Type::Int));
}

#[test]
fn test_arithmetic_requires_ints() {
    let err = expect_err("True + 1\n");
    assert!(matches!(err, CheckError::InvalidBinaryOp { .. }));
    assert_eq!(err.kind(), CheckErrorKind::Type);
}

#[test]
fn test_floor_div_and_mod() {
    let program = expect_ok("7 // 2 % 3\n");
    assert_eq!(last_expr_type(&program), Some(Type::Int));
}

#[test]
fn test_equality_of_bools() {
    let program = expect_ok("True == False\n");
    assert_eq!(last_expr_type(&program), Some(Type::Bool));
}

#[test]
fn test_object_equality_rejected() {
    let err = expect_err("class A(object):\n  pass\na:A = None\na == a\n");
    assert!(matches!(err, CheckError::InvalidBinaryOp { ref op, .. } if op == "=="));
}

#[test]
fn test_is_on_objects() {
    let program = expect_ok("class A(object):\n  pass\na:A = None\na is None\n");
    assert_eq!(last_expr_type(&program), Some(Type::Bool));
}

#[test]
fn test_is_on_ints_rejected() {
    let err = expect_err("1 is 1\n");
    assert!(matches!(err, CheckError::InvalidBinaryOp { .. }));
}

#[test]
fn test_unary_operators() {
    expect_ok("-5\nnot True\n");
    assert!(matches!(expect_err("-True\n"), CheckError::InvalidUnaryOp { .. }));
    assert!(matches!(expect_err("not 1\n"), CheckError::InvalidUnaryOp { .. }));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_assignment_mismatch() {
    let err = expect_err("x:int = 0\nx = True\n");
    assert!(matches!(
        err,
        CheckError::TypeMismatch { ref expected, ref actual, .. }
            if expected == "int" && actual == "bool"
    ));
}

#[test]
fn test_none_into_object() {
    expect_ok("class A(object):\n  pass\na:A = None\na = None\na = A()\n");
}

#[test]
fn test_object_into_none_rejected() {
    let err = expect_err("class A(object):\n  pass\ndef f() -> None:\n  return A()\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
}

#[test]
fn test_subclass_upcast() {
    expect_ok("class A(object):\n  pass\nclass B(A):\n  pass\na:A = None\na = B()\n");
    let err = expect_err("class A(object):\n  pass\nclass B(A):\n  pass\nb:B = None\nb = A()\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
}

#[test]
fn test_condition_must_be_bool() {
    let err = expect_err("if 1:\n  pass\n");
    assert!(matches!(err, CheckError::TypeMismatch { ref expected, .. } if expected == "bool"));
    let err = expect_err("x:int = 0\nwhile x:\n  x = x - 1\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
}

#[test]
fn test_undefined_variable() {
    let err = expect_err("y = 1\n");
    assert!(matches!(err, CheckError::UndefinedVariable { ref name, .. } if name == "y"));
    assert_eq!(err.kind(), CheckErrorKind::Reference);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_call_resolves_function() {
    let program = expect_ok("def f(x:int) -> int:\n  return x\nf(1)\n");
    let Some(Stmt::Expr { expr, .. }) = program.program.stmts.last() else {
        panic!("Expected call");
    };
    let ExprKind::Call { target, .. } = &expr.kind else {
        panic!("Expected call");
    };
    assert!(matches!(target, Some(CallTarget::Function { captures, .. }) if captures.is_empty()));
}

#[test]
fn test_argument_count() {
    let err = expect_err("def f(x:int) -> int:\n  return x\nf(1, 2)\n");
    assert!(matches!(
        err,
        CheckError::ArgumentCountMismatch { expected: 1, actual: 2, .. }
    ));
}

#[test]
fn test_argument_type() {
    let err = expect_err("def f(x:int) -> int:\n  return x\nf(True)\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
}

#[test]
fn test_return_type() {
    let err = expect_err("def f() -> int:\n  return True\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
}

#[test]
fn test_missing_return_detected() {
    let err = expect_err("def f(x:bool) -> int:\n  if x:\n    return 1\n");
    assert!(matches!(err, CheckError::MissingReturn { ref name, .. } if name == "f"));
}

#[test]
fn test_none_function_needs_no_return() {
    expect_ok("def f(x:int):\n  x = x + 1\nf(1)\n");
}

#[test]
fn test_recursion() {
    expect_ok("def fact(n:int) -> int:\n  if n <= 1:\n    return 1\n  else:\n    return n * fact(n - 1)\nprint(fact(5))\n");
}

#[test]
fn test_undefined_function() {
    let err = expect_err("g(1)\n");
    assert!(matches!(err, CheckError::UndefinedFunction { .. }));
}

// ============================================================================
// Builtins
// ============================================================================

#[test]
fn test_print_targets() {
    let program = expect_ok("print(1)\nprint(True)\nprint(None)\n");
    for stmt in &program.program.stmts {
        let Stmt::Expr { expr, .. } = stmt else {
            panic!("Expected expression statement");
        };
        assert_eq!(expr.ty, Some(Type::None));
    }
}

#[test]
fn test_print_object_rejected() {
    let err = expect_err("class A(object):\n  pass\nprint(A())\n");
    assert!(matches!(err, CheckError::CannotPrint { .. }));
}

#[test]
fn test_math_builtins() {
    let program = expect_ok("pow(abs(-2), max(1, min(3, 4)))\n");
    assert_eq!(last_expr_type(&program), Some(Type::Int));
    let err = expect_err("abs(True)\n");
    assert!(matches!(err, CheckError::TypeMismatch { .. }));
    let err = expect_err("min(1)\n");
    assert!(matches!(err, CheckError::ArgumentCountMismatch { .. }));
}
