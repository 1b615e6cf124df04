//! Printing and host arithmetic

use super::harness::*;

#[test]
fn test_print_values() {
    expect_output(
        "print(42)\nprint(-7)\nprint(True)\nprint(False)\nprint(None)",
        &["42", "-7", "True", "False", "None"],
    );
}

#[test]
fn test_print_expression_results() {
    expect_output(
        "print(1 < 2)\nprint(3 == 4)\nprint(not False)",
        &["True", "False", "True"],
    );
}

#[test]
fn test_arithmetic_builtins() {
    expect_output(
        "print(abs(-5))\nprint(min(3, 9))\nprint(max(3, 9))\nprint(pow(2, 8))",
        &["5", "3", "9", "256"],
    );
}

#[test]
fn test_builtins_compose() {
    expect_output("print(max(abs(-12), pow(3, 2)) + min(1, -1))", &["11"]);
}

#[test]
fn test_integer_division_and_modulo() {
    expect_output(
        "print(17 // 5)\nprint(17 % 5)\nprint(6 * 7 - 2)",
        &["3", "2", "40"],
    );
}

#[test]
fn test_division_truncates_toward_zero() {
    expect_output(
        "print(-7 // 2)\nprint(-7 % 2)\nprint(7 // -2)\nprint(7 % -2)",
        &["-3", "-1", "-3", "1"],
    );
}

#[test]
fn test_int_extremes() {
    expect_output(
        "print(-2147483648)\nprint(2147483647)\nprint(-2147483648 - 1)",
        &["-2147483648", "2147483647", "2147483647"],
    );
}

#[test]
fn test_unary_minus() {
    expect_output("x:int = 3\nprint(-x + 1)\nprint(--x)", &["-2", "3"]);
}
