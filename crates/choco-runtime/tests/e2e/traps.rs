//! Runtime faults and rejected programs

use super::harness::*;
use choco_compiler::ErrorKind;
use choco_runtime::Trap;

#[test]
fn test_field_read_on_null() {
    let source = "\
class P(object):
  x:int = 0
p:P = None
print(1)
print(p.x)";
    expect_trap(source, &["1"], Trap::ObjectNotInitialized);
}

#[test]
fn test_field_write_on_null() {
    let source = "\
class P(object):
  x:int = 0
p:P = None
p.x = 3";
    expect_trap(source, &[], Trap::ObjectNotInitialized);
}

#[test]
fn test_null_field_of_object() {
    let source = "\
class Node(object):
  next:Node = None
  def ping(self:Node)->int:
    return 1
n:Node = None
n = Node()
print(n.ping())
print(n.next.ping())";
    expect_trap(source, &["1"], Trap::ObjectNotInitialized);
}

#[test]
fn test_division_by_zero() {
    expect_trap("x:int = 0\nprint(10 // x)", &[], Trap::DivisionByZero);
    expect_trap("x:int = 0\nprint(10 % x)", &[], Trap::DivisionByZero);
}

#[test]
fn test_negative_exponent() {
    assert!(matches!(
        compile_and_run("print(pow(2, -1))").1,
        Err(E2EError::Runtime(choco_runtime::RuntimeError::Trap(
            Trap::InvalidArgument { .. }
        )))
    ));
}

#[test]
fn test_unbounded_recursion() {
    let source = "\
def down(n:int)->int:
  return down(n + 1)
print(down(0))";
    assert!(matches!(
        compile_and_run(source).1,
        Err(E2EError::Runtime(choco_runtime::RuntimeError::Trap(
            Trap::CallStackExhausted { .. }
        )))
    ));
}

#[test]
fn test_rejected_programs() {
    expect_compile_error("print(1 +)", ErrorKind::Parse);
    expect_compile_error("print(y)", ErrorKind::Reference);
    expect_compile_error("x:int = 0\ndef f():\n  x = 1\n", ErrorKind::Reference);
    expect_compile_error("x:int = 0\nx = True", ErrorKind::Type);
    expect_compile_error("def f()->int:\n  pass\n", ErrorKind::Type);
    expect_compile_error("class A(Missing):\n  pass\n", ErrorKind::Layout);
}
