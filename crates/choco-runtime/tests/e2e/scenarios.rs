//! Reference programs with known output

use super::harness::*;
use choco_runtime::Trap;

const COUNTER_CLASS: &str = "\
class Counter(object):
  n:int = 0
  def inc(self:Counter):
    self.n = self.n + 1
";

#[test]
fn test_global_update() {
    expect_output("x:int = 5\nx = x + 1\nprint(x)", &["6"]);
}

#[test]
fn test_counter_object() {
    let source = format!(
        "{}c:Counter = None\nc = Counter()\nc.inc()\nc.inc()\nprint(c.n)",
        COUNTER_CLASS
    );
    expect_output(&source, &["2"]);
}

#[test]
fn test_nonlocal_mutation_shared() {
    let source = "\
def f(a:int)->int:
  def g(b:int)->int:
    nonlocal a
    a = a + 3
    return a + b
  return g(2) + g(2)
print(f(1))";
    expect_output(source, &["15"]);
}

#[test]
fn test_dispatch_through_superclass_parameter() {
    let source = "\
class A(object):
  def f(self:A)->int:
    return 1
class B(A):
  def f(self:B)->int:
    return 2
def callf(a:A)->int:
  return a.f()
b:B=None
b=B()
print(callf(b))";
    expect_output(source, &["2"]);
}

#[test]
fn test_method_on_null_object() {
    let source = format!("{}c:Counter = None\nc.inc()", COUNTER_CLASS);
    expect_trap(&source, &[], Trap::ObjectNotInitialized);
}

#[test]
fn test_last_expression_is_result() {
    let run = run("x:int = 4\nprint(x)\nx * 10");
    assert_eq!(run.output, vec!["4".to_string()]);
    assert_eq!(run.result, Some(40));
}

#[test]
fn test_statement_program_has_no_result() {
    let run = run("x:int = 1\nx = 2");
    assert!(run.output.is_empty());
    assert_eq!(run.result, None);
}
