//! Nested functions, captures and scope declarations

use super::harness::*;

#[test]
fn test_read_capture() {
    let source = "\
def f()->int:
  x:int = 10
  def g()->int:
    return x + 1
  return g()
print(f())";
    expect_output(source, &["11"]);
}

#[test]
fn test_nonlocal_counter_seen_by_parent() {
    let source = "\
def outer()->int:
  n:int = 0
  def bump():
    nonlocal n
    n = n + 1
  bump()
  bump()
  bump()
  return n
print(outer())";
    expect_output(source, &["3"]);
}

#[test]
fn test_capture_threads_through_middle_function() {
    let source = "\
def a(x:int)->int:
  def b()->int:
    def c()->int:
      return x * 2
    return c()
  return b()
print(a(21))";
    expect_output(source, &["42"]);
}

#[test]
fn test_nonlocal_of_nonlocal() {
    let source = "\
def counter(start:int)->int:
  total:int = 0
  def step(n:int)->int:
    nonlocal total
    def bump()->int:
      nonlocal total
      total = total + 1
      return total
    total = total + n + start
    return bump()
  step(1)
  step(2)
  return total
print(counter(10))";
    expect_output(source, &["25"]);
}

#[test]
fn test_parent_write_visible_to_capture() {
    let source = "\
def f(a:int)->int:
  def get()->int:
    return a
  a = a + 5
  return get()
print(f(1))";
    expect_output(source, &["6"]);
}

#[test]
fn test_global_declaration() {
    let source = "\
count:int = 0
def tick():
  global count
  count = count + 1
tick()
tick()
print(count)";
    expect_output(source, &["2"]);
}

#[test]
fn test_global_read_without_declaration() {
    let source = "\
base:int = 100
def plus(n:int)->int:
  return base + n
print(plus(5))";
    expect_output(source, &["105"]);
}

#[test]
fn test_recursion() {
    let source = "\
def fact(n:int)->int:
  if n <= 1:
    return 1
  return n * fact(n - 1)
print(fact(10))";
    expect_output(source, &["3628800"]);
}

#[test]
fn test_capture_in_loop() {
    let source = "\
def sum_to(limit:int)->int:
  acc:int = 0
  i:int = 0
  def add(v:int):
    nonlocal acc
    acc = acc + v
  while i < limit:
    i = i + 1
    add(i)
  return acc
print(sum_to(10))";
    expect_output(source, &["55"]);
}
