//! Conditionals and loops

use super::harness::*;

#[test]
fn test_if_elif_else() {
    let source = "\
def classify(n:int)->int:
  if n < 0:
    return -1
  elif n == 0:
    return 0
  else:
    return 1
print(classify(-5))
print(classify(0))
print(classify(8))";
    expect_output(source, &["-1", "0", "1"]);
}

#[test]
fn test_if_without_else() {
    expect_output(
        "x:int = 1\nif x > 0:\n  print(x)\nif x > 5:\n  print(0)\n",
        &["1"],
    );
}

#[test]
fn test_only_first_true_branch_runs() {
    let source = "\
x:int = 5
if x > 1:
  print(1)
elif x > 2:
  print(2)
else:
  print(3)";
    expect_output(source, &["1"]);
}

#[test]
fn test_while_loop() {
    expect_output(
        "i:int = 0\nwhile i < 3:\n  print(i)\n  i = i + 1\n",
        &["0", "1", "2"],
    );
}

#[test]
fn test_nested_loops() {
    let source = "\
i:int = 0
j:int = 0
total:int = 0
while i < 4:
  j = 0
  while j < i:
    total = total + 1
    j = j + 1
  i = i + 1
print(total)";
    expect_output(source, &["6"]);
}

#[test]
fn test_return_from_loop() {
    let source = "\
def first_multiple(n:int, limit:int)->int:
  i:int = 1
  while i < limit:
    if i % n == 0:
      return i
    i = i + 1
  return -1
print(first_multiple(7, 100))
print(first_multiple(7, 5))";
    expect_output(source, &["7", "-1"]);
}

#[test]
fn test_bool_logic() {
    expect_output(
        "b:bool = False\nif not b:\n  print(True)\nprint(b == False)",
        &["True", "True"],
    );
}
