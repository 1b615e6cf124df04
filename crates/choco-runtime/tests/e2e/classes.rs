//! Objects, inheritance and dynamic dispatch

use super::harness::*;

#[test]
fn test_field_defaults() {
    let source = "\
class P(object):
  x:int = 3
  ok:bool = True
p:P = None
p = P()
print(p.x)
print(p.ok)";
    expect_output(source, &["3", "True"]);
}

#[test]
fn test_inherited_fields_and_methods() {
    let source = "\
class Base(object):
  a:int = 1
  def get_a(self:Base)->int:
    return self.a
class Derived(Base):
  b:int = 2
  def sum(self:Derived)->int:
    return self.get_a() + self.b
d:Derived = None
d = Derived()
d.a = 40
print(d.sum())";
    expect_output(source, &["42"]);
}

#[test]
fn test_override_selected_at_runtime() {
    let source = "\
class Animal(object):
  def sound(self:Animal)->int:
    return 0
class Dog(Animal):
  def sound(self:Dog)->int:
    return 1
class Puppy(Dog):
  def sound(self:Puppy)->int:
    return 2
a:Animal = None
a = Animal()
print(a.sound())
a = Dog()
print(a.sound())
a = Puppy()
print(a.sound())";
    expect_output(source, &["0", "1", "2"]);
}

#[test]
fn test_inherited_method_uses_subclass_override() {
    let source = "\
class A(object):
  def name(self:A)->int:
    return 1
  def twice(self:A)->int:
    return self.name() * 2
class B(A):
  def name(self:B)->int:
    return 5
b:B = None
b = B()
print(b.twice())";
    expect_output(source, &["10"]);
}

#[test]
fn test_init_runs_on_construction() {
    let source = "\
class Box(object):
  v:int = 0
  def __init__(self:Box):
    self.v = 9
b:Box = None
b = Box()
print(b.v)";
    expect_output(source, &["9"]);
}

#[test]
fn test_method_arguments() {
    let source = "\
class Acc(object):
  total:int = 0
  def add(self:Acc, n:int, m:int)->int:
    self.total = self.total + n * m
    return self.total
a:Acc = None
a = Acc()
a.add(2, 3)
print(a.add(1, 4))";
    expect_output(source, &["10"]);
}

#[test]
fn test_object_fields_and_identity() {
    let source = "\
class Node(object):
  value:int = 0
  next:Node = None
a:Node = None
b:Node = None
a = Node()
b = Node()
a.next = b
b.value = 7
print(a.next.value)
print(a.next is b)
print(a is b)
print(b.next is None)";
    expect_output(source, &["7", "True", "False", "True"]);
}

#[test]
fn test_objects_are_distinct() {
    let source = "\
class C(object):
  n:int = 0
x:C = None
y:C = None
x = C()
y = C()
x.n = 1
y.n = 2
print(x.n + y.n)";
    expect_output(source, &["3"]);
}
