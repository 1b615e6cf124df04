//! Shape tests for generated modules

use choco_compiler::ir::Function;
use choco_compiler::{compile, compile_to_text, compile_with_options, CompilerOptions, ErrorKind, Instr};
use pretty_assertions::assert_eq;

fn contains_seq(body: &[Instr], seq: &[Instr]) -> bool {
    body.windows(seq.len()).any(|window| window == seq)
}

fn entry(source: &str) -> Function {
    let module = compile(source).unwrap();
    module.function("#entry").unwrap().clone()
}

fn local_get(name: &str) -> Instr {
    Instr::LocalGet(name.to_string())
}

#[test]
fn test_print_expression_statement() {
    let module = compile("print(1 + 2)").unwrap();
    let main = module.function("#entry").unwrap();
    assert!(contains_seq(
        &main.body,
        &[
            Instr::I32Const(1),
            Instr::I32Const(2),
            Instr::I32Add,
            Instr::Call("#print_num".into()),
            Instr::I32Const(0),
            Instr::LocalSet("#scratch".into()),
        ]
    ));
    assert_eq!(main.body.last(), Some(&local_get("#scratch")));
    assert_eq!(module.export.name, "exported_func");
    assert!(module.export.has_result);
}

#[test]
fn test_print_selects_import_by_type() {
    let main = entry("print(True)\nprint(None)");
    assert!(main.body.contains(&Instr::Call("#print_bool".into())));
    assert!(main.body.contains(&Instr::Call("#print_none".into())));
    assert!(!main.body.contains(&Instr::Call("#print_num".into())));
}

#[test]
fn test_globals_and_heap() {
    let module = compile("x:int = 5\nb:bool = True\nx = x + 1").unwrap();
    let heap = module.global("#heap").unwrap();
    assert_eq!(heap.init, 4);
    assert_eq!(module.global("x").unwrap().init, 5);
    assert_eq!(module.global("b").unwrap().init, 1);
    assert!(!module.export.has_result);

    let main = module.function("#entry").unwrap();
    assert!(contains_seq(
        &main.body,
        &[
            Instr::GlobalGet("x".into()),
            Instr::I32Const(1),
            Instr::I32Add,
            Instr::GlobalSet("x".into()),
        ]
    ));
}

#[test]
fn test_imports_declared() {
    let module = compile("pass").unwrap();
    let fields: Vec<_> = module
        .imports
        .iter()
        .map(|i| (i.module.as_str(), i.field.as_str()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("imports", "print_num"),
            ("imports", "print_bool"),
            ("imports", "print_none"),
            ("imports", "abs"),
            ("imports", "min"),
            ("imports", "max"),
            ("imports", "pow"),
            ("check", "check_init"),
        ]
    );
    assert_eq!(module.memory.module, "js");
    assert_eq!(module.memory.field, "memory");
}

#[test]
fn test_unary_lowering() {
    let main = entry("x:int = 3\nprint(-x)\nprint(not True)");
    assert!(contains_seq(
        &main.body,
        &[Instr::I32Const(0), Instr::GlobalGet("x".into()), Instr::I32Sub]
    ));
    assert!(contains_seq(&main.body, &[Instr::I32Const(1), Instr::I32Eqz]));
}

#[test]
fn test_while_structure() {
    let main = entry("i:int = 0\nwhile i < 3:\n  i = i + 1\n");
    let head = main
        .body
        .iter()
        .position(|i| matches!(i, Instr::Loop(_)))
        .unwrap();
    assert!(matches!(main.body[head - 1], Instr::Block(_)));
    assert!(contains_seq(
        &main.body,
        &[Instr::I32LtS, Instr::I32Eqz]
    ));
    assert!(main.body.iter().any(|i| matches!(i, Instr::BrIf(_))));
    let ends = main.body.iter().filter(|i| **i == Instr::End).count();
    let opens = main.body.iter().filter(|i| i.opens_region()).count();
    assert_eq!(ends, opens);
}

#[test]
fn test_if_elif_else_balanced() {
    let source = "\
x:int = 2
if x == 1:
  print(1)
elif x == 2:
  print(2)
else:
  print(3)
";
    let main = entry(source);
    let ifs = main.body.iter().filter(|i| **i == Instr::If).count();
    assert_eq!(ifs, 2);
    let ends = main.body.iter().filter(|i| **i == Instr::End).count();
    let opens = main.body.iter().filter(|i| i.opens_region()).count();
    assert_eq!(ends, opens);
    assert_eq!(
        main.body.iter().filter(|i| matches!(i, Instr::Br(_))).count(),
        2
    );
}

#[test]
fn test_vtable_and_dispatch() {
    let source = "\
class A(object):
  def f(self:A)->int:
    return 1
class B(A):
  def f(self:B)->int:
    return 2
a:A = None
a = B()
print(a.f())
";
    let module = compile(source).unwrap();
    assert_eq!(
        module.table,
        vec![
            "object$__init__".to_string(),
            "object$__init__".to_string(),
            "A$f".to_string(),
            "object$__init__".to_string(),
            "B$f".to_string(),
        ]
    );
    assert!(module.function("A$f").is_some());
    assert!(module.function("B$f").is_some());
    assert_eq!(module.function("B$f").unwrap().params, vec!["self".to_string()]);

    let main = module.function("#entry").unwrap();
    // B's vtable segment starts at 3
    assert!(contains_seq(
        &main.body,
        &[
            local_get("#new"),
            Instr::I32Const(3),
            Instr::I32Store { offset: 0 },
        ]
    ));
    assert!(contains_seq(
        &main.body,
        &[
            Instr::I32Load { offset: 0 },
            Instr::I32Const(1),
            Instr::I32Add,
            Instr::CallIndirect { ty: "#sig1".into() },
        ]
    ));
    assert!(module.func_type("#sig1").is_some());
}

#[test]
fn test_construction_initializes_fields() {
    let source = "\
class P(object):
  x:int = 7
  y:bool = True
p:P = None
p = P()
";
    let main = entry(source);
    assert!(contains_seq(
        &main.body,
        &[Instr::I32Const(3), Instr::Call("#alloc".into()), Instr::LocalSet("#new".into())]
    ));
    assert!(contains_seq(
        &main.body,
        &[local_get("#new"), Instr::I32Const(7), Instr::I32Store { offset: 4 }]
    ));
    assert!(contains_seq(
        &main.body,
        &[local_get("#new"), Instr::I32Const(1), Instr::I32Store { offset: 8 }]
    ));
    assert!(contains_seq(
        &main.body,
        &[
            local_get("#new"),
            Instr::Call("object$__init__".into()),
            Instr::Drop,
            local_get("#new"),
        ]
    ));
}

#[test]
fn test_field_access_is_guarded() {
    let source = "\
class P(object):
  x:int = 0
  y:int = 0
p:P = None
p.y = 4
print(p.y)
";
    let main = entry(source);
    assert!(contains_seq(
        &main.body,
        &[
            Instr::GlobalGet("p".into()),
            Instr::Call("#check_init".into()),
            Instr::I32Const(4),
            Instr::I32Store { offset: 8 },
        ]
    ));
    assert!(contains_seq(
        &main.body,
        &[
            Instr::GlobalGet("p".into()),
            Instr::Call("#check_init".into()),
            Instr::I32Load { offset: 8 },
        ]
    ));
}

#[test]
fn test_nonlocal_capture_uses_cells() {
    let source = "\
def f(a:int)->int:
  def g(b:int)->int:
    nonlocal a
    a = a + 3
    return a + b
  return g(2) + g(2)
print(f(1))
";
    let module = compile(source).unwrap();
    let f = module.function("f").unwrap();
    let g = module.function("f$g").unwrap();

    assert_eq!(g.params, vec!["b".to_string(), "a".to_string()]);
    // `a` is boxed on entry to f
    assert!(contains_seq(
        &f.body,
        &[
            Instr::I32Const(1),
            Instr::Call("#alloc".into()),
            Instr::LocalSet("#cell".into()),
            local_get("#cell"),
            local_get("a"),
            Instr::I32Store { offset: 0 },
            local_get("#cell"),
            Instr::LocalSet("a".into()),
        ]
    ));
    // Calls pass the cell address
    assert!(contains_seq(
        &f.body,
        &[Instr::I32Const(2), local_get("a"), Instr::Call("f$g".into())]
    ));
    // Writes through the cell
    assert!(contains_seq(
        &g.body,
        &[
            local_get("a"),
            local_get("a"),
            Instr::I32Load { offset: 0 },
            Instr::I32Const(3),
            Instr::I32Add,
            Instr::I32Store { offset: 0 },
        ]
    ));
}

#[test]
fn test_captured_local_allocated_in_cell() {
    let source = "\
def f()->int:
  x:int = 10
  def g()->int:
    return x
  return g()
print(f())
";
    let module = compile(source).unwrap();
    let f = module.function("f").unwrap();
    assert!(contains_seq(
        &f.body,
        &[
            Instr::I32Const(1),
            Instr::Call("#alloc".into()),
            Instr::LocalSet("x".into()),
            local_get("x"),
            Instr::I32Const(10),
            Instr::I32Store { offset: 0 },
        ]
    ));
    let g = module.function("f$g").unwrap();
    assert!(contains_seq(
        &g.body,
        &[local_get("x"), Instr::I32Load { offset: 0 }, Instr::Return]
    ));
}

#[test]
fn test_every_function_ends_with_default_result() {
    let module = compile("def f():\n  pass\nf()").unwrap();
    let f = module.function("f").unwrap();
    assert_eq!(f.body, vec![Instr::I32Const(0)]);
}

#[test]
fn test_options_applied() {
    let options = CompilerOptions {
        memory_pages: 2,
        heap_base: 64,
        entry_export: "main".into(),
        ..CompilerOptions::default()
    };
    let module = compile_with_options("print(1)", &options).unwrap();
    assert_eq!(module.memory.min_pages, 2);
    assert_eq!(module.global("#heap").unwrap().init, 64);
    assert_eq!(module.export.name, "main");
}

#[test]
fn test_errors_categorized() {
    assert_eq!(compile("x = ").unwrap_err().kind(), ErrorKind::Parse);
    assert_eq!(compile("print(y)").unwrap_err().kind(), ErrorKind::Reference);
    assert_eq!(compile("x:int = True").unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(
        compile("class A(B):\n  pass\nclass B(A):\n  pass\n")
            .unwrap_err()
            .kind(),
        ErrorKind::Layout
    );
}

#[test]
fn test_text_output() {
    let text = compile_to_text("print(1)").unwrap();
    assert!(text.starts_with("(module"));
    assert!(text.contains("(import \"imports\" \"print_num\""));
    assert!(text.contains("call $#print_num"));
    assert!(text.contains("(export \"exported_func\""));
}
