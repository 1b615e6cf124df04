//! Pretty-printing for modules
//!
//! Renders a module in WebAssembly text style, one instruction per line,
//! indented by structured nesting depth.

use super::instr::Instr;
use super::module::{Function, Module};
use std::fmt::{self, Write};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Module {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail
        let _ = write_module(&mut output, self);
        output
    }
}

impl PrettyPrint for Function {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        let _ = write_function(&mut output, self, 1);
        output
    }
}

fn write_module(out: &mut String, module: &Module) -> fmt::Result {
    writeln!(out, "(module")?;

    for import in &module.imports {
        write!(
            out,
            "  (import \"{}\" \"{}\" (func ${}",
            import.module, import.field, import.name
        )?;
        if import.params > 0 {
            write!(out, " (param{})", " i32".repeat(import.params))?;
        }
        if import.has_result {
            write!(out, " (result i32)")?;
        }
        writeln!(out, "))")?;
    }
    writeln!(
        out,
        "  (import \"{}\" \"{}\" (memory {}))",
        module.memory.module, module.memory.field, module.memory.min_pages
    )?;

    for ty in &module.types {
        write!(out, "  (type ${} (func", ty.name)?;
        if ty.params > 0 {
            write!(out, " (param{})", " i32".repeat(ty.params))?;
        }
        writeln!(out, " (result i32)))")?;
    }

    for global in &module.globals {
        let ty = if global.mutable { "(mut i32)" } else { "i32" };
        writeln!(
            out,
            "  (global ${} {} (i32.const {}))",
            global.name, ty, global.init
        )?;
    }

    writeln!(out, "  (table {} funcref)", module.table.len())?;
    if !module.table.is_empty() {
        write!(out, "  (elem (i32.const 0)")?;
        for entry in &module.table {
            write!(out, " ${}", entry)?;
        }
        writeln!(out, ")")?;
    }

    for function in &module.functions {
        write_function(out, function, 1)?;
    }

    writeln!(
        out,
        "  (export \"{}\" (func ${}))",
        module.export.name, module.export.function
    )?;
    writeln!(out, ")")
}

fn write_function(out: &mut String, function: &Function, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    write!(out, "{}(func ${}", indent, function.name)?;
    for param in &function.params {
        write!(out, " (param ${} i32)", param)?;
    }
    write!(out, " (result i32)")?;
    for local in &function.locals {
        write!(out, " (local ${} i32)", local)?;
    }
    writeln!(out)?;

    let mut level = depth + 1;
    for instr in &function.body {
        if matches!(instr, Instr::End | Instr::Else) {
            level = level.saturating_sub(1).max(depth + 1);
        }
        writeln!(out, "{}{}", "  ".repeat(level), instr)?;
        if instr.opens_region() || matches!(instr, Instr::Else) {
            level += 1;
        }
    }

    writeln!(out, "{})", indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function_indentation() {
        let function = Function {
            name: "f".to_string(),
            params: vec!["x".to_string()],
            locals: vec![],
            body: vec![
                Instr::LocalGet("x".into()),
                Instr::If,
                Instr::I32Const(1),
                Instr::Return,
                Instr::Else,
                Instr::I32Const(2),
                Instr::Return,
                Instr::End,
                Instr::I32Const(0),
            ],
        };
        let expected = "  (func $f (param $x i32) (result i32)
    local.get $x
    if
      i32.const 1
      return
    else
      i32.const 2
      return
    end
    i32.const 0
  )
";
        assert_eq!(function.pretty_print(), expected);
    }
}
