//! Test harness for end-to-end compilation and execution

use choco_compiler::{compile, CompileError, ErrorKind};
use choco_runtime::{CapturingHost, Runtime, RuntimeConfig, RuntimeError, Trap};
use pretty_assertions::assert_eq;

/// Error type for e2e tests
#[derive(Debug)]
pub enum E2EError {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl std::fmt::Display for E2EError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            E2EError::Compile(e) => write!(f, "Compile error ({}): {}", e.kind(), e),
            E2EError::Runtime(e) => write!(f, "Runtime error: {}", e),
        }
    }
}

/// Printed lines and the entry result
pub struct Run {
    pub output: Vec<String>,
    pub result: Option<i32>,
}

/// Compile and execute, keeping the output printed before any trap
pub fn compile_and_run(source: &str) -> (Vec<String>, Result<Option<i32>, E2EError>) {
    let module = match compile(source) {
        Ok(module) => module,
        Err(e) => return (Vec::new(), Err(E2EError::Compile(e))),
    };
    let mut runtime = Runtime::new(RuntimeConfig::default(), CapturingHost::new());
    let result = runtime.run(&module).map_err(E2EError::Runtime);
    (runtime.into_host().into_lines(), result)
}

pub fn run(source: &str) -> Run {
    match compile_and_run(source) {
        (output, Ok(result)) => Run { output, result },
        (_, Err(e)) => panic!("Compilation/execution failed: {}\nSource:\n{}", e, source),
    }
}

/// Expect the program to print exactly `expected`
pub fn expect_output(source: &str, expected: &[&str]) {
    let run = run(source);
    assert_eq!(run.output, expected, "Wrong output for:\n{}", source);
}

/// Expect the entry function to produce `expected`
pub fn expect_result(source: &str, expected: i32) {
    let run = run(source);
    assert_eq!(run.result, Some(expected), "Wrong result for:\n{}", source);
}

/// Expect compilation to fail with an error of `kind`
pub fn expect_compile_error(source: &str, kind: ErrorKind) {
    match compile(source) {
        Ok(_) => panic!("Expected {} but compilation succeeded\nSource:\n{}", kind, source),
        Err(e) => assert_eq!(e.kind(), kind, "Wrong error ({}) for:\n{}", e, source),
    }
}

/// Expect execution to trap with `trap` after printing `output`
pub fn expect_trap(source: &str, output: &[&str], trap: Trap) {
    match compile_and_run(source) {
        (printed, Err(E2EError::Runtime(RuntimeError::Trap(actual)))) => {
            assert_eq!(actual, trap, "Wrong trap for:\n{}", source);
            assert_eq!(printed, output, "Wrong output before trap for:\n{}", source);
        }
        (_, Err(e)) => panic!("Expected trap {:?}, got: {}\nSource:\n{}", trap, e, source),
        (_, Ok(_)) => panic!("Expected trap {:?} but execution finished\nSource:\n{}", trap, source),
    }
}
