//! End-to-end tests for the Choco compiler
//!
//! These tests compile Choco source, run the module in the reference
//! runtime and check what it prints.

mod harness;
mod builtins;
mod classes;
mod closures;
mod control_flow;
mod scenarios;
mod traps;

pub use harness::*;
