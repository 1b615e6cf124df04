//! Target module representation

pub mod instr;
pub mod module;
pub mod pretty;

pub use instr::Instr;
pub use module::{Export, FuncType, Function, Global, Import, Memory, Module};
pub use pretty::PrettyPrint;
