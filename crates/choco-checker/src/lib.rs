//! Choco Checker
//!
//! Semantic analysis for Choco programs:
//!
//! - [`env`]: the stack-of-scopes name environment
//! - [`hierarchy`]: class layout and vtable resolution
//! - [`checker`]: type checking and closure capture analysis
//! - [`diagnostic`]: rendering of parse and check errors

pub mod captures;
pub mod checker;
pub mod diagnostic;
pub mod env;
pub mod error;
pub mod hierarchy;
pub mod returns;
pub mod vars;

pub use captures::{CaptureInfo, FunctionCaptures};
pub use checker::{check, CheckedProgram};
pub use diagnostic::{create_files, Diagnostic, ErrorCode};
pub use env::{Env, SearchMode};
pub use error::{CheckError, CheckErrorKind, CheckResult};
pub use hierarchy::{ClassLayout, ClassTable, FieldLayout, MethodEntry, Vtable, INIT_METHOD, WORD_SIZE};
pub use vars::{FunctionInfo, VarArena, VarInfo, VarKind};
