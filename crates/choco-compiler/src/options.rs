//! Compiler options
//!
//! Options can be built in code or loaded from a TOML file:
//!
//! ```toml
//! memory_pages = 2
//! heap_base = 16
//! entry_export = "main"
//! ```
//!
//! Missing keys keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Options errors
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid options: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Minimum size of the imported memory, in 64 KiB pages
    pub memory_pages: u32,
    /// First heap address handed out by the allocator. Address 0 is the
    /// null object and is never allocated.
    pub heap_base: u32,
    /// Export name of the entry function
    pub entry_export: String,
    /// Import module of the print and arithmetic host functions
    pub import_module: String,
    /// Import module of the null-object guard
    pub check_module: String,
    /// Import module and field of the linear memory
    pub memory_module: String,
    pub memory_field: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            memory_pages: 1,
            heap_base: 4,
            entry_export: "exported_func".to_string(),
            import_module: "imports".to_string(),
            check_module: "check".to_string(),
            memory_module: "js".to_string(),
            memory_field: "memory".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        let options: CompilerOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.heap_base == 0 || self.heap_base % 4 != 0 {
            return Err(OptionsError::Invalid(format!(
                "heap_base must be a non-zero multiple of 4, got {}",
                self.heap_base
            )));
        }
        if self.memory_pages == 0 {
            return Err(OptionsError::Invalid(
                "memory_pages must be at least 1".to_string(),
            ));
        }
        if u64::from(self.heap_base) >= u64::from(self.memory_pages) * 65536 {
            return Err(OptionsError::Invalid(
                "heap_base lies outside the configured memory".to_string(),
            ));
        }
        if self.entry_export.is_empty() {
            return Err(OptionsError::Invalid(
                "entry_export must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
