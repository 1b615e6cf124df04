//! Runtime configuration
//!
//! ```toml
//! memory_pages = 4
//! max_call_depth = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Pages of memory to provide; a module asking for more gets what it
    /// asks for, up to `max_memory_pages`
    pub memory_pages: u32,
    pub max_memory_pages: u32,
    /// Nested calls allowed before [`Trap::CallStackExhausted`](crate::Trap)
    pub max_call_depth: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            memory_pages: 1,
            max_memory_pages: 256,
            max_call_depth: 1000,
        }
    }
}

impl RuntimeConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_pages > self.max_memory_pages {
            return Err(ConfigError::Invalid(format!(
                "memory_pages ({}) exceeds max_memory_pages ({})",
                self.memory_pages, self.max_memory_pages
            )));
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = RuntimeConfig::from_toml_str("max_call_depth = 50\n").unwrap();
        assert_eq!(config.max_call_depth, 50);
        assert_eq!(config.memory_pages, 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("memory_pages = 9\nmax_memory_pages = 2\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_toml_str("max_call_depth = -1\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
