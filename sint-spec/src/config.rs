//! # Target Configuration
//!
//! Selects the program version emitted by code generation and the stack
//! depth limit that generated code must respect.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Highest program version understood by this toolchain
pub const MAX_VERSION: u8 = 8;

/// Stack depth limit of the target machine
pub const MAX_STACK_DEPTH: u32 = 1000;

/// Code generation target configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    /// Program version (1-8). COVER/UNCOVER need version 5.
    pub version: u8,
    /// Maximum stack depth the generated code may reach (1-1000)
    pub max_stack_depth: u32,
}

impl Config {
    /// Default configuration: version 5, full 1000-word stack
    pub const DEFAULT: Self = Self {
        version: 5,
        max_stack_depth: MAX_STACK_DEPTH,
    };

    /// Create a new configuration with validation
    pub const fn new(version: u8, max_stack_depth: u32) -> Result<Self, ConfigError> {
        let config = Self {
            version,
            max_stack_depth,
        };

        if version < 1 || version > MAX_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }
        if max_stack_depth < 1 || max_stack_depth > MAX_STACK_DEPTH {
            return Err(ConfigError::InvalidStackDepth(max_stack_depth));
        }

        Ok(config)
    }

    /// Configuration for a specific version with the default stack limit
    pub const fn with_version(version: u8) -> Result<Self, ConfigError> {
        Self::new(version, MAX_STACK_DEPTH)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.version, self.max_stack_depth).map(|_| ())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ version: {}, max_stack_depth: {} }}",
            self.version, self.max_stack_depth
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("version {0} not in range [1, 8]")]
    UnsupportedVersion(u8),

    #[error("max_stack_depth {0} not in range [1, 1000]")]
    InvalidStackDepth(u32),
}
