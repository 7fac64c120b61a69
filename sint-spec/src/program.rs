//! # Program Structure
//!
//! A program is a version number and a linear instruction sequence whose
//! branches refer to label pseudo-instructions by name.

use crate::config::{ConfigError, MAX_VERSION};
use crate::error::SpecError;
use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Complete program
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Program version
    pub version: u8,

    /// Instruction sequence (labels included)
    pub code: Vec<Instruction>,
}

impl Program {
    /// Create a new empty program
    pub fn new(version: u8) -> Self {
        Self {
            version,
            code: Vec::new(),
        }
    }

    /// Create a program from an instruction sequence
    pub fn with_code(version: u8, code: Vec<Instruction>) -> Self {
        Self { version, code }
    }

    /// Number of executable instructions (labels excluded)
    pub fn instruction_count(&self) -> usize {
        self.code
            .iter()
            .filter(|inst| !matches!(inst, Instruction::Label { .. }))
            .count()
    }

    /// Map each label to the index of its marker in `code`
    pub fn labels(&self) -> Result<HashMap<String, usize>, SpecError> {
        let mut labels = HashMap::new();
        for (index, inst) in self.code.iter().enumerate() {
            if let Instruction::Label { name } = inst {
                if labels.insert(name.clone(), index).is_some() {
                    return Err(SpecError::DuplicateLabel(name.clone()));
                }
            }
        }
        Ok(labels)
    }

    /// Validate the program
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.version < 1 || self.version > MAX_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version).into());
        }

        let labels = self.labels()?;

        for inst in &self.code {
            if let Some(target) = inst.branch_target() {
                if !labels.contains_key(target) {
                    return Err(SpecError::UndefinedLabel(target.to_string()));
                }
            }
            if let Some(opcode) = inst.opcode() {
                if opcode.min_version() > self.version {
                    return Err(SpecError::OpcodeNotAvailable {
                        opcode,
                        required: opcode.min_version(),
                        version: self.version,
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new(crate::config::Config::DEFAULT.version)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#pragma version {}", self.version)?;
        for inst in &self.code {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}
