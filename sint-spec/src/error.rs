//! # Error Types

use crate::config::ConfigError;
use crate::opcode::Opcode;
use crate::value::ValueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ValueError),

    // Instruction errors
    #[error("Opcode {opcode} takes {expected} immediate(s), found {found}")]
    InvalidImmediates {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    #[error("Immediate {value} out of range for opcode {opcode}")]
    ImmediateOutOfRange { opcode: Opcode, value: u64 },

    #[error("Branch opcode {0} needs a label target")]
    BranchRequiresLabel(Opcode),

    #[error("Opcode {opcode} requires version {required}, program is version {version}")]
    OpcodeNotAvailable {
        opcode: Opcode,
        required: u8,
        version: u8,
    },

    // Program errors
    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),
}
