//! Disassembler errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisassemblerError {
    #[error("Unknown opcode 0x{byte:02X} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },

    #[error("Truncated instruction at offset {offset}")]
    Truncated { offset: usize },

    #[error("Malformed varint at offset {offset}")]
    InvalidVarint { offset: usize },

    #[error("Unsupported program version {0}")]
    UnsupportedVersion(u64),

    #[error("Branch at offset {offset} targets {target}, which is not an instruction boundary")]
    InvalidBranchTarget { offset: usize, target: i64 },
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
