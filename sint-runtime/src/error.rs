//! Runtime error types

use sint_spec::{Opcode, SpecError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Spec error: {0}")]
    SpecError(#[from] SpecError),

    // ========== Deliberate aborts ==========
    #[error("Assertion failed at instruction {pc}")]
    AssertionFailed { pc: usize },

    #[error("err executed at instruction {pc}")]
    Err { pc: usize },

    // ========== Machine faults ==========
    #[error("Stack underflow at instruction {pc}: needs {needed}, depth {depth}")]
    StackUnderflow {
        pc: usize,
        needed: usize,
        depth: usize,
    },

    #[error("Stack overflow: depth limit {limit}")]
    StackOverflow { limit: usize },

    #[error("Shift amount {amount} out of range at instruction {pc}")]
    ShiftOutOfRange { pc: usize, amount: u64 },

    #[error("Bit index {index} out of range at instruction {pc}")]
    BitIndexOutOfRange { pc: usize, index: u64 },

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Opcode {opcode} not available in version {version}")]
    OpcodeNotAvailable { opcode: Opcode, version: u8 },

    #[error("Cycle limit exceeded: {limit}")]
    CycleLimitExceeded { limit: u64 },

    #[error("Program finished with {depth} value(s) on the stack, expected 1")]
    FinalStack { depth: usize },

    #[error("{0}")]
    Other(String),
}

impl RuntimeError {
    /// Check if the program aborted itself (`assert` or `err`) rather than
    /// faulting
    pub fn is_trap(&self) -> bool {
        matches!(
            self,
            RuntimeError::AssertionFailed { .. } | RuntimeError::Err { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
