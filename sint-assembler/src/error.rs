//! Assembler errors

use sint_spec::SpecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown instruction at line {line}: {mnemonic}")]
    UnknownInstruction { line: usize, mnemonic: String },

    #[error("Invalid immediate at line {line}: {message}")]
    InvalidImmediate { line: usize, message: String },

    #[error("Invalid directive at line {line}: {message}")]
    InvalidDirective { line: usize, message: String },

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Branch to {label} out of range: offset {offset}")]
    BranchOutOfRange { label: String, offset: i64 },

    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
