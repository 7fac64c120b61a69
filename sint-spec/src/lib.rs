//! # Signed Integer Stack Machine Specification
//!
//! Core types shared by the code generator, runtime, assembler and
//! disassembler.
//!
//! ## Key Features
//! - Unsigned 64-bit words as the only value type
//! - Implicit last-in-first-out value stack, no addressable memory
//! - Single-byte opcodes; `pushint`, `cover`, `uncover` and branches carry immediates
//! - Program versions gate newer opcodes (COVER/UNCOVER need version 5)
//! - Two's-complement encoding of signed 64-bit integers ([`value`])

pub mod config;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

pub use config::{Config, ConfigError, MAX_STACK_DEPTH, MAX_VERSION};
pub use error::SpecError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::Program;
pub use value::{decode, encode, parse_literal, SignedWord, ValueError, Word};
