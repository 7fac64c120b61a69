//! # Stack Machine Disassembler
//!
//! Decode bytecode into a [`Program`](sint_spec::Program) and format it as
//! an assembly listing the assembler accepts again.
//!
//! ## Example
//!
//! ```rust
//! use sint_disassembler::disassemble;
//!
//! // version 5 | pushint 12 | dup
//! let listing = disassemble(&[0x05, 0x81, 0x0C, 0x49]).unwrap();
//! assert_eq!(listing, "#pragma version 5\n    pushint 12\n    dup\n");
//! ```

pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod formatter;

pub use decoder::{decode, read_uvarint};
pub use disassembler::disassemble;
pub use error::{DisassemblerError, Result};
pub use formatter::{format, format_program};
