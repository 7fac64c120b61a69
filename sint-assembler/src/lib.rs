//! Stack Machine Assembler
//!
//! Assemble the text listing into a [`Program`](sint_spec::Program) and
//! encode programs to bytecode.
//!
//! ## Example
//!
//! ```rust
//! use sint_assembler::{assemble, encode};
//!
//! let source = r#"
//!     #pragma version 5
//!     int 12
//!     dup
//!     pushint 63
//!     getbit
//! "#;
//!
//! let program = assemble(source).unwrap();
//! let bytes = encode(&program).unwrap();
//! assert_eq!(bytes[0], 5);
//! ```

pub mod assembler;
pub mod encoder;
pub mod error;
pub mod lexer;
pub mod parser;

pub use assembler::{assemble, assemble_bytes};
pub use encoder::{encode, instruction_size, write_uvarint};
pub use error::{AssemblerError, Result};
pub use parser::{parse_instruction, parse_line, Statement};
