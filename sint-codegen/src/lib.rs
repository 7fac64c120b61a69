//! # Signed Integer Code Generation
//!
//! Builds expression trees that perform two's-complement signed 64-bit
//! arithmetic on a machine whose only value type is the unsigned 64-bit
//! word, and lowers them to [`sint_spec::Program`]s.
//!
//! ## Example
//!
//! ```
//! use sint_codegen::{build_add, compile, sint};
//! use sint_spec::Config;
//!
//! let sum = build_add(sint(12).unwrap(), sint(-1).unwrap());
//! let program = compile(&sum, &Config::DEFAULT).unwrap();
//! assert_eq!(program.version, 5);
//! ```
//!
//! ## Builders
//! - [`build_add`] / [`build_sub`]: trap on signed overflow
//! - [`build_negate`]: traps on `-2^63`; [`build_negate_wrapping`] does not
//! - [`build_shift_right`]: arithmetic shift, `floor(a / 2^k)`

pub mod arith;
pub mod error;
pub mod lower;
pub mod node;
pub mod shift;

pub use arith::{
    build_add, build_negate, build_negate_wrapping, build_sub, int, sint, sint_literal,
};
pub use error::{CodegenError, Result};
pub use lower::{compile, Lowerer};
pub use node::{Node, StackEffect, ValueType};
pub use shift::{build_shift_right, build_shift_right_by, MAX_SHIFT};
