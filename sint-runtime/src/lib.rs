//! # Stack Machine Runtime
//!
//! Reference interpreter for programs over 64-bit unsigned words.
//!
//! A failed `assert` ends execution with [`RuntimeError::AssertionFailed`];
//! generated signed arithmetic relies on this to abort on overflow.
//!
//! ## Example
//!
//! ```rust
//! use sint_runtime::{VM, VMConfig};
//! use sint_spec::{Instruction, Program};
//!
//! let program = Program::with_code(5, vec![Instruction::PushInt { value: 7 }]);
//! let result = VM::new(program, VMConfig::default()).unwrap().run().unwrap();
//! assert_eq!(result.top(), Some(7));
//! ```

pub mod error;
pub mod execute;
pub mod state;
pub mod vm;

pub use error::{Result, RuntimeError};
pub use state::{HaltReason, VMState};
pub use vm::{ExecutionResult, VMConfig, VM};

use sint_spec::{Program, Word};

/// Simple execution helper
///
/// Runs a program with the default configuration and returns its single
/// result word.
pub fn run(program: &Program) -> Result<Word> {
    let result = VM::new(program.clone(), VMConfig::default())?.run()?;
    match result.stack.as_slice() {
        [value] => Ok(*value),
        stack => Err(RuntimeError::FinalStack { depth: stack.len() }),
    }
}
