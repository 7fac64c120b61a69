//! VM state

use crate::error::{Result, RuntimeError};
use sint_spec::Word;

/// VM state
#[derive(Debug, Clone)]
pub struct VMState {
    /// Value stack, top at the end
    pub stack: Vec<Word>,

    /// Index of the next instruction in the program code
    pub pc: usize,

    /// Executed instruction count (labels excluded)
    pub cycles: u64,

    /// Halted flag
    pub halted: bool,

    /// Halt reason
    pub halt_reason: Option<HaltReason>,

    max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// `return` executed
    Return,
    /// Ran past the last instruction
    EndOfProgram,
}

impl VMState {
    pub fn new(max_depth: usize) -> Self {
        VMState {
            stack: Vec::new(),
            pc: 0,
            cycles: 0,
            halted: false,
            halt_reason: None,
            max_depth,
        }
    }

    /// Current stack depth
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Fail unless at least `needed` values are on the stack
    #[inline]
    pub fn require(&self, needed: usize) -> Result<()> {
        if self.stack.len() < needed {
            return Err(RuntimeError::StackUnderflow {
                pc: self.pc,
                needed,
                depth: self.stack.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn push(&mut self, value: Word) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.max_depth,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Word> {
        self.require(1)?;
        Ok(self.stack.pop().unwrap_or_default())
    }

    /// Pop the operands of a binary instruction: `(A, B)` with B on top
    #[inline]
    pub fn pop2(&mut self) -> Result<(Word, Word)> {
        self.require(2)?;
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    /// Halt execution
    pub fn halt(&mut self, reason: HaltReason) {
        self.halted = true;
        self.halt_reason = Some(reason);
    }
}
