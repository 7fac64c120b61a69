//! Instruction Set
//!
//! Every instruction operates on the implicit stack of 64-bit words. Only
//! `pushint`, `cover`, `uncover` and the branches carry immediates; labels
//! are pseudo-instructions that mark branch targets and occupy no bytes.

use crate::error::SpecError;
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};

/// Stack machine instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    // ========== Abort ==========
    /// ERR: fail immediately
    Err,

    // ========== Compare / Logical ==========
    /// <: push A < B
    Lt,
    /// &&: push A != 0 && B != 0
    And,
    /// ||: push A != 0 || B != 0
    Or,
    /// ==: push A == B
    Eq,
    /// !: push A == 0
    Not,

    // ========== Bitwise ==========
    /// |: push A | B
    BitOr,
    /// &: push A & B
    BitAnd,
    /// ^: push A ^ B
    BitXor,
    /// ~: push bitwise complement of A
    BitNot,

    // ========== Wide Arithmetic ==========
    /// ADDW: push carry of A + B, then its low 64 bits
    Addw,

    // ========== Flow Control ==========
    /// BNZ: pop A, branch to target if A != 0
    Bnz { target: String },
    /// BZ: pop A, branch to target if A == 0
    Bz { target: String },
    /// B: branch to target
    B { target: String },
    /// RETURN: pop A and finish with it as the result
    Return,
    /// ASSERT: pop A, fail unless A != 0
    Assert,

    // ========== Stack ==========
    /// POP: discard A
    Pop,
    /// DUP: push a copy of A
    Dup,
    /// SWAP: exchange the two topmost words
    Swap,
    /// COVER n: move the top word below the next n words
    Cover { depth: u8 },
    /// UNCOVER n: move the word at depth n to the top
    Uncover { depth: u8 },

    // ========== Bit Access ==========
    /// GETBIT: push bit B of A as 0/1
    GetBit,

    // ========== Constants ==========
    /// PUSHINT n: push the literal word n
    PushInt { value: u64 },

    // ========== Shift ==========
    /// SHL: push A << B
    Shl,
    /// SHR: push A >> B (logical)
    Shr,

    // ========== Pseudo ==========
    /// Branch target marker
    Label { name: String },
}

impl Instruction {
    /// Build a non-branch instruction from an opcode and its immediate arguments.
    pub fn from_parts(opcode: Opcode, immediates: &[u64]) -> Result<Self, SpecError> {
        if opcode.is_branch() {
            return Err(SpecError::BranchRequiresLabel(opcode));
        }

        let expected = match opcode {
            Opcode::PushInt | Opcode::Cover | Opcode::Uncover => 1,
            _ => 0,
        };
        if immediates.len() != expected {
            return Err(SpecError::InvalidImmediates {
                opcode,
                expected,
                found: immediates.len(),
            });
        }

        let depth = || {
            u8::try_from(immediates[0]).map_err(|_| SpecError::ImmediateOutOfRange {
                opcode,
                value: immediates[0],
            })
        };

        Ok(match opcode {
            Opcode::Err => Instruction::Err,
            Opcode::Lt => Instruction::Lt,
            Opcode::And => Instruction::And,
            Opcode::Or => Instruction::Or,
            Opcode::Eq => Instruction::Eq,
            Opcode::Not => Instruction::Not,
            Opcode::BitOr => Instruction::BitOr,
            Opcode::BitAnd => Instruction::BitAnd,
            Opcode::BitXor => Instruction::BitXor,
            Opcode::BitNot => Instruction::BitNot,
            Opcode::Addw => Instruction::Addw,
            Opcode::Return => Instruction::Return,
            Opcode::Assert => Instruction::Assert,
            Opcode::Pop => Instruction::Pop,
            Opcode::Dup => Instruction::Dup,
            Opcode::Swap => Instruction::Swap,
            Opcode::Cover => Instruction::Cover { depth: depth()? },
            Opcode::Uncover => Instruction::Uncover { depth: depth()? },
            Opcode::GetBit => Instruction::GetBit,
            Opcode::PushInt => Instruction::PushInt { value: immediates[0] },
            Opcode::Shl => Instruction::Shl,
            Opcode::Shr => Instruction::Shr,
            Opcode::Bnz | Opcode::Bz | Opcode::B => unreachable!("branches rejected above"),
        })
    }

    /// Build a branch instruction targeting `target`
    pub fn branch(opcode: Opcode, target: impl Into<String>) -> Option<Self> {
        let target = target.into();
        match opcode {
            Opcode::Bnz => Some(Instruction::Bnz { target }),
            Opcode::Bz => Some(Instruction::Bz { target }),
            Opcode::B => Some(Instruction::B { target }),
            _ => None,
        }
    }

    /// Opcode of this instruction (`None` for labels)
    pub fn opcode(&self) -> Option<Opcode> {
        Some(match self {
            Instruction::Err => Opcode::Err,
            Instruction::Lt => Opcode::Lt,
            Instruction::And => Opcode::And,
            Instruction::Or => Opcode::Or,
            Instruction::Eq => Opcode::Eq,
            Instruction::Not => Opcode::Not,
            Instruction::BitOr => Opcode::BitOr,
            Instruction::BitAnd => Opcode::BitAnd,
            Instruction::BitXor => Opcode::BitXor,
            Instruction::BitNot => Opcode::BitNot,
            Instruction::Addw => Opcode::Addw,
            Instruction::Bnz { .. } => Opcode::Bnz,
            Instruction::Bz { .. } => Opcode::Bz,
            Instruction::B { .. } => Opcode::B,
            Instruction::Return => Opcode::Return,
            Instruction::Assert => Opcode::Assert,
            Instruction::Pop => Opcode::Pop,
            Instruction::Dup => Opcode::Dup,
            Instruction::Swap => Opcode::Swap,
            Instruction::Cover { .. } => Opcode::Cover,
            Instruction::Uncover { .. } => Opcode::Uncover,
            Instruction::GetBit => Opcode::GetBit,
            Instruction::PushInt { .. } => Opcode::PushInt,
            Instruction::Shl => Opcode::Shl,
            Instruction::Shr => Opcode::Shr,
            Instruction::Label { .. } => return None,
        })
    }

    /// Immediate arguments, in the order `from_parts` accepts them
    pub fn immediates(&self) -> Vec<u64> {
        match self {
            Instruction::PushInt { value } => vec![*value],
            Instruction::Cover { depth } | Instruction::Uncover { depth } => vec![*depth as u64],
            _ => Vec::new(),
        }
    }

    /// Get instruction mnemonic
    pub fn mnemonic(&self) -> &'static str {
        match self.opcode() {
            Some(opcode) => opcode.mnemonic(),
            None => "label",
        }
    }

    /// Words consumed and produced: `(pops, pushes)`
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Instruction::PushInt { .. } => (0, 1),
            Instruction::Err | Instruction::B { .. } | Instruction::Label { .. } => (0, 0),
            Instruction::Lt
            | Instruction::And
            | Instruction::Or
            | Instruction::Eq
            | Instruction::BitOr
            | Instruction::BitAnd
            | Instruction::BitXor
            | Instruction::GetBit
            | Instruction::Shl
            | Instruction::Shr => (2, 1),
            Instruction::Not | Instruction::BitNot => (1, 1),
            Instruction::Addw | Instruction::Swap => (2, 2),
            Instruction::Bnz { .. }
            | Instruction::Bz { .. }
            | Instruction::Return
            | Instruction::Assert
            | Instruction::Pop => (1, 0),
            Instruction::Dup => (1, 2),
            Instruction::Cover { depth } | Instruction::Uncover { depth } => {
                let n = *depth as usize + 1;
                (n, n)
            }
        }
    }

    /// Branch target, if this is a branch
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Instruction::Bnz { target } | Instruction::Bz { target } | Instruction::B { target } => {
                Some(target)
            }
            _ => None,
        }
    }

    /// Check if this is a branch instruction
    pub fn is_branch(&self) -> bool {
        self.branch_target().is_some()
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::PushInt { value } => write!(f, "{} {}", self.mnemonic(), value),
            Instruction::Cover { depth } | Instruction::Uncover { depth } => {
                write!(f, "{} {}", self.mnemonic(), depth)
            }
            Instruction::Bnz { target } | Instruction::Bz { target } | Instruction::B { target } => {
                write!(f, "{} {}", self.mnemonic(), target)
            }
            Instruction::Label { name } => write!(f, "{}:", name),
            _ => write!(f, "{}", self.mnemonic()),
        }
    }
}
