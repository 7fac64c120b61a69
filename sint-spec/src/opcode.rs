//! # Opcode Definitions
//!
//! Opcode byte values of the target stack machine. Every opcode is a single
//! byte; some are followed by immediate bytes in the bytecode stream.
//!
//! ## Opcode Encoding
//!
//! Byte ranges:
//! - 0x00:      Abort (ERR)
//! - 0x0C-0x1C: Compare, logical and bitwise (<, ==, &&, ||, !, |, &, ^, ~)
//! - 0x1E:      Wide arithmetic (ADDW)
//! - 0x40-0x44: Flow control (BNZ, BZ, B, RETURN, ASSERT)
//! - 0x48-0x4F: Stack manipulation (POP, DUP, SWAP, COVER, UNCOVER)
//! - 0x53:      Bit access (GETBIT)
//! - 0x81:      Constant push (PUSHINT)
//! - 0x90-0x91: Shift (SHL, SHR)

use serde::{Deserialize, Serialize};

/// Instruction opcode
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ========== Abort (0x00) ==========
    /// ERR: fail immediately
    Err = 0x00,

    // ========== Compare / Logical (0x0C-0x14) ==========
    /// LT: push A < B
    Lt = 0x0C,
    /// AND: push A != 0 && B != 0
    And = 0x10,
    /// OR: push A != 0 || B != 0
    Or = 0x11,
    /// EQ: push A == B
    Eq = 0x12,
    /// NOT: push A == 0
    Not = 0x14,

    // ========== Bitwise (0x19-0x1C) ==========
    /// BITOR: push A | B
    BitOr = 0x19,
    /// BITAND: push A & B
    BitAnd = 0x1A,
    /// BITXOR: push A ^ B
    BitXor = 0x1B,
    /// BITNOT: push !A
    BitNot = 0x1C,

    // ========== Wide Arithmetic (0x1E) ==========
    /// ADDW: push carry, then low 64 bits of A + B
    Addw = 0x1E,

    // ========== Flow Control (0x40-0x44) ==========
    /// BNZ: branch if A != 0
    Bnz = 0x40,
    /// BZ: branch if A == 0
    Bz = 0x41,
    /// B: unconditional branch
    B = 0x42,
    /// RETURN: finish with A as the result
    Return = 0x43,
    /// ASSERT: fail unless A != 0
    Assert = 0x44,

    // ========== Stack (0x48-0x4F) ==========
    /// POP: discard A
    Pop = 0x48,
    /// DUP: push a copy of A
    Dup = 0x49,
    /// SWAP: exchange A and B
    Swap = 0x4C,
    /// COVER n: move the top element below the next n elements
    Cover = 0x4E,
    /// UNCOVER n: move the element at depth n to the top
    Uncover = 0x4F,

    // ========== Bit Access (0x53) ==========
    /// GETBIT: push bit B of A
    GetBit = 0x53,

    // ========== Constants (0x81) ==========
    /// PUSHINT n: push the immediate word
    PushInt = 0x81,

    // ========== Shift (0x90-0x91) ==========
    /// SHL: push A << B
    Shl = 0x90,
    /// SHR: push A >> B (logical)
    Shr = 0x91,
}

impl Opcode {
    /// Every opcode, in byte order
    pub const ALL: [Opcode; 25] = [
        Opcode::Err,
        Opcode::Lt,
        Opcode::And,
        Opcode::Or,
        Opcode::Eq,
        Opcode::Not,
        Opcode::BitOr,
        Opcode::BitAnd,
        Opcode::BitXor,
        Opcode::BitNot,
        Opcode::Addw,
        Opcode::Bnz,
        Opcode::Bz,
        Opcode::B,
        Opcode::Return,
        Opcode::Assert,
        Opcode::Pop,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Cover,
        Opcode::Uncover,
        Opcode::GetBit,
        Opcode::PushInt,
        Opcode::Shl,
        Opcode::Shr,
    ];

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Err),
            0x0C => Some(Opcode::Lt),
            0x10 => Some(Opcode::And),
            0x11 => Some(Opcode::Or),
            0x12 => Some(Opcode::Eq),
            0x14 => Some(Opcode::Not),
            0x19 => Some(Opcode::BitOr),
            0x1A => Some(Opcode::BitAnd),
            0x1B => Some(Opcode::BitXor),
            0x1C => Some(Opcode::BitNot),
            0x1E => Some(Opcode::Addw),
            0x40 => Some(Opcode::Bnz),
            0x41 => Some(Opcode::Bz),
            0x42 => Some(Opcode::B),
            0x43 => Some(Opcode::Return),
            0x44 => Some(Opcode::Assert),
            0x48 => Some(Opcode::Pop),
            0x49 => Some(Opcode::Dup),
            0x4C => Some(Opcode::Swap),
            0x4E => Some(Opcode::Cover),
            0x4F => Some(Opcode::Uncover),
            0x53 => Some(Opcode::GetBit),
            0x81 => Some(Opcode::PushInt),
            0x90 => Some(Opcode::Shl),
            0x91 => Some(Opcode::Shr),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Look up an opcode by its assembly mnemonic
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == name)
    }

    /// Assembly mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Err => "err",
            Opcode::Lt => "<",
            Opcode::And => "&&",
            Opcode::Or => "||",
            Opcode::Eq => "==",
            Opcode::Not => "!",
            Opcode::BitOr => "|",
            Opcode::BitAnd => "&",
            Opcode::BitXor => "^",
            Opcode::BitNot => "~",
            Opcode::Addw => "addw",
            Opcode::Bnz => "bnz",
            Opcode::Bz => "bz",
            Opcode::B => "b",
            Opcode::Return => "return",
            Opcode::Assert => "assert",
            Opcode::Pop => "pop",
            Opcode::Dup => "dup",
            Opcode::Swap => "swap",
            Opcode::Cover => "cover",
            Opcode::Uncover => "uncover",
            Opcode::GetBit => "getbit",
            Opcode::PushInt => "pushint",
            Opcode::Shl => "shl",
            Opcode::Shr => "shr",
        }
    }

    /// First program version in which the opcode is available
    pub const fn min_version(self) -> u8 {
        match self {
            Opcode::Err
            | Opcode::Lt
            | Opcode::And
            | Opcode::Or
            | Opcode::Eq
            | Opcode::Not
            | Opcode::BitOr
            | Opcode::BitAnd
            | Opcode::BitXor
            | Opcode::BitNot
            | Opcode::Bnz
            | Opcode::Pop
            | Opcode::Dup => 1,
            Opcode::Addw | Opcode::Bz | Opcode::B | Opcode::Return => 2,
            Opcode::Assert | Opcode::Swap | Opcode::GetBit | Opcode::PushInt => 3,
            Opcode::Shl | Opcode::Shr => 4,
            Opcode::Cover | Opcode::Uncover => 5,
        }
    }

    /// Number of immediate bytes that follow the opcode, when fixed.
    ///
    /// `PushInt` carries a variable-length uvarint and returns `None`.
    pub const fn immediate_size(self) -> Option<usize> {
        match self {
            Opcode::PushInt => None,
            Opcode::Cover | Opcode::Uncover => Some(1),
            Opcode::Bnz | Opcode::Bz | Opcode::B => Some(2),
            _ => Some(0),
        }
    }

    /// Check if this is a branch opcode
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self, Opcode::Bnz | Opcode::Bz | Opcode::B)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
