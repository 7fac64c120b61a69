//! # Signed Word Encoding
//!
//! The machine only knows unsigned 64-bit words. A signed integer `n` in
//! `[-2^63, 2^63 - 1]` is represented by its two's-complement pattern
//! `n mod 2^64`; bit 63 carries the sign.
//!
//! ```
//! use sint_spec::value::{encode, decode};
//!
//! assert_eq!(encode(-1).unwrap(), u64::MAX);
//! assert_eq!(decode(u64::MAX), -1);
//! assert!(encode(1 << 63).is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Machine word
pub type Word = u64;

/// Smallest representable signed value, -2^63
pub const MIN: i128 = i64::MIN as i128;

/// Largest representable signed value, 2^63 - 1
pub const MAX: i128 = i64::MAX as i128;

/// All-ones word, 2^64 - 1
pub const ALL_ONES: Word = u64::MAX;

/// Bit index of the sign bit
pub const SIGN_BIT: u64 = 63;

/// Literal validation errors, raised while a tree is being built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{value} is outside the signed 64-bit range [-2^63, 2^63 - 1]")]
    OutOfRange { value: String },

    #[error("expected an integer literal, found {0:?}")]
    NotAnInteger(String),
}

/// Encode a signed integer as its two's-complement word.
pub fn encode(n: i128) -> Result<Word, ValueError> {
    if !(MIN..=MAX).contains(&n) {
        return Err(ValueError::OutOfRange {
            value: n.to_string(),
        });
    }

    if n < 0 {
        // |MIN| = 2^63 still fits in a u64
        let magnitude = n.unsigned_abs() as u64;
        Ok((magnitude ^ ALL_ONES).wrapping_add(1))
    } else {
        Ok(n as u64)
    }
}

/// Decode a word, reading bit 63 as the sign.
pub fn decode(w: Word) -> i64 {
    if w >> SIGN_BIT == 1 {
        let magnitude = (w ^ ALL_ONES).wrapping_add(1) as i128;
        (-magnitude) as i64
    } else {
        w as i64
    }
}

/// Parse a decimal or `0x` hexadecimal integer literal and encode it.
///
/// Anything that is not an integer (fractions, exponents, words, empty
/// input) is a `NotAnInteger` error; integers outside the signed range,
/// however many digits they have, are `OutOfRange`.
pub fn parse_literal(text: &str) -> Result<Word, ValueError> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, body),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ValueError::NotAnInteger(trimmed.to_string()));
    }

    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| ValueError::OutOfRange {
        value: trimmed.to_string(),
    })?;

    encode(if negative { -magnitude } else { magnitude })
}

/// A signed 64-bit integer paired with its word encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SignedWord(i64);

impl SignedWord {
    /// Smallest representable value
    pub const MIN: SignedWord = SignedWord(i64::MIN);

    /// Largest representable value
    pub const MAX: SignedWord = SignedWord(i64::MAX);

    /// Create from any integer, checking the signed range
    pub fn new(n: i128) -> Result<Self, ValueError> {
        encode(n).map(Self::from_word)
    }

    /// Interpret a machine word
    #[inline]
    pub fn from_word(w: Word) -> Self {
        SignedWord(decode(w))
    }

    /// Two's-complement word for this value
    #[inline]
    pub fn to_word(self) -> Word {
        self.0 as u64
    }

    /// Mathematical value
    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }

    /// Check if the sign bit is set
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl From<i64> for SignedWord {
    fn from(value: i64) -> Self {
        SignedWord(value)
    }
}

impl TryFrom<i128> for SignedWord {
    type Error = ValueError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        SignedWord::new(value)
    }
}

impl FromStr for SignedWord {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_literal(s).map(SignedWord::from_word)
    }
}

impl fmt::Display for SignedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
