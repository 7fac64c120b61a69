//! # Signed Arithmetic Builders
//!
//! Two's-complement addition, subtraction and negation over unsigned words.
//! Every builder evaluates each operand exactly once: values needed twice
//! are `dup`ed on the stack and rearranged with `cover`/`uncover`.
//!
//! Overflow is detected from sign bits. For `r = a + b mod 2^64` with sign
//! bits `sa`, `sb`, `sr`, the sum is representable iff
//! `(sa ^ sb) || !(sa ^ sr)`; a failed check aborts through `assert`.

use crate::error::Result;
use crate::node::{Node, ValueType};
use sint_spec::value::{ALL_ONES, SIGN_BIT};
use sint_spec::{encode, parse_literal, Instruction, Word};
use tracing::trace;

pub(crate) fn op(instruction: Instruction, operands: Vec<Node>) -> Node {
    Node::operation(instruction, operands, ValueType::Uint64)
}

/// `<value>; pushint 63; getbit`: replaces the top word by its sign bit
pub(crate) fn sign_bit(value: Node) -> Node {
    op(Instruction::GetBit, vec![value, int(SIGN_BIT)])
}

/// Constant push of a raw word
pub fn int(word: Word) -> Node {
    op(Instruction::PushInt { value: word }, vec![])
}

/// Constant push of a signed integer
pub fn sint(n: i128) -> Result<Node> {
    Ok(int(encode(n)?))
}

/// Constant push of a signed integer literal such as `"-12"` or `"0x7f"`
pub fn sint_literal(text: &str) -> Result<Node> {
    Ok(int(parse_literal(text)?))
}

/// Signed addition of `a` and `b`; traps when the sum overflows.
///
/// ```text
/// <a>; dup; pushint 63; getbit          a sa
/// dup; uncover 2                        sa sa a
/// <b>; dup; pushint 63; getbit          sa sa a b sb
/// cover 3; addw                         sa sb sa carry r
/// dup; pushint 63; getbit               sa sb sa carry r sr
/// cover 5; cover 5; pop                 r sr sa sb sa
/// ^; cover 2; ^; !; ||; assert          r
/// ```
pub fn build_add(a: Node, b: Node) -> Node {
    trace!("building signed add");

    let a_sign = sign_bit(op(Instruction::Dup, vec![a]));
    let a_signs = op(
        Instruction::Uncover { depth: 2 },
        vec![op(Instruction::Dup, vec![a_sign])],
    );
    let b_sign = sign_bit(op(Instruction::Dup, vec![a_signs, b]));
    let sum = op(
        Instruction::Addw,
        vec![op(Instruction::Cover { depth: 3 }, vec![b_sign])],
    );
    let r_sign = sign_bit(op(Instruction::Dup, vec![sum]));

    // Sink the result and its sign below the operand signs; drop the carry.
    let sunk = op(
        Instruction::Pop,
        vec![op(
            Instruction::Cover { depth: 5 },
            vec![op(Instruction::Cover { depth: 5 }, vec![r_sign])],
        )],
    );

    let operand_signs_differ = op(
        Instruction::Cover { depth: 2 },
        vec![op(Instruction::BitXor, vec![sunk])],
    );
    let sign_kept = op(
        Instruction::Not,
        vec![op(Instruction::BitXor, vec![operand_signs_differ])],
    );
    op(
        Instruction::Assert,
        vec![op(Instruction::Or, vec![sign_kept])],
    )
}

/// Signed subtraction `a - b`, built as `a + (-b)`.
///
/// Negation is checked, so `b = -2^63` traps even when the difference
/// would be representable.
pub fn build_sub(a: Node, b: Node) -> Node {
    trace!("building signed sub");
    build_add(a, build_negate(b))
}

/// Two's-complement negation without an overflow check: `(x ^ (2^64-1)) + 1`,
/// keeping the low word of `addw`. `-2^63` maps to itself.
pub fn build_negate_wrapping(x: Node) -> Node {
    let flipped = op(Instruction::BitXor, vec![x, int(ALL_ONES)]);
    let sum = op(Instruction::Addw, vec![flipped, int(1)]);
    op(Instruction::Pop, vec![op(Instruction::Swap, vec![sum])])
}

/// Checked negation: traps when operand and result are both negative,
/// which only happens for `-2^63`.
pub fn build_negate(x: Node) -> Node {
    trace!("building signed negate");

    let x_sign = op(
        Instruction::Swap,
        vec![sign_bit(op(Instruction::Dup, vec![x]))],
    );
    let negated = build_negate_wrapping(x_sign);
    let r_sign = sign_bit(op(Instruction::Dup, vec![negated]));
    let both_negative = op(
        Instruction::And,
        vec![op(Instruction::Uncover { depth: 2 }, vec![r_sign])],
    );
    op(
        Instruction::Assert,
        vec![op(Instruction::Not, vec![both_negative])],
    )
}
