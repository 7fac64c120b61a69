//! Sign-preserving right shift.
//!
//! `shr` on the machine is logical. For a negative operand the vacated high
//! bits are filled by OR-ing the mask `~(2^64-1 >> k)`, which is zero for
//! `k = 0`.

use crate::arith::{int, op, sign_bit};
use crate::error::{CodegenError, Result};
use crate::node::Node;
use sint_spec::value::ALL_ONES;
use sint_spec::Instruction;
use tracing::trace;

/// Largest shift amount the machine accepts
pub const MAX_SHIFT: u64 = 63;

/// Arithmetic right shift `floor(value / 2^amount)`.
///
/// A constant `amount` above 63 is rejected here; any other amount is
/// checked at run time and traps when it is 64 or more.
///
/// ```text
/// <value>; dup; pushint 63; getbit; swap      s a
/// <amount> [; dup; pushint 64; <; assert]     s a k
/// dup; cover 2; shr; cover 2; swap            (a>>k) k s
/// bz else
///   pushint 2^64-1; swap; shr; ~              (a>>k) mask
/// else:
///   pop; pushint 0                            (a>>k) 0
/// |
/// ```
pub fn build_shift_right(value: Node, amount: Node) -> Result<Node> {
    let constant = amount.as_constant();
    if let Some(k) = constant {
        if k > MAX_SHIFT {
            return Err(CodegenError::ShiftOutOfRange { amount: k });
        }
    }
    trace!(amount = ?constant, "building signed shift right");

    let sign_below = op(
        Instruction::Swap,
        vec![sign_bit(op(Instruction::Dup, vec![value]))],
    );
    let amount_copies = match constant {
        Some(_) => op(Instruction::Dup, vec![sign_below, amount]),
        None => {
            let in_range = op(
                Instruction::Lt,
                vec![
                    op(Instruction::Dup, vec![sign_below, amount]),
                    int(MAX_SHIFT + 1),
                ],
            );
            op(
                Instruction::Dup,
                vec![op(Instruction::Assert, vec![in_range])],
            )
        }
    };
    let shifted = op(
        Instruction::Cover { depth: 2 },
        vec![op(
            Instruction::Shr,
            vec![op(Instruction::Cover { depth: 2 }, vec![amount_copies])],
        )],
    );
    let sign_on_top = op(Instruction::Swap, vec![shifted]);

    let mask = op(
        Instruction::BitNot,
        vec![op(
            Instruction::Shr,
            vec![op(Instruction::Swap, vec![int(ALL_ONES)])],
        )],
    );
    let no_mask = op(
        Instruction::PushInt { value: 0 },
        vec![op(Instruction::Pop, vec![])],
    );
    let fill = Node::cond(sign_on_top, mask, no_mask)?;

    Ok(op(Instruction::BitOr, vec![fill]))
}

/// Arithmetic right shift by a literal amount
pub fn build_shift_right_by(value: Node, amount: u32) -> Result<Node> {
    build_shift_right(value, int(amount as u64))
}
