//! Instruction execution

use crate::error::{Result, RuntimeError};
use crate::state::{HaltReason, VMState};
use sint_spec::Instruction;
use std::collections::HashMap;

#[inline]
fn flag(value: bool) -> u64 {
    value as u64
}

fn jump(state: &mut VMState, labels: &HashMap<String, usize>, target: &str) -> Result<()> {
    state.pc = *labels
        .get(target)
        .ok_or_else(|| RuntimeError::UndefinedLabel(target.to_string()))?;
    Ok(())
}

/// Execute a single instruction, advancing `state.pc`
pub fn execute(
    inst: &Instruction,
    state: &mut VMState,
    labels: &HashMap<String, usize>,
) -> Result<()> {
    let pc = state.pc;

    match inst {
        // ========== Abort ==========
        Instruction::Err => return Err(RuntimeError::Err { pc }),

        // ========== Compare / Logical ==========
        Instruction::Lt => {
            let (a, b) = state.pop2()?;
            state.push(flag(a < b))?;
        }
        Instruction::And => {
            let (a, b) = state.pop2()?;
            state.push(flag(a != 0 && b != 0))?;
        }
        Instruction::Or => {
            let (a, b) = state.pop2()?;
            state.push(flag(a != 0 || b != 0))?;
        }
        Instruction::Eq => {
            let (a, b) = state.pop2()?;
            state.push(flag(a == b))?;
        }
        Instruction::Not => {
            let a = state.pop()?;
            state.push(flag(a == 0))?;
        }

        // ========== Bitwise ==========
        Instruction::BitOr => {
            let (a, b) = state.pop2()?;
            state.push(a | b)?;
        }
        Instruction::BitAnd => {
            let (a, b) = state.pop2()?;
            state.push(a & b)?;
        }
        Instruction::BitXor => {
            let (a, b) = state.pop2()?;
            state.push(a ^ b)?;
        }
        Instruction::BitNot => {
            let a = state.pop()?;
            state.push(!a)?;
        }

        // ========== Wide Arithmetic ==========
        Instruction::Addw => {
            let (a, b) = state.pop2()?;
            let (low, carry) = a.overflowing_add(b);
            state.push(flag(carry))?;
            state.push(low)?;
        }

        // ========== Flow Control ==========
        Instruction::Bnz { target } => {
            if state.pop()? != 0 {
                return jump(state, labels, target);
            }
        }
        Instruction::Bz { target } => {
            if state.pop()? == 0 {
                return jump(state, labels, target);
            }
        }
        Instruction::B { target } => return jump(state, labels, target),
        Instruction::Return => {
            let result = state.pop()?;
            state.stack.clear();
            state.stack.push(result);
            state.halt(HaltReason::Return);
            return Ok(());
        }
        Instruction::Assert => {
            if state.pop()? == 0 {
                return Err(RuntimeError::AssertionFailed { pc });
            }
        }

        // ========== Stack ==========
        Instruction::Pop => {
            state.pop()?;
        }
        Instruction::Dup => {
            let a = state.pop()?;
            state.push(a)?;
            state.push(a)?;
        }
        Instruction::Swap => {
            let (a, b) = state.pop2()?;
            state.push(b)?;
            state.push(a)?;
        }
        Instruction::Cover { depth } => {
            let n = *depth as usize;
            state.require(n + 1)?;
            let top = state.pop()?;
            let at = state.depth() - n;
            state.stack.insert(at, top);
        }
        Instruction::Uncover { depth } => {
            let n = *depth as usize;
            state.require(n + 1)?;
            let at = state.depth() - 1 - n;
            let value = state.stack.remove(at);
            state.stack.push(value);
        }

        // ========== Bit Access ==========
        Instruction::GetBit => {
            let (a, index) = state.pop2()?;
            if index >= 64 {
                return Err(RuntimeError::BitIndexOutOfRange { pc, index });
            }
            state.push((a >> index) & 1)?;
        }

        // ========== Constants ==========
        Instruction::PushInt { value } => state.push(*value)?,

        // ========== Shift ==========
        Instruction::Shl => {
            let (a, amount) = state.pop2()?;
            if amount >= 64 {
                return Err(RuntimeError::ShiftOutOfRange { pc, amount });
            }
            state.push(a << amount)?;
        }
        Instruction::Shr => {
            let (a, amount) = state.pop2()?;
            if amount >= 64 {
                return Err(RuntimeError::ShiftOutOfRange { pc, amount });
            }
            state.push(a >> amount)?;
        }

        // ========== Pseudo ==========
        Instruction::Label { .. } => {}
    }

    state.pc += 1;
    Ok(())
}
