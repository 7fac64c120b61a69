//! Bytecode encoding
//!
//! A program is `uvarint(version)` followed by its instructions. Each
//! instruction is one opcode byte plus its immediates:
//!
//! | Instruction | Bytes |
//! |---|---|
//! | `pushint n` | `0x81`, uvarint(n) |
//! | `cover n` / `uncover n` | opcode, u8 |
//! | `bnz` / `bz` / `b` | opcode, i16 big-endian offset |
//! | other | opcode |
//!
//! Branch offsets are relative to the byte after the branch. Labels occupy
//! no bytes.

use crate::error::{AssemblerError, Result};
use sint_spec::{Instruction, Program};
use std::collections::HashMap;
use tracing::debug;

/// Append `value` as an unsigned LEB128 varint
pub fn write_uvarint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Encoded size of an instruction in bytes
pub fn instruction_size(inst: &Instruction) -> usize {
    match (inst, inst.opcode()) {
        (Instruction::PushInt { value }, _) => 1 + uvarint_len(*value),
        (_, Some(opcode)) => 1 + opcode.immediate_size().unwrap_or(0),
        // labels
        (_, None) => 0,
    }
}

/// Encode a program to bytecode
pub fn encode(program: &Program) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_uvarint(&mut out, program.version as u64);

    // Pass 1: byte position of every label
    let mut labels = HashMap::new();
    let mut position = out.len();
    for inst in &program.code {
        if let Instruction::Label { name } = inst {
            if labels.insert(name.as_str(), position).is_some() {
                return Err(AssemblerError::DuplicateLabel(name.clone()));
            }
        }
        position += instruction_size(inst);
    }

    // Pass 2: emit
    for inst in &program.code {
        let Some(opcode) = inst.opcode() else {
            continue;
        };
        out.push(opcode.to_u8());

        match inst {
            Instruction::PushInt { value } => write_uvarint(&mut out, *value),
            Instruction::Cover { depth } | Instruction::Uncover { depth } => out.push(*depth),
            Instruction::Bnz { target } | Instruction::Bz { target } | Instruction::B { target } => {
                let destination = *labels
                    .get(target.as_str())
                    .ok_or_else(|| AssemblerError::UndefinedLabel(target.clone()))?;
                // `out` already holds the opcode byte; two offset bytes follow
                let offset = destination as i64 - (out.len() + 2) as i64;
                let offset = i16::try_from(offset).map_err(|_| {
                    AssemblerError::BranchOutOfRange {
                        label: target.clone(),
                        offset,
                    }
                })?;
                out.extend_from_slice(&offset.to_be_bytes());
            }
            _ => {}
        }
    }

    debug!(
        version = program.version,
        instructions = program.instruction_count(),
        bytes = out.len(),
        "encoded program"
    );
    Ok(out)
}
