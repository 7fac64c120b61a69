//! Bytecode decoding
//!
//! Branch destinations are byte offsets; decoding turns every destination
//! into a `label_<offset>` pseudo-instruction.

use crate::error::{DisassemblerError, Result};
use sint_spec::{Instruction, Opcode, Program, MAX_VERSION};
use std::collections::BTreeSet;
use tracing::debug;

/// Read an unsigned LEB128 varint at `offset`, returning the value and its length
pub fn read_uvarint(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().skip(offset).enumerate().take(10) {
        let bits = (byte & 0x7F) as u64;
        if i == 9 && byte > 1 {
            return Err(DisassemblerError::InvalidVarint { offset });
        }
        value |= bits << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if bytes.len().saturating_sub(offset) < 10 {
        Err(DisassemblerError::Truncated { offset })
    } else {
        Err(DisassemblerError::InvalidVarint { offset })
    }
}

enum Decoded {
    Plain(Instruction),
    Branch(Opcode, usize),
}

fn byte_at(bytes: &[u8], index: usize, offset: usize) -> Result<u8> {
    bytes
        .get(index)
        .copied()
        .ok_or(DisassemblerError::Truncated { offset })
}

fn decode_one(bytes: &[u8], offset: usize) -> Result<(Decoded, usize)> {
    let byte = bytes[offset];
    let opcode = Opcode::from_u8(byte).ok_or(DisassemblerError::UnknownOpcode { offset, byte })?;

    let decoded = match opcode {
        Opcode::PushInt => {
            let (value, len) = read_uvarint(bytes, offset + 1)?;
            return Ok((Decoded::Plain(Instruction::PushInt { value }), 1 + len));
        }
        Opcode::Cover => Decoded::Plain(Instruction::Cover {
            depth: byte_at(bytes, offset + 1, offset)?,
        }),
        Opcode::Uncover => Decoded::Plain(Instruction::Uncover {
            depth: byte_at(bytes, offset + 1, offset)?,
        }),
        Opcode::Bnz | Opcode::Bz | Opcode::B => {
            let high = byte_at(bytes, offset + 1, offset)?;
            let low = byte_at(bytes, offset + 2, offset)?;
            let relative = i16::from_be_bytes([high, low]) as i64;
            let target = (offset + 3) as i64 + relative;
            let target = usize::try_from(target)
                .map_err(|_| DisassemblerError::InvalidBranchTarget { offset, target })?;
            Decoded::Branch(opcode, target)
        }
        _ => {
            // Opcodes without immediates
            let inst = Instruction::from_parts(opcode, &[])
                .map_err(|_| DisassemblerError::UnknownOpcode { offset, byte })?;
            Decoded::Plain(inst)
        }
    };

    Ok((decoded, 1 + opcode.immediate_size().unwrap_or(0)))
}

fn label_name(offset: usize) -> String {
    format!("label_{}", offset)
}

/// Decode bytecode into a program
pub fn decode(bytes: &[u8]) -> Result<Program> {
    let (version, mut offset) = read_uvarint(bytes, 0)?;
    if version < 1 || version > MAX_VERSION as u64 {
        return Err(DisassemblerError::UnsupportedVersion(version));
    }

    let mut decoded = Vec::new();
    while offset < bytes.len() {
        let (inst, size) = decode_one(bytes, offset)?;
        decoded.push((offset, inst));
        offset += size;
    }
    let end = offset;

    let boundaries: BTreeSet<usize> = decoded.iter().map(|(at, _)| *at).chain([end]).collect();
    let mut targets = BTreeSet::new();
    for (at, inst) in &decoded {
        if let Decoded::Branch(_, target) = inst {
            if !boundaries.contains(target) {
                return Err(DisassemblerError::InvalidBranchTarget {
                    offset: *at,
                    target: *target as i64,
                });
            }
            targets.insert(*target);
        }
    }

    let mut code = Vec::with_capacity(decoded.len() + targets.len());
    for (at, inst) in decoded {
        if targets.contains(&at) {
            code.push(Instruction::Label {
                name: label_name(at),
            });
        }
        code.push(match inst {
            Decoded::Plain(inst) => inst,
            Decoded::Branch(opcode, target) => Instruction::branch(opcode, label_name(target))
                .ok_or(DisassemblerError::UnknownOpcode {
                    offset: at,
                    byte: opcode.to_u8(),
                })?,
        });
    }
    if targets.contains(&end) {
        code.push(Instruction::Label {
            name: label_name(end),
        });
    }

    debug!(
        version,
        bytes = bytes.len(),
        labels = targets.len(),
        "decoded program"
    );
    Ok(Program::with_code(version as u8, code))
}
