//! Listing formatter

use sint_spec::{decode, Instruction, Program};

/// Format instruction as assembly text.
///
/// Constants with the sign bit set carry their signed value as a comment.
pub fn format(inst: &Instruction) -> String {
    match inst {
        Instruction::Label { name } => format!("{}:", name),
        Instruction::PushInt { value } if value >> 63 == 1 => {
            format!("    pushint {} // {}", value, decode(*value))
        }
        _ => format!("    {}", inst),
    }
}

/// Format a whole program, starting with its version pragma
pub fn format_program(program: &Program) -> String {
    let mut out = format!("#pragma version {}\n", program.version);
    for inst in &program.code {
        out.push_str(&format(inst));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_instructions() {
        assert_eq!(format(&Instruction::Addw), "    addw");
        assert_eq!(format(&Instruction::Uncover { depth: 2 }), "    uncover 2");
        assert_eq!(format(&Instruction::PushInt { value: 63 }), "    pushint 63");
        assert_eq!(
            format(&Instruction::Bz {
                target: "label_9".to_string()
            }),
            "    bz label_9"
        );
        assert_eq!(
            format(&Instruction::Label {
                name: "label_9".to_string()
            }),
            "label_9:"
        );
    }

    #[test]
    fn test_format_signed_constants() {
        assert_eq!(
            format(&Instruction::PushInt { value: u64::MAX }),
            "    pushint 18446744073709551615 // -1"
        );
        assert_eq!(
            format(&Instruction::PushInt { value: 1 << 63 }),
            "    pushint 9223372036854775808 // -9223372036854775808"
        );
    }

    #[test]
    fn test_format_program() {
        let program = Program::with_code(
            5,
            vec![Instruction::PushInt { value: 7 }, Instruction::Dup],
        );
        assert_eq!(
            format_program(&program),
            "#pragma version 5\n    pushint 7\n    dup\n"
        );
    }
}
