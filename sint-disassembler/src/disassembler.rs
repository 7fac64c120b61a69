//! Main disassembler logic

use crate::decoder::decode;
use crate::error::Result;
use crate::formatter::format_program;
use tracing::debug;

/// Disassemble bytecode into an assembly listing
pub fn disassemble(bytes: &[u8]) -> Result<String> {
    let program = decode(bytes)?;
    let listing = format_program(&program);
    debug!(
        instructions = program.instruction_count(),
        lines = program.code.len() + 1,
        "disassembled program"
    );
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sint_assembler::{assemble, assemble_bytes};

    #[test]
    fn test_disassemble_simple() {
        let bytes = assemble_bytes("#pragma version 5\nint 1\nint 2\naddw\n").unwrap();
        assert_eq!(
            disassemble(&bytes).unwrap(),
            "#pragma version 5\n    pushint 1\n    pushint 2\n    addw\n"
        );
    }

    #[test]
    fn test_disassemble_reassembles() {
        let source = "\
#pragma version 5
pushint -8
dup
bz else_0
pushint 1
b end_0
else_0:
pushint 2
end_0:
";
        let bytes = assemble_bytes(source).unwrap();
        let listing = disassemble(&bytes).unwrap();
        assert!(listing.contains("// -8"));

        // Label names differ, the bytes do not
        let program = assemble(&listing).unwrap();
        assert_eq!(sint_assembler::encode(&program).unwrap(), bytes);
    }

    #[test]
    fn test_disassemble_error() {
        assert!(disassemble(&[]).is_err());
    }
}
