//! Main assembler logic

use crate::encoder::encode;
use crate::error::{AssemblerError, Result};
use crate::parser::{parse_line, Statement};
use sint_spec::{Config, Program, SpecError};
use tracing::debug;

/// Assemble source code into a program.
///
/// Without a `#pragma version` line the program targets the default
/// version.
pub fn assemble(source: &str) -> Result<Program> {
    let mut version = None;
    let mut code = Vec::new();

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let Some(statement) = parse_line(text, line)? else {
            continue;
        };

        match statement {
            Statement::Version(v) => {
                if version.is_some() || !code.is_empty() {
                    return Err(AssemblerError::InvalidDirective {
                        line,
                        message: "#pragma version must come first and appear once".to_string(),
                    });
                }
                version = Some(v);
            }
            Statement::Label(name, inst) => {
                code.push(sint_spec::Instruction::Label { name });
                code.extend(inst);
            }
            Statement::Instruction(inst) => code.push(inst),
        }
    }

    let program = Program::with_code(version.unwrap_or(Config::DEFAULT.version), code);
    program.validate().map_err(|err| match err {
        SpecError::UndefinedLabel(label) => AssemblerError::UndefinedLabel(label),
        SpecError::DuplicateLabel(label) => AssemblerError::DuplicateLabel(label),
        other => AssemblerError::Spec(other),
    })?;

    debug!(
        version = program.version,
        instructions = program.instruction_count(),
        "assembled program"
    );
    Ok(program)
}

/// Assemble source code straight to bytecode
pub fn assemble_bytes(source: &str) -> Result<Vec<u8>> {
    encode(&assemble(source)?)
}
