//! Assembly parser
//!
//! One statement per line: an optional `name:` label definition followed by
//! an optional instruction. `#pragma version N` may appear once, before any
//! instruction.

use crate::error::{AssemblerError, Result};
use crate::lexer::Token;
use logos::Logos;
use sint_spec::{parse_literal, Instruction, Opcode};

/// A parsed source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `#pragma version N`
    Version(u8),
    /// Label definition, possibly followed by an instruction on the same line
    Label(String, Option<Instruction>),
    /// Plain instruction
    Instruction(Instruction),
}

/// Lex one line, attaching 1-based line and column numbers to errors
fn lex_line(text: &str, line: usize) -> Result<Vec<Token>> {
    let mut lexer = Token::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(AssemblerError::SyntaxError {
                    line,
                    column: lexer.span().start + 1,
                    message: format!("unexpected {:?}", lexer.slice()),
                })
            }
        }
    }
    Ok(tokens)
}

/// Parse one source line; `None` for blank and comment-only lines
pub fn parse_line(text: &str, line: usize) -> Result<Option<Statement>> {
    let tokens = lex_line(text, line)?;
    match tokens.as_slice() {
        [] => Ok(None),
        [Token::Pragma, rest @ ..] => parse_pragma(rest, line).map(Some),
        [Token::LabelDef(name), rest @ ..] => {
            let inst = match rest {
                [] => None,
                rest => Some(parse_tokens(rest, line)?),
            };
            Ok(Some(Statement::Label(name.clone(), inst)))
        }
        tokens => parse_tokens(tokens, line).map(|inst| Some(Statement::Instruction(inst))),
    }
}

fn parse_pragma(tokens: &[Token], line: usize) -> Result<Statement> {
    let invalid = |message: String| AssemblerError::InvalidDirective { line, message };
    match tokens {
        [Token::Identifier(key), Token::Number(value)] if key == "version" => value
            .parse::<u8>()
            .map(Statement::Version)
            .map_err(|_| invalid(format!("invalid version {}", value))),
        [Token::Identifier(key), ..] => Err(invalid(format!("unknown pragma {}", key))),
        _ => Err(invalid("expected `#pragma version N`".to_string())),
    }
}

/// Parse a single instruction from assembly text
pub fn parse_instruction(text: &str) -> Result<Instruction> {
    let tokens = lex_line(text, 1)?;
    if tokens.is_empty() {
        return Err(AssemblerError::SyntaxError {
            line: 1,
            column: 1,
            message: "Empty instruction".to_string(),
        });
    }
    parse_tokens(&tokens, 1)
}

fn parse_tokens(tokens: &[Token], line: usize) -> Result<Instruction> {
    let (mnemonic, operands) = match tokens {
        [Token::Identifier(m) | Token::Symbol(m), operands @ ..] => (m.as_str(), operands),
        [other, ..] => {
            return Err(AssemblerError::SyntaxError {
                line,
                column: 1,
                message: format!("expected a mnemonic, found {:?}", other),
            })
        }
        [] => unreachable!("callers skip empty lines"),
    };

    // `int` is accepted as an alias of `pushint`
    let opcode = match mnemonic {
        "int" => Opcode::PushInt,
        other => Opcode::from_mnemonic(other).ok_or_else(|| AssemblerError::UnknownInstruction {
            line,
            mnemonic: other.to_string(),
        })?,
    };

    if opcode.is_branch() {
        return match operands {
            [Token::Identifier(target)] => Instruction::branch(opcode, target.as_str())
                .ok_or_else(|| AssemblerError::UnknownInstruction {
                    line,
                    mnemonic: mnemonic.to_string(),
                }),
            _ => Err(AssemblerError::SyntaxError {
                line,
                column: 1,
                message: format!("{} expects one label operand", mnemonic),
            }),
        };
    }

    let immediates = operands
        .iter()
        .map(|token| parse_immediate(token, opcode, line))
        .collect::<Result<Vec<u64>>>()?;

    Instruction::from_parts(opcode, &immediates).map_err(|err| {
        AssemblerError::InvalidImmediate {
            line,
            message: err.to_string(),
        }
    })
}

/// Immediates are unsigned words; `pushint` also takes signed literals,
/// which are stored as their two's-complement word.
fn parse_immediate(token: &Token, opcode: Opcode, line: usize) -> Result<u64> {
    let invalid = |message: String| AssemblerError::InvalidImmediate { line, message };
    let text = token
        .literal()
        .ok_or_else(|| invalid(format!("expected a number, found {:?}", token)))?;

    let body = text.strip_prefix('+').unwrap_or(text);
    let unsigned = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => body.parse::<u64>(),
    };
    match unsigned {
        Ok(value) => Ok(value),
        Err(_) if opcode == Opcode::PushInt && text.starts_with('-') => {
            parse_literal(text).map_err(|err| invalid(err.to_string()))
        }
        Err(_) => Err(invalid(format!("{} is not a valid word", text))),
    }
}
