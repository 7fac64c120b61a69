//! Code generation errors

use crate::node::ValueType;
use sint_spec::{ConfigError, Instruction, Opcode, SpecError, ValueError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Invalid literal: {0}")]
    Value(#[from] ValueError),

    #[error("Spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    // Node construction
    #[error("Shift amount {amount} outside [0, 63]")]
    ShiftOutOfRange { amount: u64 },

    #[error("Branch opcode {0} cannot be used in an operation node")]
    BranchOpcode(Opcode),

    #[error("Control flow instruction `{0}` cannot be used in an operation node")]
    ControlFlow(Instruction),

    #[error("Conditional arms declare different types: {then_type} and {else_type}")]
    ArmTypeMismatch {
        then_type: ValueType,
        else_type: ValueType,
    },

    #[error("Conditional arms have different stack effects: {then_net:+} and {else_net:+}")]
    ArmStackMismatch { then_net: i32, else_net: i32 },

    #[error("Condition must produce a value, declared type is {0}")]
    ConditionType(ValueType),

    // Lowering
    #[error("Opcode {opcode} requires version {required}, target is version {version}")]
    OpcodeNotAvailable {
        opcode: Opcode,
        required: u8,
        version: u8,
    },

    #[error("Expression consumes {required} stack value(s) it never pushed")]
    UnbalancedStack { required: u32 },

    #[error("Expression leaves {found} value(s) on the stack, expected 1")]
    ResultCount { found: i32 },

    #[error("Expression reaches stack depth {depth}, limit is {limit}")]
    StackDepthExceeded { depth: u32, limit: u32 },
}

pub type Result<T> = std::result::Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegenError::ShiftOutOfRange { amount: 64 };
        assert_eq!(err.to_string(), "Shift amount 64 outside [0, 63]");

        let err = CodegenError::ArmStackMismatch {
            then_net: 1,
            else_net: 0,
        };
        assert_eq!(
            err.to_string(),
            "Conditional arms have different stack effects: +1 and +0"
        );

        let err = CodegenError::ControlFlow(Instruction::B {
            target: "end_0".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Control flow instruction `b end_0` cannot be used in an operation node"
        );

        let err = CodegenError::ResultCount { found: 2 };
        assert_eq!(
            err.to_string(),
            "Expression leaves 2 value(s) on the stack, expected 1"
        );
    }

    #[test]
    fn test_from_value_error() {
        let err: CodegenError = ValueError::NotAnInteger("x".to_string()).into();
        assert!(matches!(err, CodegenError::Value(_)));
    }
}
