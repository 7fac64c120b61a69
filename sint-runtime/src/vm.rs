//! Virtual Machine

use crate::error::{Result, RuntimeError};
use crate::execute::execute;
use crate::state::{HaltReason, VMState};
use sint_spec::{decode, Program, SpecError, Word, MAX_STACK_DEPTH};
use std::collections::HashMap;
use tracing::{debug, trace};

/// VM configuration
#[derive(Debug, Clone)]
pub struct VMConfig {
    /// Maximum number of executed instructions
    pub max_cycles: u64,

    /// Maximum stack depth
    pub max_stack_depth: usize,

    /// Emit a trace event per executed instruction
    pub trace: bool,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            max_cycles: 10_000,
            max_stack_depth: MAX_STACK_DEPTH as usize,
            trace: false,
        }
    }
}

/// Execution result
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Number of instructions executed
    pub cycles: u64,

    /// Final stack, top at the end
    pub stack: Vec<Word>,

    /// Reason for halting
    pub halt_reason: HaltReason,
}

impl ExecutionResult {
    /// Top of the final stack
    pub fn top(&self) -> Option<Word> {
        self.stack.last().copied()
    }

    /// Top of the final stack read as a signed integer
    pub fn signed_top(&self) -> Option<i64> {
        self.top().map(decode)
    }
}

/// Stack machine interpreter
pub struct VM {
    program: Program,
    labels: HashMap<String, usize>,
    state: VMState,
    config: VMConfig,
}

impl VM {
    /// Create a VM for `program`, resolving labels and checking that every
    /// opcode exists in the program's version
    pub fn new(program: Program, config: VMConfig) -> Result<Self> {
        program.validate().map_err(|err| match err {
            SpecError::UndefinedLabel(label) => RuntimeError::UndefinedLabel(label),
            SpecError::OpcodeNotAvailable {
                opcode, version, ..
            } => RuntimeError::OpcodeNotAvailable { opcode, version },
            other => RuntimeError::SpecError(other),
        })?;
        let labels = program.labels()?;

        Ok(Self {
            program,
            labels,
            state: VMState::new(config.max_stack_depth),
            config,
        })
    }

    /// Run the VM until halt
    pub fn run(mut self) -> Result<ExecutionResult> {
        while !self.state.halted {
            let Some(inst) = self.program.code.get(self.state.pc) else {
                self.state.halt(HaltReason::EndOfProgram);
                break;
            };

            if self.state.cycles >= self.config.max_cycles {
                return Err(RuntimeError::CycleLimitExceeded {
                    limit: self.config.max_cycles,
                });
            }

            if self.config.trace {
                trace!(
                    cycle = self.state.cycles,
                    pc = self.state.pc,
                    depth = self.state.depth(),
                    instruction = %inst,
                    "step"
                );
            }

            if inst.opcode().is_some() {
                self.state.cycles += 1;
            }
            if let Err(err) = execute(inst, &mut self.state, &self.labels) {
                debug!(pc = self.state.pc, error = %err, "execution aborted");
                return Err(err);
            }
        }

        let halt_reason = self.state.halt_reason.unwrap_or(HaltReason::EndOfProgram);
        debug!(
            cycles = self.state.cycles,
            depth = self.state.depth(),
            reason = ?halt_reason,
            "halted"
        );

        Ok(ExecutionResult {
            cycles: self.state.cycles,
            stack: self.state.stack,
            halt_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sint_spec::{Instruction, Opcode};

    fn program(code: Vec<Instruction>) -> Program {
        Program::with_code(5, code)
    }

    #[test]
    fn test_end_of_program() {
        let vm = VM::new(
            program(vec![
                Instruction::PushInt { value: 2 },
                Instruction::PushInt { value: 3 },
                Instruction::Addw,
                Instruction::Swap,
                Instruction::Pop,
            ]),
            VMConfig::default(),
        )
        .unwrap();
        let result = vm.run().unwrap();
        assert_eq!(result.cycles, 5);
        assert_eq!(result.top(), Some(5));
        assert_eq!(result.halt_reason, HaltReason::EndOfProgram);
    }

    #[test]
    fn test_return() {
        let vm = VM::new(
            program(vec![
                Instruction::PushInt { value: 1 },
                Instruction::PushInt { value: u64::MAX },
                Instruction::Return,
                Instruction::Err,
            ]),
            VMConfig::default(),
        )
        .unwrap();
        let result = vm.run().unwrap();
        assert_eq!(result.halt_reason, HaltReason::Return);
        assert_eq!(result.stack, vec![u64::MAX]);
        assert_eq!(result.signed_top(), Some(-1));
    }

    #[test]
    fn test_labels_are_free() {
        let vm = VM::new(
            program(vec![
                Instruction::PushInt { value: 0 },
                Instruction::Bz {
                    target: "done".to_string(),
                },
                Instruction::Err,
                Instruction::Label {
                    name: "done".to_string(),
                },
                Instruction::PushInt { value: 7 },
            ]),
            VMConfig::default(),
        )
        .unwrap();
        let result = vm.run().unwrap();
        assert_eq!(result.top(), Some(7));
        assert_eq!(result.cycles, 3);
    }

    #[test]
    fn test_cycle_limit() {
        let config = VMConfig {
            max_cycles: 50,
            ..VMConfig::default()
        };
        let vm = VM::new(
            program(vec![
                Instruction::Label {
                    name: "loop".to_string(),
                },
                Instruction::B {
                    target: "loop".to_string(),
                },
            ]),
            config,
        )
        .unwrap();
        assert!(matches!(
            vm.run(),
            Err(RuntimeError::CycleLimitExceeded { limit: 50 })
        ));
    }

    #[test]
    fn test_stack_limit() {
        let config = VMConfig {
            max_stack_depth: 2,
            ..VMConfig::default()
        };
        let vm = VM::new(
            program(vec![Instruction::PushInt { value: 1 }; 3]),
            config,
        )
        .unwrap();
        assert!(matches!(
            vm.run(),
            Err(RuntimeError::StackOverflow { limit: 2 })
        ));
    }

    #[test]
    fn test_rejects_undefined_label() {
        let result = VM::new(
            program(vec![Instruction::B {
                target: "nowhere".to_string(),
            }]),
            VMConfig::default(),
        );
        assert!(matches!(result, Err(RuntimeError::UndefinedLabel(l)) if l == "nowhere"));
    }

    #[test]
    fn test_rejects_unavailable_opcode() {
        let result = VM::new(
            Program::with_code(4, vec![Instruction::Uncover { depth: 1 }]),
            VMConfig::default(),
        );
        assert!(matches!(
            result,
            Err(RuntimeError::OpcodeNotAvailable {
                opcode: Opcode::Uncover,
                version: 4
            })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = VMConfig::default();
        assert_eq!(config.max_cycles, 10_000);
        assert_eq!(config.max_stack_depth, 1000);
        assert!(!config.trace);
    }
}
