//! # Lowering
//!
//! Flattens an expression tree into a [`Program`]: operands depth-first and
//! left to right, then each node's own instruction. Conditionals become
//!
//! ```text
//! <condition>
//! bz else_N
//! <then arm>
//! b end_N
//! else_N:
//! <else arm>
//! end_N:
//! ```
//!
//! with labels numbered in emission order, so the same tree and
//! configuration always produce the same program.

use crate::error::{CodegenError, Result};
use crate::node::{Node, NodeKind};
use sint_spec::{Config, Instruction, Program};
use tracing::{debug, trace};

/// Instruction emitter for one program
#[derive(Debug)]
pub struct Lowerer {
    config: Config,
    code: Vec<Instruction>,
    next_label: u32,
}

/// Pending lowering step; popped in emission order
enum Work<'a> {
    Visit(&'a Node),
    Emit(&'a Instruction),
    Control(Instruction),
}

impl Lowerer {
    /// Create a lowerer targeting `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            code: Vec::new(),
            next_label: 0,
        })
    }

    /// Append the code for `node`
    pub fn lower(&mut self, node: &Node) -> Result<()> {
        let mut work = vec![Work::Visit(node)];
        while let Some(step) = work.pop() {
            match step {
                Work::Visit(node) => self.schedule(node, &mut work),
                Work::Emit(instruction) => self.emit(instruction.clone())?,
                Work::Control(instruction) => self.emit(instruction)?,
            }
        }
        Ok(())
    }

    /// Push the steps for `node` in reverse emission order
    fn schedule<'a>(&mut self, node: &'a Node, work: &mut Vec<Work<'a>>) {
        match node.kind() {
            NodeKind::Op(instruction) => {
                work.push(Work::Emit(instruction));
                work.extend(node.operands().iter().rev().map(Work::Visit));
            }
            NodeKind::Cond => {
                let [condition, then_arm, else_arm] = node.operands() else {
                    unreachable!("conditional nodes have three parts");
                };
                let id = self.next_label;
                self.next_label += 1;
                let else_label = format!("else_{}", id);
                let end_label = format!("end_{}", id);

                work.push(Work::Control(Instruction::Label {
                    name: end_label.clone(),
                }));
                work.push(Work::Visit(else_arm));
                work.push(Work::Control(Instruction::Label {
                    name: else_label.clone(),
                }));
                work.push(Work::Control(Instruction::B { target: end_label }));
                work.push(Work::Visit(then_arm));
                work.push(Work::Control(Instruction::Bz { target: else_label }));
                work.push(Work::Visit(condition));
            }
        }
    }

    fn emit(&mut self, instruction: Instruction) -> Result<()> {
        if let Some(opcode) = instruction.opcode() {
            let required = opcode.min_version();
            if required > self.config.version {
                return Err(CodegenError::OpcodeNotAvailable {
                    opcode,
                    required,
                    version: self.config.version,
                });
            }
        }
        trace!(instruction = %instruction, "emit");
        self.code.push(instruction);
        Ok(())
    }

    /// Consume the lowerer and produce the program
    pub fn finish(self) -> Program {
        Program::with_code(self.config.version, self.code)
    }
}

/// Compile an expression producing exactly one word into a program.
pub fn compile(node: &Node, config: &Config) -> Result<Program> {
    config.validate()?;

    let effect = node.stack_effect();
    if effect.required > 0 {
        return Err(CodegenError::UnbalancedStack {
            required: effect.required,
        });
    }
    if effect.net != 1 {
        return Err(CodegenError::ResultCount { found: effect.net });
    }
    let depth = effect.peak.max(0) as u32;
    if depth > config.max_stack_depth {
        return Err(CodegenError::StackDepthExceeded {
            depth,
            limit: config.max_stack_depth,
        });
    }

    debug!(
        version = config.version,
        nodes = node.size(),
        peak = depth,
        "lowering expression"
    );

    let mut lowerer = Lowerer::new(*config)?;
    lowerer.lower(node)?;
    let program = lowerer.finish();

    debug!(
        instructions = program.instruction_count(),
        labels = program.code.len() - program.instruction_count(),
        "lowered expression"
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::{build_add, int, sint};
    use crate::node::ValueType;
    use crate::shift::build_shift_right_by;
    use sint_spec::Opcode;

    #[test]
    fn test_compile_constant() {
        let program = compile(&int(42), &Config::DEFAULT).unwrap();
        assert_eq!(program.version, 5);
        assert_eq!(program.code, vec![Instruction::PushInt { value: 42 }]);
    }

    #[test]
    fn test_cond_lowering() {
        let node = Node::cond(int(1), int(2), int(3)).unwrap();
        let program = compile(&node, &Config::DEFAULT).unwrap();
        assert_eq!(
            program.to_string(),
            "#pragma version 5\npushint 1\nbz else_0\npushint 2\nb end_0\nelse_0:\npushint 3\nend_0:\n"
        );
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_labels_unique() {
        let a = build_shift_right_by(int(8), 1).unwrap();
        let b = build_shift_right_by(int(16), 2).unwrap();
        let program = compile(&build_add(a, b), &Config::DEFAULT).unwrap();
        let labels = program.labels().unwrap();
        assert_eq!(labels.len(), 4);
        assert!(labels.contains_key("else_1"));
        assert!(labels.contains_key("end_1"));
    }

    #[test]
    fn test_deterministic() {
        let node = build_shift_right_by(int(8), 1).unwrap();
        let first = compile(&node, &Config::DEFAULT).unwrap();
        let second = compile(&node, &Config::DEFAULT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_version_gate() {
        let config = Config::with_version(4).unwrap();
        let err = compile(&build_add(int(1), int(2)), &config).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::OpcodeNotAvailable {
                opcode: Opcode::Uncover,
                required: 5,
                version: 4
            }
        ));
    }

    #[test]
    fn test_unbalanced_stack() {
        let node = Node::op(Opcode::Not, &[], vec![], ValueType::Uint64).unwrap();
        assert!(matches!(
            compile(&node, &Config::DEFAULT),
            Err(CodegenError::UnbalancedStack { required: 1 })
        ));
    }

    #[test]
    fn test_result_count() {
        let two = Node::instr(Instruction::Dup, vec![int(1)], ValueType::Uint64).unwrap();
        assert!(matches!(
            compile(&two, &Config::DEFAULT),
            Err(CodegenError::ResultCount { found: 2 })
        ));

        let none = Node::instr(Instruction::Pop, vec![int(1)], ValueType::None).unwrap();
        assert!(matches!(
            compile(&none, &Config::DEFAULT),
            Err(CodegenError::ResultCount { found: 0 })
        ));
    }

    #[test]
    fn test_stack_depth_limit() {
        // Signed add peaks at seven words while computing the result sign
        let config = Config::new(5, 7).unwrap();
        assert!(compile(&build_add(int(1), int(2)), &config).is_ok());

        let config = Config::new(5, 6).unwrap();
        assert!(matches!(
            compile(&build_add(int(1), int(2)), &config),
            Err(CodegenError::StackDepthExceeded { depth: 7, limit: 6 })
        ));
    }

    #[test]
    fn test_long_sum_chain() {
        let mut sum = int(0);
        for _ in 0..10_000 {
            sum = build_add(sum, int(1));
        }
        assert_eq!(sum.stack_effect().peak, 7);

        let program = compile(&sum, &Config::DEFAULT).unwrap();
        // pushint 0, then 23 instructions per add
        assert_eq!(program.instruction_count(), 1 + 10_000 * 23);
        assert_eq!(program.code.first(), Some(&Instruction::PushInt { value: 0 }));
        assert_eq!(program.code.last(), Some(&Instruction::Assert));

        drop(program);
        drop(sum);
    }

    #[test]
    fn test_deeply_nested_conditionals() {
        let mut node = sint(-1).unwrap();
        for _ in 0..5_000 {
            node = build_shift_right_by(node, 1).unwrap();
        }
        let program = compile(&node, &Config::DEFAULT).unwrap();
        let labels = program.labels().unwrap();
        assert_eq!(labels.len(), 10_000);
        assert!(labels.contains_key("else_0"));
        assert!(labels.contains_key("end_4999"));
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            version: 0,
            max_stack_depth: 10,
        };
        assert!(matches!(
            compile(&int(1), &config),
            Err(CodegenError::Config(_))
        ));
    }
}
