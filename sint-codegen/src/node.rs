//! Expression nodes
//!
//! A [`Node`] is an immutable handle to either an operation (one instruction
//! preceded by its operand sub-expressions) or a value-producing conditional.
//! Nodes are reference counted, so cloning a handle is cheap; lowering a
//! shared node emits its code once for every place it is used.
//!
//! Operand code may leave values on the stack that a later node consumes
//! implicitly, so every node carries its static [`StackEffect`].

use crate::error::{CodegenError, Result};
use sint_spec::{Instruction, Opcode};
use std::fmt;
use std::sync::Arc;

/// Declared output type of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A 64-bit word
    Uint64,
    /// Any stack value
    Any,
    /// No value
    None,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Uint64 => "uint64",
            ValueType::Any => "any",
            ValueType::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Static stack effect of a code fragment.
///
/// All quantities are relative to the stack depth before the fragment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackEffect {
    /// Values that must already be on the stack
    pub required: u32,
    /// Values pushed minus values consumed
    pub net: i32,
    /// Highest depth reached above the starting depth
    pub peak: i32,
}

impl StackEffect {
    /// Effect of an empty fragment
    pub const NONE: Self = Self {
        required: 0,
        net: 0,
        peak: 0,
    };

    /// Effect of a single instruction
    pub fn of(instruction: &Instruction) -> Self {
        let (pops, pushes) = instruction.stack_effect();
        let net = pushes as i32 - pops as i32;
        Self {
            required: pops as u32,
            net,
            peak: net.max(0),
        }
    }

    /// Effect of running `self` and then `next`
    pub fn then(self, next: Self) -> Self {
        let required = (self.required as i32).max(next.required as i32 - self.net);
        Self {
            required: required as u32,
            net: self.net + next.net,
            peak: self.peak.max(self.net + next.peak),
        }
    }

    /// Effect of either of two branches with the same net effect
    fn either(self, other: Self) -> Self {
        Self {
            required: self.required.max(other.required),
            net: self.net,
            peak: self.peak.max(other.peak),
        }
    }
}

/// Expression node handle
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

struct NodeData {
    kind: NodeKind,
    /// Operands, or `[condition, then, else]` for a conditional
    children: Vec<Node>,
    output: ValueType,
    effect: StackEffect,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Op(Instruction),
    Cond,
}

// Long operand chains would overflow the thread stack if dropped recursively.
impl Drop for NodeData {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Some(mut data) = Arc::into_inner(node.0) {
                pending.append(&mut data.children);
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.0.kind)
            .field("operands", &self.0.children.len())
            .field("output", &self.0.output)
            .field("effect", &self.0.effect)
            .finish()
    }
}

impl Node {
    /// Generic operation node: `operands` are emitted in order, then the
    /// instruction formed from `opcode` and `immediates`.
    pub fn op(
        opcode: Opcode,
        immediates: &[u64],
        operands: Vec<Node>,
        output: ValueType,
    ) -> Result<Node> {
        if opcode.is_branch() {
            return Err(CodegenError::BranchOpcode(opcode));
        }
        let instruction = Instruction::from_parts(opcode, immediates)?;
        Ok(Node::operation(instruction, operands, output))
    }

    /// Operation node from an already-built instruction.
    ///
    /// Branches and labels belong to the lowering pass and are rejected;
    /// build control flow with [`Node::cond`] instead.
    pub fn instr(
        instruction: Instruction,
        operands: Vec<Node>,
        output: ValueType,
    ) -> Result<Node> {
        if instruction.is_branch() || instruction.opcode().is_none() {
            return Err(CodegenError::ControlFlow(instruction));
        }
        Ok(Node::operation(instruction, operands, output))
    }

    /// Unchecked operation node for builders that only emit straight-line code
    pub(crate) fn operation(
        instruction: Instruction,
        operands: Vec<Node>,
        output: ValueType,
    ) -> Node {
        let effect = operands
            .iter()
            .fold(StackEffect::NONE, |acc, operand| acc.then(operand.stack_effect()))
            .then(StackEffect::of(&instruction));
        Node(Arc::new(NodeData {
            kind: NodeKind::Op(instruction),
            children: operands,
            output,
            effect,
        }))
    }

    /// Value-producing conditional: runs `then_arm` when `condition` is
    /// non-zero, `else_arm` otherwise.
    ///
    /// Both arms must declare the same type and leave the stack at the same
    /// depth.
    pub fn cond(condition: Node, then_arm: Node, else_arm: Node) -> Result<Node> {
        if condition.output_type() == ValueType::None {
            return Err(CodegenError::ConditionType(condition.output_type()));
        }
        if then_arm.output_type() != else_arm.output_type() {
            return Err(CodegenError::ArmTypeMismatch {
                then_type: then_arm.output_type(),
                else_type: else_arm.output_type(),
            });
        }

        let then_effect = then_arm.stack_effect();
        let else_effect = else_arm.stack_effect();
        if then_effect.net != else_effect.net {
            return Err(CodegenError::ArmStackMismatch {
                then_net: then_effect.net,
                else_net: else_effect.net,
            });
        }

        let test = StackEffect::of(&Instruction::Bz {
            target: String::new(),
        });
        let effect = condition
            .stack_effect()
            .then(test)
            .then(then_effect.either(else_effect));

        Ok(Node(Arc::new(NodeData {
            kind: NodeKind::Cond,
            output: then_arm.output_type(),
            children: vec![condition, then_arm, else_arm],
            effect,
        })))
    }

    pub(crate) fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// Opcode of an operation node
    pub fn opcode(&self) -> Option<Opcode> {
        match self.kind() {
            NodeKind::Op(instruction) => instruction.opcode(),
            NodeKind::Cond => None,
        }
    }

    /// Immediate arguments of an operation node
    pub fn immediates(&self) -> Vec<u64> {
        match self.kind() {
            NodeKind::Op(instruction) => instruction.immediates(),
            NodeKind::Cond => Vec::new(),
        }
    }

    /// Operand sub-expressions in emission order; a conditional yields its
    /// condition, then arm and else arm.
    pub fn operands(&self) -> &[Node] {
        &self.0.children
    }

    /// Declared output type
    pub fn output_type(&self) -> ValueType {
        self.0.output
    }

    /// Static stack effect of the node's whole subtree
    pub fn stack_effect(&self) -> StackEffect {
        self.0.effect
    }

    /// The pushed word, if this node is a bare constant
    pub fn as_constant(&self) -> Option<u64> {
        match self.kind() {
            NodeKind::Op(Instruction::PushInt { value }) if self.operands().is_empty() => {
                Some(*value)
            }
            _ => None,
        }
    }

    /// Number of nodes lowering will visit (shared nodes count once per use)
    pub fn size(&self) -> usize {
        let mut pending = vec![self];
        let mut count = 0;
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.operands());
        }
        count
    }

    /// Check if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(value: u64) -> Node {
        Node::instr(Instruction::PushInt { value }, vec![], ValueType::Uint64).unwrap()
    }

    #[test]
    fn test_effect_composition() {
        let push = StackEffect::of(&Instruction::PushInt { value: 1 });
        let add = StackEffect::of(&Instruction::Addw);
        let effect = push.then(add);
        assert_eq!(effect.required, 1);
        assert_eq!(effect.net, 1);
        assert_eq!(effect.peak, 1);

        let two = push.then(push);
        assert_eq!(two.then(add).required, 0);
        assert_eq!(two.then(add).peak, 2);
    }

    #[test]
    fn test_generic_op_node() {
        let node = Node::op(
            Opcode::GetBit,
            &[],
            vec![push(8), push(3)],
            ValueType::Uint64,
        )
        .unwrap();
        assert_eq!(node.opcode(), Some(Opcode::GetBit));
        assert!(node.immediates().is_empty());
        assert_eq!(node.operands().len(), 2);
        assert_eq!(node.stack_effect().net, 1);
        assert_eq!(node.stack_effect().required, 0);
        assert_eq!(node.stack_effect().peak, 2);
        assert_eq!(node.size(), 3);
    }

    #[test]
    fn test_generic_op_immediates() {
        let node = Node::op(Opcode::Cover, &[2], vec![], ValueType::Any).unwrap();
        assert_eq!(node.immediates(), vec![2]);
        assert_eq!(node.stack_effect().required, 3);

        assert!(matches!(
            Node::op(Opcode::Cover, &[], vec![], ValueType::Any),
            Err(CodegenError::Spec(_))
        ));
    }

    #[test]
    fn test_branch_opcode_rejected() {
        assert!(matches!(
            Node::op(Opcode::Bnz, &[], vec![], ValueType::None),
            Err(CodegenError::BranchOpcode(Opcode::Bnz))
        ));
    }

    #[test]
    fn test_instr_rejects_control_flow() {
        let jump = Instruction::B {
            target: "nowhere".to_string(),
        };
        assert!(matches!(
            Node::instr(jump, vec![push(1)], ValueType::Uint64),
            Err(CodegenError::ControlFlow(Instruction::B { .. }))
        ));

        let bz = Instruction::Bz {
            target: "nowhere".to_string(),
        };
        assert!(Node::instr(bz, vec![push(1)], ValueType::None).is_err());

        let label = Instruction::Label {
            name: "here".to_string(),
        };
        assert!(matches!(
            Node::instr(label, vec![], ValueType::None),
            Err(CodegenError::ControlFlow(Instruction::Label { .. }))
        ));
    }

    #[test]
    fn test_deep_chain_size_and_drop() {
        let mut node = push(0);
        for _ in 0..100_000 {
            node = Node::instr(Instruction::BitNot, vec![node], ValueType::Uint64).unwrap();
        }
        assert_eq!(node.size(), 100_001);
        assert_eq!(node.stack_effect().peak, 1);

        let shared = node.operands()[0].clone();
        drop(node);
        assert_eq!(shared.size(), 100_000);
        drop(shared);
    }

    #[test]
    fn test_as_constant() {
        assert_eq!(push(7).as_constant(), Some(7));
        let pop = Node::instr(Instruction::Pop, vec![], ValueType::None).unwrap();
        let pop_then_push =
            Node::instr(Instruction::PushInt { value: 0 }, vec![pop], ValueType::Uint64).unwrap();
        assert_eq!(pop_then_push.as_constant(), None);
    }

    #[test]
    fn test_cond_effect() {
        let node = Node::cond(push(1), push(2), push(3)).unwrap();
        assert_eq!(node.output_type(), ValueType::Uint64);
        assert_eq!(node.stack_effect().net, 1);
        assert_eq!(node.stack_effect().required, 0);
        assert_eq!(node.opcode(), None);
    }

    #[test]
    fn test_cond_arm_mismatch() {
        let none = Node::instr(Instruction::Pop, vec![push(1)], ValueType::None).unwrap();
        assert!(matches!(
            Node::cond(push(1), push(2), none),
            Err(CodegenError::ArmTypeMismatch { .. })
        ));

        let two = Node::instr(Instruction::Dup, vec![push(1)], ValueType::Uint64).unwrap();
        assert!(matches!(
            Node::cond(push(1), push(2), two),
            Err(CodegenError::ArmStackMismatch {
                then_net: 1,
                else_net: 2
            })
        ));
    }

    #[test]
    fn test_cond_requires_value() {
        let none = Node::instr(Instruction::Pop, vec![push(1)], ValueType::None).unwrap();
        assert!(matches!(
            Node::cond(none, push(1), push(2)),
            Err(CodegenError::ConditionType(ValueType::None))
        ));
    }

    #[test]
    fn test_shared_handles() {
        let a = push(5);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&push(5)));
    }
}
