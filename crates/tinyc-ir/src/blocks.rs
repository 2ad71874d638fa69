//! Basic-block partitioning and the control-flow graph built over it
//! (§3's "optional secondary view", §4.10).
//!
//! Grounded on `original_source/src/codegen/intermediate_code.h`'s
//! `BasicBlock`/`buildBasicBlocks`/`buildControlFlowGraph`. Predecessor
//! and successor links are indices into the returned `Vec<BasicBlock>`
//! rather than the original's raw `BasicBlock*`, the same arena-over-
//! pointers substitution `tinyc-sem::symbol_table` makes for scopes.

use tinyc_util::FxHashMap;

use crate::ir::{Instruction, OpCode};

#[derive(Clone, Debug, Default)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub predecessors: Vec<usize>,
    pub successors: Vec<usize>,
    pub is_entry: bool,
    pub is_exit: bool,
}

/// Splits a flat instruction stream into maximal straight-line blocks:
/// a new block starts at every `Label` instruction and after every jump
/// (`Goto`/`IfFalse`/`IfTrue`/`Return`).
pub fn build_basic_blocks(instructions: &[Instruction]) -> Vec<BasicBlock> {
    if instructions.is_empty() {
        return Vec::new();
    }

    let mut leaders = vec![0usize];
    for (i, instr) in instructions.iter().enumerate() {
        if instr.is_label() && i > 0 {
            leaders.push(i);
        }
        if (instr.is_jump() || instr.op == OpCode::Return) && i + 1 < instructions.len() {
            leaders.push(i + 1);
        }
    }
    leaders.sort_unstable();
    leaders.dedup();

    let mut blocks = Vec::with_capacity(leaders.len());
    for (block_index, &start) in leaders.iter().enumerate() {
        let end = leaders.get(block_index + 1).copied().unwrap_or(instructions.len());
        let label = instructions[start]
            .arg1
            .as_ref()
            .filter(|_| instructions[start].is_label())
            .map(|op| op.name.as_str().to_string())
            .unwrap_or_else(|| format!("$bb{block_index}"));
        blocks.push(BasicBlock {
            label,
            instructions: instructions[start..end].to_vec(),
            predecessors: Vec::new(),
            successors: Vec::new(),
            is_entry: block_index == 0,
            is_exit: false,
        });
    }

    build_control_flow_graph(&mut blocks);
    blocks
}

/// Wires predecessor/successor edges over an already-partitioned block
/// list: a block falls through to the next one unless its last
/// instruction is an unconditional jump or a return, and a jump target
/// is resolved by label name via a one-pass index.
fn build_control_flow_graph(blocks: &mut [BasicBlock]) {
    let label_to_block: FxHashMap<String, usize> =
        blocks.iter().enumerate().map(|(i, b)| (b.label.clone(), i)).collect();

    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        let Some(last) = block.instructions.last() else { continue };
        match last.op {
            OpCode::Goto => {
                if let Some(target) = last.arg1.as_ref().and_then(|o| label_to_block.get(o.name.as_str())) {
                    edges.push((i, *target));
                }
            }
            OpCode::IfFalse | OpCode::IfTrue => {
                if let Some(target) = last.arg2.as_ref().and_then(|o| label_to_block.get(o.name.as_str())) {
                    edges.push((i, *target));
                }
                if i + 1 < blocks.len() {
                    edges.push((i, i + 1));
                }
            }
            OpCode::Return => {}
            _ => {
                if i + 1 < blocks.len() {
                    edges.push((i, i + 1));
                }
            }
        }
    }

    for (from, to) in edges {
        blocks[from].successors.push(to);
        blocks[to].predecessors.push(from);
    }

    for block in blocks.iter_mut() {
        block.is_exit = block.successors.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrType, Operand};
    use tinyc_util::Symbol;

    #[test]
    fn a_straight_line_program_is_a_single_block() {
        let instrs = vec![
            Instruction::assign(Operand::variable(Symbol::intern("x"), IrType::Int), Operand::constant(Symbol::intern("1"), Symbol::intern("1"), IrType::Int), 1),
        ];
        let blocks = build_basic_blocks(&instrs);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_entry && blocks[0].is_exit);
    }

    #[test]
    fn a_label_starts_a_new_block() {
        let l0 = Symbol::intern("L0");
        let instrs = vec![
            Instruction::goto_label(Operand::label(l0), 1),
            Instruction::label(Operand::label(l0), 2),
            Instruction::ret(None, 3),
        ];
        let blocks = build_basic_blocks(&instrs);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].successors, vec![1]);
        assert!(blocks[1].is_exit);
    }
}
