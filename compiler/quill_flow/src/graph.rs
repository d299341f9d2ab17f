//! Basic-block construction over a lowered statement list.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use quill_ir::bound::{BoundArena, BoundExprKind, BoundStmtId, BoundStmtKind, LabelId, Literal};

/// One basic block: a maximal straight-line statement run.
pub struct BasicBlock {
    pub statements: Vec<BoundStmtId>,
    /// Successor block indices. At most two (conditional goto).
    pub successors: SmallVec<[usize; 2]>,
    /// Predecessor block indices, deduplicated.
    pub predecessors: Vec<usize>,
}

/// Control-flow graph of one lowered method body.
///
/// Block 0 is the entry. A block with no successors is an exit: either it
/// ends in a `Return`, or control falls off the end of the body there.
pub struct ControlFlowGraph {
    pub blocks: Vec<BasicBlock>,
    /// `reachable[i]` iff block `i` is reachable from entry.
    pub reachable: Vec<bool>,
}

impl ControlFlowGraph {
    /// Build the graph: a new block starts at every label, a block ends
    /// after every goto, conditional goto, and return. Edges cover
    /// fallthrough, unconditional jumps, and both arms of a conditional
    /// jump - except that a conditional jump on a boolean literal
    /// contributes only the taken edge, which is what keeps statically
    /// dead branches out of the analyses.
    pub fn build(arena: &BoundArena, statements: &[BoundStmtId]) -> ControlFlowGraph {
        // Block leaders: statement indices that start a block.
        let mut leaders = vec![false; statements.len()];
        if !statements.is_empty() {
            leaders[0] = true;
        }
        for (index, &stmt) in statements.iter().enumerate() {
            match arena.stmt(stmt).kind {
                BoundStmtKind::Label(_) => leaders[index] = true,
                BoundStmtKind::Goto(_)
                | BoundStmtKind::ConditionalGoto { .. }
                | BoundStmtKind::Return(_) => {
                    if index + 1 < statements.len() {
                        leaders[index + 1] = true;
                    }
                }
                _ => {}
            }
        }

        // Group statements into blocks; map each label to its block.
        let mut blocks: Vec<BasicBlock> = Vec::new();
        let mut block_of_label: FxHashMap<LabelId, usize> = FxHashMap::default();
        for (index, &stmt) in statements.iter().enumerate() {
            if leaders[index] {
                blocks.push(BasicBlock {
                    statements: Vec::new(),
                    successors: SmallVec::new(),
                    predecessors: Vec::new(),
                });
            }
            let current = blocks.len() - 1;
            if let BoundStmtKind::Label(label) = arena.stmt(stmt).kind {
                block_of_label.insert(label, current);
            }
            blocks[current].statements.push(stmt);
        }
        if blocks.is_empty() {
            blocks.push(BasicBlock {
                statements: Vec::new(),
                successors: SmallVec::new(),
                predecessors: Vec::new(),
            });
        }

        // Edges.
        for index in 0..blocks.len() {
            let last = blocks[index].statements.last().copied();
            let mut successors: SmallVec<[usize; 2]> = SmallVec::new();
            match last.map(|stmt| &arena.stmt(stmt).kind) {
                Some(BoundStmtKind::Goto(label)) => {
                    successors.push(block_of_label[label]);
                }
                Some(BoundStmtKind::ConditionalGoto {
                    label,
                    condition,
                    jump_if,
                }) => {
                    let target = block_of_label[label];
                    match constant_condition(arena, *condition) {
                        // Only the taken edge for a constant condition.
                        Some(value) => {
                            if value == *jump_if {
                                successors.push(target);
                            } else if index + 1 < blocks.len() {
                                successors.push(index + 1);
                            }
                        }
                        None => {
                            successors.push(target);
                            if index + 1 < blocks.len() {
                                successors.push(index + 1);
                            }
                        }
                    }
                }
                Some(BoundStmtKind::Return(_)) => {}
                // Fallthrough (including an empty trailing block).
                _ => {
                    if index + 1 < blocks.len() {
                        successors.push(index + 1);
                    }
                }
            }
            blocks[index].successors = successors;
        }

        // Predecessors (deduplicated) and reachability.
        let mut predecessor_sets: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
        for (index, block) in blocks.iter().enumerate() {
            for &succ in &block.successors {
                if !predecessor_sets[succ].contains(&index) {
                    predecessor_sets[succ].push(index);
                }
            }
        }
        for (block, preds) in blocks.iter_mut().zip(predecessor_sets) {
            block.predecessors = preds;
        }

        let reachable = compute_reachability(&blocks);

        tracing::debug!(blocks = blocks.len(), "built control-flow graph");
        ControlFlowGraph { blocks, reachable }
    }

    /// Indices of reachable blocks, in block order.
    pub fn reachable_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.blocks.len()).filter(|&index| self.reachable[index])
    }
}

/// The boolean value of a literal condition, `None` for anything else.
fn constant_condition(arena: &BoundArena, condition: quill_ir::bound::BoundExprId) -> Option<bool> {
    match arena.expr(condition).kind {
        BoundExprKind::Literal(Literal::Bool(value)) => Some(value),
        _ => None,
    }
}

fn compute_reachability(blocks: &[BasicBlock]) -> Vec<bool> {
    let mut reachable = vec![false; blocks.len()];
    let mut stack = vec![0usize];
    while let Some(index) = stack.pop() {
        if reachable[index] {
            continue;
        }
        reachable[index] = true;
        for &succ in &blocks[index].successors {
            if !reachable[succ] {
                stack.push(succ);
            }
        }
    }
    reachable
}
