//! The all-paths-return check.

use quill_ir::bound::{BoundArena, BoundStmtKind};

use crate::ControlFlowGraph;

/// Whether every entry-reachable exit of the graph ends in a `Return`.
///
/// An exit block is one with no outgoing edges: either its last statement
/// is a `Return`, or control falls off the end of the body there. A body
/// with no reachable exit at all (an infinite loop) vacuously returns on
/// every path.
///
/// The driver calls this for non-void methods only.
pub fn all_paths_return(graph: &ControlFlowGraph, arena: &BoundArena) -> bool {
    for index in graph.reachable_blocks() {
        let block = &graph.blocks[index];
        if !block.successors.is_empty() {
            continue;
        }
        let ends_in_return = block
            .statements
            .last()
            .is_some_and(|&stmt| matches!(arena.stmt(stmt).kind, BoundStmtKind::Return(_)));
        if !ends_in_return {
            return false;
        }
    }
    true
}
