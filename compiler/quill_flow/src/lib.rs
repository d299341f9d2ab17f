//! Control-flow-graph analyses over lowered method bodies.
//!
//! [`ControlFlowGraph::build`] partitions a lowered statement list into
//! basic blocks and edges. Two checks run over the graph:
//!
//! - [`all_paths_return`]: every entry-reachable exit must end in a
//!   `Return` (checked for non-void methods by the driver);
//! - [`check_definite_assignment`]: a forward must-assign dataflow that
//!   flags reads of locals not assigned on every path.
//!
//! Blocks unreachable from entry are excluded from both analyses, so dead
//! code never produces flow diagnostics.

mod assignment;
mod graph;
mod returns;

pub use assignment::check_definite_assignment;
pub use graph::{BasicBlock, ControlFlowGraph};
pub use returns::all_paths_return;

#[cfg(test)]
mod tests;
