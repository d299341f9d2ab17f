//! Definite-assignment analysis.
//!
//! A flow-sensitive forward must-analysis: per reachable block, the set
//! of locals assigned on *every* path reaching it. Standard fixed-point
//! iteration with intersection over predecessors; sets are `FxHashSet`s
//! (a bitset indexed by `LocalId` would be faster for large bodies but
//! adds complexity - revisit if profiling says so).

use rustc_hash::FxHashSet;

use quill_diagnostic::{Diagnostic, DiagnosticBag, ErrorCode};
use quill_ir::bound::{
    BoundArena, BoundExprId, BoundExprKind, BoundStmtId, BoundStmtKind, LocalId, LoweredBody,
};
use quill_ir::StringInterner;

use crate::ControlFlowGraph;

type AssignedSet = FxHashSet<LocalId>;

/// Report every read of a local that is not definitely assigned at that
/// point. Parameters and `this` count as assigned on entry; unreachable
/// blocks are skipped entirely, so reads inside dead code never
/// diagnose.
pub fn check_definite_assignment(
    graph: &ControlFlowGraph,
    body: &LoweredBody,
    arena: &BoundArena,
    interner: &StringInterner,
    diagnostics: &mut DiagnosticBag,
) {
    let num_blocks = graph.blocks.len();

    let entry_set: AssignedSet = body
        .locals
        .iter()
        .enumerate()
        .filter(|(_, local)| local.assigned_on_entry())
        .map(|(index, _)| LocalId::from_raw(index as u32))
        .collect();

    // Fixed-point iteration. `None` is the lattice top ("every local"),
    // used for blocks whose inputs have not been computed yet.
    let mut assigned_in: Vec<Option<AssignedSet>> = vec![None; num_blocks];
    let mut assigned_out: Vec<Option<AssignedSet>> = vec![None; num_blocks];
    assigned_in[0] = Some(entry_set.clone());

    let mut iteration = 0u32;
    loop {
        iteration += 1;
        let mut changed = false;

        for index in graph.reachable_blocks() {
            let new_in = if index == 0 {
                Some(entry_set.clone())
            } else {
                intersect_predecessor_outs(graph, &assigned_out, index)
            };
            let Some(new_in) = new_in else {
                // No predecessor computed yet; try again next round.
                continue;
            };

            let mut new_out = new_in.clone();
            for &stmt in &graph.blocks[index].statements {
                apply_statement(arena, stmt, &mut new_out, None);
            }

            if assigned_in[index].as_ref() != Some(&new_in) {
                assigned_in[index] = Some(new_in);
                changed = true;
            }
            if assigned_out[index].as_ref() != Some(&new_out) {
                assigned_out[index] = Some(new_out);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
    tracing::debug!(iterations = iteration, "definite assignment converged");

    // Reporting pass, in block and statement order for determinism.
    for index in graph.reachable_blocks() {
        let Some(start) = assigned_in[index].clone() else {
            // Reachable blocks always converge to a concrete set.
            continue;
        };
        let mut assigned = start;
        let mut reporter = Reporter {
            body,
            interner,
            diagnostics: &mut *diagnostics,
        };
        for &stmt in &graph.blocks[index].statements {
            apply_statement(arena, stmt, &mut assigned, Some(&mut reporter));
        }
    }
}

/// Intersection of the computed predecessor out-sets; `None` while no
/// predecessor has been computed.
fn intersect_predecessor_outs(
    graph: &ControlFlowGraph,
    assigned_out: &[Option<AssignedSet>],
    index: usize,
) -> Option<AssignedSet> {
    let mut result: Option<AssignedSet> = None;
    for &pred in &graph.blocks[index].predecessors {
        if !graph.reachable[pred] {
            continue;
        }
        let Some(out) = &assigned_out[pred] else {
            continue;
        };
        result = Some(match result {
            None => out.clone(),
            Some(current) => current.intersection(out).copied().collect(),
        });
    }
    result
}

struct Reporter<'a> {
    body: &'a LoweredBody,
    interner: &'a StringInterner,
    diagnostics: &'a mut DiagnosticBag,
}

impl Reporter<'_> {
    fn report_use(&mut self, arena: &BoundArena, expr: BoundExprId, local: LocalId) {
        let name = self.interner.lookup(self.body.locals[local.index()].name);
        let span = arena.expr(expr).span;
        self.diagnostics.report(
            Diagnostic::error(ErrorCode::E4009)
                .with_message(format!("variable `{name}` may be used before it is assigned"))
                .with_label(span, "not assigned on every path reaching this read"),
        );
    }
}

/// Walk one lowered statement in evaluation order, updating the assigned
/// set; with a reporter, also diagnose unassigned reads.
fn apply_statement(
    arena: &BoundArena,
    stmt: BoundStmtId,
    assigned: &mut AssignedSet,
    mut reporter: Option<&mut Reporter<'_>>,
) {
    match &arena.stmt(stmt).kind {
        BoundStmtKind::Expression(expr) => {
            apply_expression(arena, *expr, assigned, reporter.as_deref_mut());
        }
        BoundStmtKind::VariableDeclaration { local, initializer } => {
            if let Some(init) = initializer {
                apply_expression(arena, *init, assigned, reporter.as_deref_mut());
                assigned.insert(*local);
            }
        }
        BoundStmtKind::ConditionalGoto { condition, .. } => {
            apply_expression(arena, *condition, assigned, reporter);
        }
        BoundStmtKind::Return(value) => {
            if let Some(value) = value {
                apply_expression(arena, *value, assigned, reporter);
            }
        }
        BoundStmtKind::Goto(_) | BoundStmtKind::Label(_) => {}
        structured @ (BoundStmtKind::Block(_)
        | BoundStmtKind::If { .. }
        | BoundStmtKind::While { .. }
        | BoundStmtKind::For { .. }) => {
            unreachable!("structured statement in a lowered body: {structured:?}")
        }
    }
}

/// Walk one expression in evaluation order: operands before the effect,
/// an assignment's value before the target becomes assigned.
fn apply_expression(
    arena: &BoundArena,
    expr: BoundExprId,
    assigned: &mut AssignedSet,
    mut reporter: Option<&mut Reporter<'_>>,
) {
    match &arena.expr(expr).kind {
        BoundExprKind::Literal(_)
        | BoundExprKind::This
        | BoundExprKind::ObjectCreation
        | BoundExprKind::Field { .. }
        | BoundExprKind::NamedType { .. }
        | BoundExprKind::Namespace { .. }
        | BoundExprKind::Error => {}
        BoundExprKind::Variable { local } => {
            if !assigned.contains(local) {
                if let Some(reporter) = reporter {
                    reporter.report_use(arena, expr, *local);
                }
            }
        }
        BoundExprKind::Assignment { local, value } => {
            apply_expression(arena, *value, assigned, reporter);
            assigned.insert(*local);
        }
        BoundExprKind::Unary { operand, .. } | BoundExprKind::Conversion { operand, .. } => {
            apply_expression(arena, *operand, assigned, reporter);
        }
        BoundExprKind::Binary { left, right, .. } => {
            apply_expression(arena, *left, assigned, reporter.as_deref_mut());
            apply_expression(arena, *right, assigned, reporter);
        }
        BoundExprKind::MemberAccess { receiver, .. } => {
            apply_expression(arena, *receiver, assigned, reporter);
        }
        BoundExprKind::MemberAssignment {
            receiver, value, ..
        } => {
            apply_expression(arena, *receiver, assigned, reporter.as_deref_mut());
            apply_expression(arena, *value, assigned, reporter);
        }
        BoundExprKind::MethodCall { receiver, args, .. } => {
            if let Some(receiver) = receiver {
                apply_expression(arena, *receiver, assigned, reporter.as_deref_mut());
            }
            for &arg in args {
                apply_expression(arena, arg, assigned, reporter.as_deref_mut());
            }
        }
    }
}
