//! Bound statement nodes.

use std::fmt;

use crate::Span;

use super::{BoundExprId, BoundStmtId, LabelId, LocalId};

/// Bound statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct BoundStmt {
    pub kind: BoundStmtKind,
    pub span: Span,
}

impl fmt::Debug for BoundStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

impl BoundStmt {
    /// Whether this statement ends a basic block when it appears in a
    /// lowered body.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            BoundStmtKind::Goto { .. }
                | BoundStmtKind::ConditionalGoto { .. }
                | BoundStmtKind::Return(_)
        )
    }
}

/// Bound statement variants - the closed statement half of the bound node
/// kinds.
///
/// `Break` and `continue` have no bound form: the body binder resolves
/// them to `Goto`s against the enclosing loop's break/continue labels, so
/// lowering only ever re-targets structured statements.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BoundStmtKind {
    /// `{ stmts... }`
    Block(Vec<BoundStmtId>),

    /// Free-standing expression.
    Expression(BoundExprId),

    /// Declaration of a local slot, optionally with an initial assignment.
    VariableDeclaration {
        local: LocalId,
        initializer: Option<BoundExprId>,
    },

    /// Structured conditional; removed by lowering.
    If {
        condition: BoundExprId,
        then_branch: BoundStmtId,
        else_branch: Option<BoundStmtId>,
    },

    /// Structured loop; removed by lowering. Carries the label identities
    /// that already-bound `break`/`continue` gotos reference.
    While {
        condition: BoundExprId,
        body: BoundStmtId,
        break_label: LabelId,
        continue_label: LabelId,
    },

    /// Structured for loop; removed by lowering.
    For {
        initializer: BoundStmtId,
        condition: BoundExprId,
        mutation: BoundStmtId,
        body: BoundStmtId,
        break_label: LabelId,
        continue_label: LabelId,
    },

    /// Jump target.
    Label(LabelId),

    /// Unconditional jump.
    Goto(LabelId),

    /// Jump to `label` when the condition evaluates to `jump_if`.
    ConditionalGoto {
        label: LabelId,
        condition: BoundExprId,
        jump_if: bool,
    },

    /// `return [value]`
    Return(Option<BoundExprId>),
}
