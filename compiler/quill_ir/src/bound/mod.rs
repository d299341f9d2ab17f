//! The typed bound tree.
//!
//! The binder turns syntax into these nodes; every node carries its
//! resolved `TypeId` and the span of the originating syntax node for
//! diagnostics. Nodes are immutable once pushed. Lowering pushes new
//! statements into the same arena and produces a [`LoweredBody`] - a flat
//! label/goto statement list with no structured control flow left.

mod expr;
mod stmt;

pub use expr::{BoundExpr, BoundExprKind, ConversionKind, Literal};
pub use stmt::{BoundStmt, BoundStmtKind};

use std::fmt;

use crate::{MethodId, Name, TypeId};

macro_rules! bound_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

bound_id! {
    /// Index of a bound expression node.
    BoundExprId
}
bound_id! {
    /// Index of a bound statement node.
    BoundStmtId
}
bound_id! {
    /// Index of a local slot (parameter, `this`, or local variable) within
    /// one method body.
    LocalId
}
bound_id! {
    /// Opaque jump-target identity. Labels carry a debug name only and are
    /// never compared by name; a fresh id is a fresh target.
    LabelId
}

/// What kind of slot a local occupies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LocalKind {
    /// The implicit `this` reference of an instance method.
    This,
    /// A declared parameter.
    Parameter,
    /// A local variable declaration.
    Variable,
}

/// A local variable or parameter symbol.
///
/// Equality includes the type and the readonly flag, not just the name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VariableSymbol {
    pub name: Name,
    pub ty: TypeId,
    pub readonly: bool,
    pub kind: LocalKind,
}

impl VariableSymbol {
    /// Slots that are definitely assigned on method entry.
    pub fn assigned_on_entry(&self) -> bool {
        matches!(self.kind, LocalKind::This | LocalKind::Parameter)
    }
}

/// Arena for bound nodes, shared by every method body of one compilation.
#[derive(Default)]
pub struct BoundArena {
    exprs: Vec<BoundExpr>,
    stmts: Vec<BoundStmt>,
    labels: Vec<String>,
}

impl BoundArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expr(&self, id: BoundExprId) -> &BoundExpr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: BoundStmtId) -> &BoundStmt {
        &self.stmts[id.index()]
    }

    pub fn push_expr(&mut self, expr: BoundExpr) -> BoundExprId {
        let id = BoundExprId::from_raw(index_u32(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn push_stmt(&mut self, stmt: BoundStmt) -> BoundStmtId {
        let id = BoundStmtId::from_raw(index_u32(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    /// Create a fresh jump target. The debug name is decorated with the
    /// label's index so generated output stays readable.
    pub fn new_label(&mut self, debug_prefix: &str) -> LabelId {
        let id = LabelId::from_raw(index_u32(self.labels.len()));
        self.labels.push(format!("{debug_prefix}{}", id.raw()));
        id
    }

    /// Debug name of a label.
    pub fn label_name(&self, label: LabelId) -> &str {
        &self.labels[label.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("bound arena overflow: {len} nodes"))
}

/// A bound (but not yet lowered) method body.
pub struct BoundBody {
    pub method: MethodId,
    /// Local slots indexed by `LocalId`: `this` (instance methods), then
    /// parameters, then declared variables in binding order.
    pub locals: Vec<VariableSymbol>,
    /// The body block.
    pub root: BoundStmtId,
}

/// A lowered method body: a single flat statement list containing only
/// leaf statements, labels, gotos, and returns.
pub struct LoweredBody {
    pub method: MethodId,
    pub locals: Vec<VariableSymbol>,
    pub statements: Vec<BoundStmtId>,
}
