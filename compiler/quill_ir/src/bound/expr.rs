//! Bound expression nodes.

use std::fmt;

use crate::{BinaryOp, FieldId, MethodId, Name, NamespaceId, Span, TypeId, UnaryOp};

use super::{BoundExprId, LocalId};

/// A literal constant value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    String(Name),
}

/// How a conversion was classified.
///
/// Only conversions that exist are materialized as nodes; a `None`
/// classification produces a diagnostic and an error expression instead.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConversionKind {
    /// Source and target are the same type.
    Identity,
    /// Inserted automatically at initializer/argument/return sites.
    Implicit,
    /// Requires an explicit conversion call.
    Explicit,
}

/// Bound expression node. Carries the resolved type and the span of the
/// originating syntax node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct BoundExpr {
    pub kind: BoundExprKind,
    pub ty: TypeId,
    pub span: Span,
}

impl fmt::Debug for BoundExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?} @ {:?}", self.kind, self.ty, self.span)
    }
}

/// Bound expression variants - the closed expression half of the bound
/// node kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BoundExprKind {
    /// Constant value.
    Literal(Literal),

    /// `op operand`
    Unary { op: UnaryOp, operand: BoundExprId },

    /// `left op right`
    Binary {
        op: BinaryOp,
        left: BoundExprId,
        right: BoundExprId,
    },

    /// Read of a local slot.
    Variable { local: LocalId },

    /// Write of a local slot; evaluates to the written value.
    Assignment { local: LocalId, value: BoundExprId },

    /// `receiver.field` - the receiver is a bound expression; for static
    /// fields it is a `NamedType` node, for implicit access a `This` node.
    MemberAccess {
        receiver: BoundExprId,
        field: FieldId,
    },

    /// `receiver.field = value`
    MemberAssignment {
        receiver: BoundExprId,
        field: FieldId,
        value: BoundExprId,
    },

    /// `receiver.method(args...)`. `receiver` is `None` for static
    /// dispatch.
    MethodCall {
        receiver: Option<BoundExprId>,
        method: MethodId,
        args: Vec<BoundExprId>,
    },

    /// Conversion to this node's type.
    Conversion {
        conversion: ConversionKind,
        operand: BoundExprId,
    },

    /// The implicit receiver of an instance method.
    This,

    /// `new T()` - the created type is this node's type.
    ObjectCreation,

    /// Bare-name read of a field of the containing type (implicit `this`
    /// or static).
    Field { field: FieldId },

    /// A type name used in expression position (member-access chains,
    /// conversion callees). Not a value.
    NamedType { ty: TypeId },

    /// A namespace name used in expression position. Not a value.
    Namespace { namespace: NamespaceId },

    /// Placeholder produced after a diagnostic so binding can continue.
    Error,
}
