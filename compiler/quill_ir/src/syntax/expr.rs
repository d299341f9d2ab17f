//! Expression nodes.

use std::fmt;

use smallvec::smallvec;

use crate::{BinaryOp, Name, Span, UnaryOp};

use super::{Children, ExprId, SyntaxChild, TypeExprId};

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Fixed, ordered list of this node's children.
    pub fn children(&self) -> Children {
        match &self.kind {
            ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::Name(_)
            | ExprKind::This => Children::new(),
            ExprKind::Unary { operand, .. } => smallvec![SyntaxChild::Expr(*operand)],
            ExprKind::Binary { left, right, .. } => {
                smallvec![SyntaxChild::Expr(*left), SyntaxChild::Expr(*right)]
            }
            ExprKind::Assignment { target, value } => {
                smallvec![SyntaxChild::Expr(*target), SyntaxChild::Expr(*value)]
            }
            ExprKind::MemberAccess { receiver, .. } => smallvec![SyntaxChild::Expr(*receiver)],
            ExprKind::Call {
                callee,
                generic_args,
                args,
            } => {
                let mut children: Children = smallvec![SyntaxChild::Expr(*callee)];
                children.extend(generic_args.iter().map(|&t| SyntaxChild::Type(t)));
                children.extend(args.iter().map(|&a| SyntaxChild::Expr(a)));
                children
            }
            ExprKind::New { ty, args } => {
                let mut children: Children = smallvec![SyntaxChild::Type(*ty)];
                children.extend(args.iter().map(|&a| SyntaxChild::Expr(a)));
                children
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants. All children are arena indices.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal: `42`
    IntLiteral(i64),

    /// Boolean literal: `true`, `false`
    BoolLiteral(bool),

    /// String literal (interned contents)
    StringLiteral(Name),

    /// Bare name reference
    Name(Name),

    /// `this` inside an instance method
    This,

    /// `op operand`
    Unary { op: UnaryOp, operand: ExprId },

    /// `left op right`
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// `target = value`
    Assignment { target: ExprId, value: ExprId },

    /// `receiver.member`
    MemberAccess {
        receiver: ExprId,
        member: Name,
        member_span: Span,
    },

    /// `callee(args...)` or `callee<T...>(args...)`
    Call {
        callee: ExprId,
        generic_args: Vec<TypeExprId>,
        args: Vec<ExprId>,
    },

    /// `new Type()`
    New { ty: TypeExprId, args: Vec<ExprId> },
}
