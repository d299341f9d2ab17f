//! Statement nodes.

use std::fmt;

use smallvec::smallvec;

use crate::{Name, Span};

use super::{Children, ExprId, StmtId, SyntaxChild, TypeExprId};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    /// Fixed, ordered list of this node's children.
    pub fn children(&self) -> Children {
        match &self.kind {
            StmtKind::Block(stmts) => stmts.iter().map(|&s| SyntaxChild::Stmt(s)).collect(),
            StmtKind::VariableDeclaration {
                ty, initializer, ..
            } => {
                let mut children = Children::new();
                if let Some(ty) = ty {
                    children.push(SyntaxChild::Type(*ty));
                }
                if let Some(init) = initializer {
                    children.push(SyntaxChild::Expr(*init));
                }
                children
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut children: Children =
                    smallvec![SyntaxChild::Expr(*condition), SyntaxChild::Stmt(*then_branch)];
                if let Some(else_branch) = else_branch {
                    children.push(SyntaxChild::Stmt(*else_branch));
                }
                children
            }
            StmtKind::While { condition, body } => {
                smallvec![SyntaxChild::Expr(*condition), SyntaxChild::Stmt(*body)]
            }
            StmtKind::For {
                initializer,
                condition,
                mutation,
                body,
            } => smallvec![
                SyntaxChild::Stmt(*initializer),
                SyntaxChild::Expr(*condition),
                SyntaxChild::Stmt(*mutation),
                SyntaxChild::Stmt(*body),
            ],
            StmtKind::Break | StmtKind::Continue => Children::new(),
            StmtKind::Return(value) => match value {
                Some(value) => smallvec![SyntaxChild::Expr(*value)],
                None => Children::new(),
            },
            StmtKind::Expression(expr) => smallvec![SyntaxChild::Expr(*expr)],
        }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Statement variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// `{ stmts... }`
    Block(Vec<StmtId>),

    /// `var x [: T] [= e]` or `let x [: T] = e`
    VariableDeclaration {
        name: Name,
        name_span: Span,
        readonly: bool,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
    },

    /// `if (cond) then [else e]`
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },

    /// `while (cond) body`
    While { condition: ExprId, body: StmtId },

    /// `for (init; cond; mutation) body`
    For {
        initializer: StmtId,
        condition: ExprId,
        mutation: StmtId,
        body: StmtId,
    },

    /// `break`
    Break,

    /// `continue`
    Continue,

    /// `return [e]`
    Return(Option<ExprId>),

    /// Free-standing expression statement
    Expression(ExprId),
}
