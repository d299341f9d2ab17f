//! Convenience builder for constructing syntax trees.
//!
//! The parser (and tests) drive this instead of pushing raw nodes, so node
//! construction stays in one place.

use crate::{BinaryOp, Name, Span, UnaryOp};

use super::{
    ClassDecl, Expr, ExprId, ExprKind, FieldDecl, Item, ItemId, ItemKind, Member, MemberId,
    MemberKind, MethodDecl, Stmt, StmtId, StmtKind, SyntaxTree, TypeExpr, TypeExprId,
};

/// Builder over a [`SyntaxTree`].
#[derive(Default)]
pub struct TreeBuilder {
    tree: SyntaxTree,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish building and return the tree.
    pub fn finish(self) -> SyntaxTree {
        self.tree
    }

    // Expressions

    pub fn int(&mut self, value: i64, span: Span) -> ExprId {
        self.tree.alloc_expr(Expr::new(ExprKind::IntLiteral(value), span))
    }

    pub fn bool_lit(&mut self, value: bool, span: Span) -> ExprId {
        self.tree
            .alloc_expr(Expr::new(ExprKind::BoolLiteral(value), span))
    }

    pub fn string(&mut self, value: Name, span: Span) -> ExprId {
        self.tree
            .alloc_expr(Expr::new(ExprKind::StringLiteral(value), span))
    }

    pub fn name(&mut self, name: Name, span: Span) -> ExprId {
        self.tree.alloc_expr(Expr::new(ExprKind::Name(name), span))
    }

    pub fn this(&mut self, span: Span) -> ExprId {
        self.tree.alloc_expr(Expr::new(ExprKind::This, span))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, span: Span) -> ExprId {
        self.tree
            .alloc_expr(Expr::new(ExprKind::Unary { op, operand }, span))
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
        self.tree
            .alloc_expr(Expr::new(ExprKind::Binary { op, left, right }, span))
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId, span: Span) -> ExprId {
        self.tree
            .alloc_expr(Expr::new(ExprKind::Assignment { target, value }, span))
    }

    pub fn member(&mut self, receiver: ExprId, member: Name, member_span: Span, span: Span) -> ExprId {
        self.tree.alloc_expr(Expr::new(
            ExprKind::MemberAccess {
                receiver,
                member,
                member_span,
            },
            span,
        ))
    }

    pub fn call(&mut self, callee: ExprId, args: Vec<ExprId>, span: Span) -> ExprId {
        self.call_generic(callee, Vec::new(), args, span)
    }

    pub fn call_generic(
        &mut self,
        callee: ExprId,
        generic_args: Vec<TypeExprId>,
        args: Vec<ExprId>,
        span: Span,
    ) -> ExprId {
        self.tree.alloc_expr(Expr::new(
            ExprKind::Call {
                callee,
                generic_args,
                args,
            },
            span,
        ))
    }

    pub fn new_object(&mut self, ty: TypeExprId, args: Vec<ExprId>, span: Span) -> ExprId {
        self.tree.alloc_expr(Expr::new(ExprKind::New { ty, args }, span))
    }

    // Statements

    pub fn block(&mut self, stmts: Vec<StmtId>, span: Span) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(StmtKind::Block(stmts), span))
    }

    /// `var name [: ty] [= init]`
    pub fn var_decl(
        &mut self,
        name: Name,
        name_span: Span,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
        span: Span,
    ) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(
            StmtKind::VariableDeclaration {
                name,
                name_span,
                readonly: false,
                ty,
                initializer,
            },
            span,
        ))
    }

    /// `let name [: ty] = init`
    pub fn let_decl(
        &mut self,
        name: Name,
        name_span: Span,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
        span: Span,
    ) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(
            StmtKind::VariableDeclaration {
                name,
                name_span,
                readonly: true,
                ty,
                initializer,
            },
            span,
        ))
    }

    pub fn if_stmt(
        &mut self,
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        span: Span,
    ) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    pub fn while_stmt(&mut self, condition: ExprId, body: StmtId, span: Span) -> StmtId {
        self.tree
            .alloc_stmt(Stmt::new(StmtKind::While { condition, body }, span))
    }

    pub fn for_stmt(
        &mut self,
        initializer: StmtId,
        condition: ExprId,
        mutation: StmtId,
        body: StmtId,
        span: Span,
    ) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(
            StmtKind::For {
                initializer,
                condition,
                mutation,
                body,
            },
            span,
        ))
    }

    pub fn break_stmt(&mut self, span: Span) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(StmtKind::Break, span))
    }

    pub fn continue_stmt(&mut self, span: Span) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(StmtKind::Continue, span))
    }

    pub fn return_stmt(&mut self, value: Option<ExprId>, span: Span) -> StmtId {
        self.tree.alloc_stmt(Stmt::new(StmtKind::Return(value), span))
    }

    pub fn expr_stmt(&mut self, expr: ExprId, span: Span) -> StmtId {
        self.tree
            .alloc_stmt(Stmt::new(StmtKind::Expression(expr), span))
    }

    // Types, members, items

    /// A single-segment named type with no generic arguments.
    pub fn named_type(&mut self, name: Name, span: Span) -> TypeExprId {
        self.type_expr(vec![name], Vec::new(), span)
    }

    pub fn type_expr(
        &mut self,
        path: Vec<Name>,
        generic_args: Vec<TypeExprId>,
        span: Span,
    ) -> TypeExprId {
        self.tree.alloc_type_expr(TypeExpr {
            path,
            generic_args,
            span,
        })
    }

    pub fn field(&mut self, field: FieldDecl, span: Span) -> MemberId {
        self.tree
            .alloc_member(Member::new_field(field, span))
    }

    pub fn method(&mut self, method: MethodDecl, span: Span) -> MemberId {
        self.tree
            .alloc_member(Member::new_method(method, span))
    }

    /// Allocate a class item; call [`TreeBuilder::root`] to place it at the
    /// top level or include it in a namespace's item list.
    pub fn class(&mut self, class: ClassDecl, span: Span) -> ItemId {
        self.tree.alloc_item(Item {
            kind: ItemKind::Class(class),
            span,
        })
    }

    pub fn namespace(&mut self, path: Vec<Name>, items: Vec<ItemId>, span: Span) -> ItemId {
        self.tree.alloc_item(Item {
            kind: ItemKind::Namespace { path, items },
            span,
        })
    }

    /// Add an item to the compilation unit's top level.
    pub fn root(&mut self, item: ItemId) {
        self.tree.push_root(item);
    }
}

impl Member {
    fn new_field(field: FieldDecl, span: Span) -> Self {
        Member {
            kind: MemberKind::Field(field),
            span,
        }
    }

    fn new_method(method: MethodDecl, span: Span) -> Self {
        Member {
            kind: MemberKind::Method(method),
            span,
        }
    }
}
