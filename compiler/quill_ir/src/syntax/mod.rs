//! The immutable syntax tree consumed by the binder.
//!
//! The external recursive-descent parser produces this tree; the binder
//! never mutates it. Nodes live in [`SyntaxTree`] arenas and refer to each
//! other by 32-bit indices - no `Box`, no reference cycles.
//!
//! Every node variant enumerates its children explicitly through
//! `children()`, which returns a fixed, ordered list. [`validate`] walks
//! the whole tree through those lists and asserts every index is
//! in-arena; the binder runs it under `debug_assertions`.

mod builder;
mod expr;
mod item;
mod stmt;

pub use builder::TreeBuilder;
pub use expr::{Expr, ExprKind};
pub use item::{
    ClassDecl, ConstraintClause, FieldDecl, GenericParam, Item, ItemKind, Member, MemberKind,
    MethodDecl, ParamDecl, TypeExpr,
};
pub use stmt::{Stmt, StmtKind};

use std::fmt;

use smallvec::SmallVec;

macro_rules! syntax_id {
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

syntax_id! {
    /// Index of an expression node.
    ExprId
}
syntax_id! {
    /// Index of a statement node.
    StmtId
}
syntax_id! {
    /// Index of a type-expression node.
    TypeExprId
}
syntax_id! {
    /// Index of a top-level item node.
    ItemId
}
syntax_id! {
    /// Index of a class-member node.
    MemberId
}

/// A reference to a child node of any syntax family.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SyntaxChild {
    Expr(ExprId),
    Stmt(StmtId),
    Type(TypeExprId),
    Item(ItemId),
    Member(MemberId),
}

/// Fixed, ordered child list of a syntax node.
pub type Children = SmallVec<[SyntaxChild; 4]>;

/// Arena-backed syntax tree for one compilation unit.
#[derive(Default)]
pub struct SyntaxTree {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    type_exprs: Vec<TypeExpr>,
    items: Vec<Item>,
    members: Vec<Member>,
    roots: Vec<ItemId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level items of the compilation unit, in source order.
    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn type_expr(&self, id: TypeExprId) -> &TypeExpr {
        &self.type_exprs[id.index()]
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::from_raw(index_u32(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::from_raw(index_u32(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_type_expr(&mut self, ty: TypeExpr) -> TypeExprId {
        let id = TypeExprId::from_raw(index_u32(self.type_exprs.len()));
        self.type_exprs.push(ty);
        id
    }

    pub fn alloc_item(&mut self, item: Item) -> ItemId {
        let id = ItemId::from_raw(index_u32(self.items.len()));
        self.items.push(item);
        id
    }

    pub fn alloc_member(&mut self, member: Member) -> MemberId {
        let id = MemberId::from_raw(index_u32(self.members.len()));
        self.members.push(member);
        id
    }

    pub fn push_root(&mut self, item: ItemId) {
        self.roots.push(item);
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("syntax arena overflow: {len} nodes"))
}

/// Walk the whole tree through `children()` and panic on any out-of-arena
/// index. Run by the binder under `debug_assertions` only.
pub fn validate(tree: &SyntaxTree) {
    for &root in tree.roots() {
        validate_item(tree, root);
    }
}

fn validate_item(tree: &SyntaxTree, id: ItemId) {
    assert!(id.index() < tree.items.len(), "item id out of arena: {id:?}");
    for child in tree.item(id).children() {
        validate_child(tree, child);
    }
}

fn validate_child(tree: &SyntaxTree, child: SyntaxChild) {
    match child {
        SyntaxChild::Item(id) => validate_item(tree, id),
        SyntaxChild::Member(id) => {
            assert!(
                id.index() < tree.members.len(),
                "member id out of arena: {id:?}"
            );
            for c in tree.member(id).children() {
                validate_child(tree, c);
            }
        }
        SyntaxChild::Stmt(id) => {
            assert!(id.index() < tree.stmts.len(), "stmt id out of arena: {id:?}");
            for c in tree.stmt(id).children() {
                validate_child(tree, c);
            }
        }
        SyntaxChild::Expr(id) => {
            assert!(id.index() < tree.exprs.len(), "expr id out of arena: {id:?}");
            for c in tree.expr(id).children() {
                validate_child(tree, c);
            }
        }
        SyntaxChild::Type(id) => {
            assert!(
                id.index() < tree.type_exprs.len(),
                "type expr id out of arena: {id:?}"
            );
            for c in tree.type_expr(id).children() {
                validate_child(tree, c);
            }
        }
    }
}
