//! Top-level items, class members, and type expressions.

use std::fmt;

use crate::{Name, Span};

use super::{Children, ItemId, MemberId, StmtId, SyntaxChild, TypeExprId};

/// A named type expression: `Name`, `Ns.Name`, `Name<Arg, ...>`.
///
/// Multi-segment paths qualify through namespaces; generic arguments nest
/// arbitrarily (`Pair<List<int>, string>`).
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TypeExpr {
    pub path: Vec<Name>,
    pub generic_args: Vec<TypeExprId>,
    pub span: Span,
}

impl TypeExpr {
    /// Fixed, ordered list of this node's children.
    pub fn children(&self) -> Children {
        self.generic_args
            .iter()
            .map(|&t| SyntaxChild::Type(t))
            .collect()
    }
}

impl fmt::Debug for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeExpr({:?}, {} args) @ {:?}",
            self.path,
            self.generic_args.len(),
            self.span
        )
    }
}

/// A generic parameter declaration: the `T` in `class C<T>`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GenericParam {
    pub name: Name,
    pub span: Span,
}

/// A constraint clause: `where T : Bound1, Bound2`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintClause {
    pub param: Name,
    pub span: Span,
    pub bounds: Vec<TypeExprId>,
}

/// Top-level item node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

impl Item {
    /// Fixed, ordered list of this node's children.
    pub fn children(&self) -> Children {
        match &self.kind {
            ItemKind::Namespace { items, .. } => {
                items.iter().map(|&i| SyntaxChild::Item(i)).collect()
            }
            ItemKind::Class(class) => {
                let mut children: Children = class
                    .bases
                    .iter()
                    .map(|&b| SyntaxChild::Type(b))
                    .collect();
                for clause in &class.constraints {
                    children.extend(clause.bounds.iter().map(|&b| SyntaxChild::Type(b)));
                }
                children.extend(class.members.iter().map(|&m| SyntaxChild::Member(m)));
                children
            }
        }
    }
}

/// Item variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ItemKind {
    /// `namespace A.B { items... }` - repeatable; blocks with the same full
    /// name merge into one namespace symbol.
    Namespace { path: Vec<Name>, items: Vec<ItemId> },

    /// `class Name<T...> : Base... where ... { members... }`
    Class(ClassDecl),
}

/// A class declaration header plus its member list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub name_span: Span,
    pub generic_params: Vec<GenericParam>,
    pub bases: Vec<TypeExprId>,
    pub constraints: Vec<ConstraintClause>,
    pub members: Vec<MemberId>,
}

/// Class member node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Member {
    pub kind: MemberKind,
    pub span: Span,
}

impl Member {
    /// Fixed, ordered list of this node's children.
    pub fn children(&self) -> Children {
        match &self.kind {
            MemberKind::Field(field) => {
                let mut children = Children::new();
                children.push(SyntaxChild::Type(field.ty));
                children
            }
            MemberKind::Method(method) => {
                let mut children = Children::new();
                for clause in &method.constraints {
                    children.extend(clause.bounds.iter().map(|&b| SyntaxChild::Type(b)));
                }
                children.extend(method.params.iter().map(|p| SyntaxChild::Type(p.ty)));
                if let Some(ret) = method.return_ty {
                    children.push(SyntaxChild::Type(ret));
                }
                children.push(SyntaxChild::Stmt(method.body));
                children
            }
        }
    }
}

/// Member variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberKind {
    Field(FieldDecl),
    Method(MethodDecl),
}

/// A field declaration: `var name: Type;`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub name_span: Span,
    pub is_static: bool,
    pub ty: TypeExprId,
}

/// A parameter declaration: `name: Type`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParamDecl {
    pub name: Name,
    pub span: Span,
    pub ty: TypeExprId,
}

/// A method declaration:
/// `[static] [virtual|override] def name<T...>(params...) [: Type] { body }`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub name: Name,
    pub name_span: Span,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub generic_params: Vec<GenericParam>,
    pub constraints: Vec<ConstraintClause>,
    pub params: Vec<ParamDecl>,
    /// `None` means the method returns `void`.
    pub return_ty: Option<TypeExprId>,
    pub body: StmtId,
}
