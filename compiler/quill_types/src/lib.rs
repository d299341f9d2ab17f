//! Type system for the Quill compiler.
//!
//! Holds the symbol model (methods, fields, namespaces, locals), the
//! [`TypeTable`] pool of type symbols with generic
//! definitions/instantiations and member tables, the arena-backed
//! [`ScopeArena`] implementing the scope contracts, and the
//! [`DeclarationRegistry`] that groups declaration sites for redeclaration
//! diagnostics.
//!
//! Everything here is mutated only through `&mut` by whichever binder
//! phase currently owns it; after member binding the table is sealed and
//! structural mutation becomes a (debug-asserted) defect.

mod declarations;
mod scope;
mod symbol;
mod table;

pub use declarations::{DeclKey, DeclarationRegistry};
pub use scope::{ScopeArena, ScopeEntry, ScopeId};
pub use symbol::{
    FieldSymbol, MemberFlags, MethodSymbol, NamespaceSymbol, ParameterSymbol, SymbolKind,
};
pub use table::{
    ConstraintViolation, FieldDeclareError, MethodDeclareError, TypeData, TypeTable,
};
