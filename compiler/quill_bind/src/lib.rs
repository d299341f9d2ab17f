//! The Quill binder: turns a syntax tree into a typed bound tree.
//!
//! Binding runs in phases over one shared [`quill_types::TypeTable`] and
//! diagnostic bag:
//!
//! 1. Item collection - namespaces merged and scoped, classes gathered.
//! 2. Signature pass A - provisional class symbols into a throwaway
//!    search scope, so constraint clauses can resolve self-referential
//!    names (`class C<T> where T : C<string>`).
//! 3. Signature pass B - real class symbols with generic parameters
//!    declared into the enclosing scopes; collisions report one
//!    diagnostic per prior declaration site.
//! 4. Constraint re-binding against the real type scopes.
//! 5. Inheritance clauses (implicit `object` base, base-set semantics)
//!    and the self-inheritance check.
//! 6. Member signatures into the type's method/field tables, then the
//!    inheritance-diamond check.
//! 7. Body binding per method, producing [`quill_ir::bound::BoundBody`].
//!
//! No phase ever aborts the compilation: failed checks substitute
//! error-typed placeholders and binding continues.

mod binder;
mod body;
mod conversions;
mod members;
mod operators;
mod resolve;
mod signatures;


pub use binder::{bind, BindResult};
pub use conversions::{classify_conversion, Conversion};
pub use operators::{bind_binary_operator, bind_unary_operator};
