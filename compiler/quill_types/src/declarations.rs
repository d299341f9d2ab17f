//! Declaration registry: declaration identity -> declaration sites.
//!
//! Declaration identity is deliberately narrower than symbol equality -
//! `(kind, name)` only, with a type's identity name being its
//! namespace-qualified full name. Two methods with the same name are the
//! same declaration identity regardless of parameter list, because the
//! language dispatches by name alone. The registry exists for
//! redeclaration diagnostics only and is never consulted for name
//! resolution.

use rustc_hash::FxHashMap;

use quill_ir::{Name, Span};

use crate::SymbolKind;

/// The named declaration-identity key.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclKey {
    pub kind: SymbolKind,
    pub name: Name,
}

/// Maps declaration identities to every syntax site that declares them,
/// in source order.
#[derive(Default)]
pub struct DeclarationRegistry {
    map: FxHashMap<DeclKey, Vec<Span>>,
}

impl DeclarationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration site.
    pub fn record(&mut self, kind: SymbolKind, name: Name, span: Span) {
        self.map
            .entry(DeclKey { kind, name })
            .or_default()
            .push(span);
    }

    /// Every recorded site of a declaration identity, in record order.
    pub fn sites(&self, kind: SymbolKind, name: Name) -> &[Span] {
        self.map
            .get(&DeclKey { kind, name })
            .map_or(&[], |sites| sites.as_slice())
    }
}
