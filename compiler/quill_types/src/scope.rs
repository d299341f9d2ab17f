//! Arena-backed hierarchical symbol table.
//!
//! One scope per lexical region (global, namespace, class, method, block),
//! parent-linked once at creation and never reparented. Scopes never
//! report diagnostics themselves: a failed declaration returns `false`
//! without mutating anything, and the caller diagnoses it.
//!
//! The arena also carries the chain-wide list of every non-scope-tied type
//! declared anywhere, which backs cross-namespace lookup by full name.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

use quill_ir::bound::LocalId;
use quill_ir::{FieldId, MethodId, Name, NamespaceId, StringInterner, TypeId};

use crate::{SymbolKind, TypeTable};

/// Index of a scope in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// One named entry in a scope. A name may carry entries of several kinds
/// (the list is what makes cross-kind collisions detectable).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeEntry {
    Variable(LocalId),
    Type(TypeId),
    Method(MethodId),
    Field(FieldId),
    Namespace(NamespaceId),
}

impl ScopeEntry {
    pub fn kind(&self) -> SymbolKind {
        match self {
            ScopeEntry::Variable(_) => SymbolKind::Variable,
            ScopeEntry::Type(_) => SymbolKind::Type,
            ScopeEntry::Method(_) => SymbolKind::Method,
            ScopeEntry::Field(_) => SymbolKind::Field,
            ScopeEntry::Namespace(_) => SymbolKind::Namespace,
        }
    }
}

struct ScopeData {
    parent: Option<ScopeId>,
    entries: FxHashMap<Name, SmallVec<[ScopeEntry; 2]>>,
    namespaces: Vec<NamespaceId>,
}

/// Arena of scope nodes with parent indices.
#[derive(Default)]
pub struct ScopeArena {
    scopes: Vec<ScopeData>,
    /// Every non-scope-tied type declared through any scope of this arena,
    /// in declaration order.
    all_types: Vec<TypeId>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope. The parent link is fixed for the scope's lifetime.
    pub fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_raw(
            u32::try_from(self.scopes.len())
                .unwrap_or_else(|_| panic!("scope arena overflow")),
        );
        self.scopes.push(ScopeData {
            parent,
            entries: FxHashMap::default(),
            namespaces: Vec::new(),
        });
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    /// Every non-scope-tied type declared through this arena.
    pub fn all_types(&self) -> &[TypeId] {
        &self.all_types
    }

    /// Namespaces declared directly in a scope.
    pub fn declared_namespaces(&self, scope: ScopeId) -> &[NamespaceId] {
        &self.scopes[scope.index()].namespaces
    }

    /// Declare a variable or parameter.
    ///
    /// Fails (no mutation) if a variable or parameter of the same name is
    /// visible in this or any enclosing scope. Shadowing a field, method,
    /// type, or namespace of the same name is allowed.
    pub fn declare_variable(&mut self, scope: ScopeId, name: Name, local: LocalId) -> bool {
        let mut cursor = Some(scope);
        while let Some(current) = cursor {
            let data = &self.scopes[current.index()];
            if let Some(entries) = data.entries.get(&name) {
                if entries
                    .iter()
                    .any(|e| matches!(e, ScopeEntry::Variable(_)))
                {
                    return false;
                }
            }
            cursor = data.parent;
        }
        self.scopes[scope.index()]
            .entries
            .entry(name)
            .or_default()
            .push(ScopeEntry::Variable(local));
        true
    }

    /// Declare a type.
    ///
    /// Fails (no mutation) if a method, field, or type of the same name is
    /// already declared in this scope, or a type of that (possibly
    /// namespace-qualified) name is visible through any enclosing scope.
    ///
    /// `scope_tied` types (generic parameters) are recorded in the local
    /// map but excluded from the chain-wide all-types list, so they are
    /// visible only while their defining scope is active.
    pub fn declare_type(
        &mut self,
        scope: ScopeId,
        name: Name,
        ty: TypeId,
        scope_tied: bool,
        namespace: Option<NamespaceId>,
        table: &TypeTable,
        interner: &StringInterner,
    ) -> bool {
        if let Some(entries) = self.scopes[scope.index()].entries.get(&name) {
            if entries.iter().any(|e| {
                matches!(
                    e,
                    ScopeEntry::Type(_) | ScopeEntry::Method(_) | ScopeEntry::Field(_)
                )
            }) {
                return false;
            }
        }
        if self
            .lookup_type(scope, name, namespace, table, interner)
            .is_some()
        {
            return false;
        }
        self.scopes[scope.index()]
            .entries
            .entry(name)
            .or_default()
            .push(ScopeEntry::Type(ty));
        if !scope_tied {
            self.all_types.push(ty);
        }
        true
    }

    /// Record a member symbol in its class scope. Member collision rules
    /// are enforced by the type table's `try_declare_*`; the scope entry
    /// exists so `declare_type` sees members when checking its contract.
    pub fn declare_member(&mut self, scope: ScopeId, name: Name, entry: ScopeEntry) {
        debug_assert!(matches!(
            entry,
            ScopeEntry::Method(_) | ScopeEntry::Field(_)
        ));
        self.scopes[scope.index()]
            .entries
            .entry(name)
            .or_default()
            .push(entry);
    }

    /// Make a namespace visible in a scope under the given name segment.
    /// Repeated blocks of the same namespace merge: re-declaring the same
    /// id is a no-op rather than an error.
    pub fn declare_namespace(&mut self, scope: ScopeId, name: Name, namespace: NamespaceId) {
        let data = &mut self.scopes[scope.index()];
        let entries = data.entries.entry(name).or_default();
        if !entries.contains(&ScopeEntry::Namespace(namespace)) {
            entries.push(ScopeEntry::Namespace(namespace));
        }
        if !data.namespaces.contains(&namespace) {
            data.namespaces.push(namespace);
        }
    }

    /// Look up a variable, innermost scope first.
    pub fn lookup_variable(&self, scope: ScopeId, name: Name) -> Option<LocalId> {
        let mut cursor = Some(scope);
        while let Some(current) = cursor {
            let data = &self.scopes[current.index()];
            if let Some(entries) = data.entries.get(&name) {
                for entry in entries {
                    if let ScopeEntry::Variable(local) = entry {
                        return Some(*local);
                    }
                }
            }
            cursor = data.parent;
        }
        None
    }

    /// Look up a type: the local map first, then parents; additionally
    /// matches the name qualified by the supplied namespace's full name,
    /// and falls back to the chain-wide all-types list for cross-namespace
    /// references by full name.
    pub fn lookup_type(
        &self,
        scope: ScopeId,
        name: Name,
        namespace: Option<NamespaceId>,
        table: &TypeTable,
        interner: &StringInterner,
    ) -> Option<TypeId> {
        let mut cursor = Some(scope);
        while let Some(current) = cursor {
            let data = &self.scopes[current.index()];
            if let Some(entries) = data.entries.get(&name) {
                for entry in entries {
                    if let ScopeEntry::Type(ty) = entry {
                        return Some(*ty);
                    }
                }
            }
            cursor = data.parent;
        }

        let qualified = namespace.map(|ns| {
            let ns_name = interner.lookup(table.namespace(ns).full_name);
            interner.intern(&format!("{ns_name}.{}", interner.lookup(name)))
        });
        self.all_types.iter().copied().find(|&ty| {
            let full_name = table.type_data(ty).full_name;
            full_name == name || Some(full_name) == qualified
        })
    }

    /// Look up a namespace by a single name segment, innermost scope
    /// first.
    pub fn lookup_namespace(&self, scope: ScopeId, name: Name) -> Option<NamespaceId> {
        let mut cursor = Some(scope);
        while let Some(current) = cursor {
            let data = &self.scopes[current.index()];
            if let Some(entries) = data.entries.get(&name) {
                for entry in entries {
                    if let ScopeEntry::Namespace(ns) = entry {
                        return Some(*ns);
                    }
                }
            }
            cursor = data.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests;
