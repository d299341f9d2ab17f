//! Binder state and the top-level binding entry point.

use rustc_hash::FxHashMap;

use quill_diagnostic::{Diagnostic, DiagnosticBag};
use quill_ir::bound::{BoundArena, BoundBody, BoundExpr, BoundExprId, BoundExprKind};
use quill_ir::syntax::{self, ClassDecl, ItemId, ItemKind, StmtId, SyntaxTree};
use quill_ir::{MethodId, Name, NamespaceId, Span, StringInterner, TypeId};
use quill_types::{DeclarationRegistry, ScopeArena, ScopeId, TypeTable};

/// Output of binding one compilation unit: the populated type table, the
/// bound arena, the bound (not yet lowered) method bodies in declaration
/// order, and every diagnostic reported so far.
pub struct BindResult {
    pub table: TypeTable,
    pub arena: BoundArena,
    pub bodies: Vec<(MethodId, BoundBody)>,
    pub diagnostics: DiagnosticBag,
}

/// Bind a compilation unit.
pub fn bind(tree: &SyntaxTree, interner: &StringInterner) -> BindResult {
    #[cfg(debug_assertions)]
    syntax::validate(tree);

    let mut binder = Binder::new(tree, interner);
    binder.collect_items();
    binder.declare_provisional_classes();
    binder.bind_class_signatures();
    binder.rebind_constraints();
    binder.bind_inheritance_clauses();
    binder.diagnose_self_inheritance();
    binder.bind_member_signatures();
    binder.table.seal();
    binder.diagnose_diamond_problem();
    let bodies = binder.bind_bodies();

    tracing::debug!(
        classes = binder.classes.len(),
        bodies = bodies.len(),
        diagnostics = binder.diagnostics.len(),
        "binding finished"
    );

    BindResult {
        table: binder.table,
        arena: binder.arena,
        bodies,
        diagnostics: binder.diagnostics,
    }
}

/// One class being bound, filled in phase by phase.
pub(crate) struct ClassRecord {
    pub item: ItemId,
    pub enclosing_scope: ScopeId,
    pub namespace: Option<NamespaceId>,
    /// Namespace-qualified name.
    pub full_name: Name,
    /// Search scope holding the provisional symbol (pass A).
    pub search_scope: ScopeId,
    /// Phase-1 symbol; never escapes the search scope.
    pub provisional: TypeId,
    /// The real class symbol (pass B).
    pub ty: TypeId,
    /// The class scope: generic parameters plus member entries (pass B).
    pub scope: ScopeId,
    /// Real generic-parameter symbols, in declaration order (pass B).
    pub params: Vec<TypeId>,
    /// Successfully declared methods, for body binding.
    pub methods: Vec<MethodRecord>,
}

/// A declared method awaiting body binding.
pub(crate) struct MethodRecord {
    pub method: MethodId,
    /// The member scope (method generic parameters live here).
    pub scope: ScopeId,
    pub body: StmtId,
}

/// Which scope arena a name lookup runs against.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum LookupIn {
    /// The real scope chain.
    Real,
    /// The throwaway search-scope chain holding provisional class symbols.
    Search,
}

pub(crate) struct Binder<'a> {
    pub tree: &'a SyntaxTree,
    pub interner: &'a StringInterner,
    pub table: TypeTable,
    pub scopes: ScopeArena,
    pub search_scopes: ScopeArena,
    /// Real scope -> its mirror in the search arena.
    pub search_map: FxHashMap<ScopeId, ScopeId>,
    pub registry: DeclarationRegistry,
    pub diagnostics: DiagnosticBag,
    pub arena: BoundArena,
    pub global_scope: ScopeId,
    /// When set, diagnostics are swallowed (pass-B constraint resolution;
    /// the authoritative re-bind reports them).
    pub quiet: bool,
    pub classes: Vec<ClassRecord>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(tree: &'a SyntaxTree, interner: &'a StringInterner) -> Self {
        let table = TypeTable::new(interner);
        let mut scopes = ScopeArena::new();
        let global_scope = scopes.push_scope(None);

        // Builtin value types are nameable from every scope; `error` and
        // `void` are not surface names.
        for (name, ty) in [
            ("bool", TypeId::BOOL),
            ("int", TypeId::INT),
            ("string", TypeId::STRING),
            ("object", TypeId::OBJECT),
        ] {
            let declared = scopes.declare_type(
                global_scope,
                interner.intern(name),
                ty,
                true,
                None,
                &table,
                interner,
            );
            debug_assert!(declared, "builtin type declaration cannot collide");
        }

        Binder {
            tree,
            interner,
            table,
            scopes,
            search_scopes: ScopeArena::new(),
            search_map: FxHashMap::default(),
            registry: DeclarationRegistry::new(),
            diagnostics: DiagnosticBag::new(),
            arena: BoundArena::new(),
            global_scope,
            quiet: false,
            classes: Vec::new(),
        }
    }

    /// Report a diagnostic unless running quietly.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        if !self.quiet {
            self.diagnostics.report(diagnostic);
        }
    }

    pub(crate) fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub(crate) fn display(&self, ty: TypeId) -> String {
        self.table.display(ty, self.interner)
    }

    /// Intern `namespace.name`.
    pub(crate) fn qualify(&self, namespace: NamespaceId, name: Name) -> Name {
        let ns = self.interner.lookup(self.table.namespace(namespace).full_name);
        self.interner
            .intern(&format!("{ns}.{}", self.interner.lookup(name)))
    }

    pub(crate) fn qualify_opt(&self, namespace: Option<NamespaceId>, name: Name) -> Name {
        match namespace {
            Some(ns) => self.qualify(ns, name),
            None => name,
        }
    }

    /// The class declaration a record points at.
    pub(crate) fn class_decl(&self, item: ItemId) -> &'a ClassDecl {
        let ItemKind::Class(decl) = &self.tree.item(item).kind else {
            unreachable!("class record points at a non-class item")
        };
        decl
    }

    /// Mirror of a real scope in the throwaway search arena, created on
    /// demand with the same parent structure.
    pub(crate) fn search_scope_for(&mut self, real: ScopeId) -> ScopeId {
        if let Some(&mirror) = self.search_map.get(&real) {
            return mirror;
        }
        let parent = self
            .scopes
            .parent(real)
            .map(|p| self.search_scope_for(p));
        let mirror = self.search_scopes.push_scope(parent);
        if parent.is_none() {
            // Root mirror: make builtins resolvable for constraint
            // expressions like `where T : string`.
            for (name, ty) in [
                ("bool", TypeId::BOOL),
                ("int", TypeId::INT),
                ("string", TypeId::STRING),
                ("object", TypeId::OBJECT),
            ] {
                let declared = self.search_scopes.declare_type(
                    mirror,
                    self.interner.intern(name),
                    ty,
                    true,
                    None,
                    &self.table,
                    self.interner,
                );
                debug_assert!(declared);
            }
        }
        self.search_map.insert(real, mirror);
        mirror
    }

    pub(crate) fn lookup_type_in(
        &self,
        lookup: LookupIn,
        scope: ScopeId,
        name: Name,
        namespace: Option<NamespaceId>,
    ) -> Option<TypeId> {
        let arena = match lookup {
            LookupIn::Real => &self.scopes,
            LookupIn::Search => &self.search_scopes,
        };
        arena.lookup_type(scope, name, namespace, &self.table, self.interner)
    }

    pub(crate) fn lookup_namespace_in(
        &self,
        lookup: LookupIn,
        scope: ScopeId,
        name: Name,
    ) -> Option<NamespaceId> {
        let arena = match lookup {
            LookupIn::Real => &self.scopes,
            LookupIn::Search => &self.search_scopes,
        };
        arena.lookup_namespace(scope, name)
    }

    /// Push an error placeholder expression so binding can continue.
    pub(crate) fn error_expr(&mut self, span: Span) -> BoundExprId {
        self.arena.push_expr(BoundExpr {
            kind: BoundExprKind::Error,
            ty: TypeId::ERROR,
            span,
        })
    }

    pub(crate) fn bind_bodies(&mut self) -> Vec<(MethodId, BoundBody)> {
        let mut bodies = Vec::new();
        for class_index in 0..self.classes.len() {
            for method_index in 0..self.classes[class_index].methods.len() {
                let body = self.bind_method_body(class_index, method_index);
                bodies.push((body.method, body));
            }
        }
        bodies
    }
}
