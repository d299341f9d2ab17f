//! Signature binding: namespaces, two-pass class declaration, generic
//! constraints, inheritance clauses, and the self-inheritance check.

use quill_diagnostic::{Diagnostic, ErrorCode};
use quill_ir::syntax::{ConstraintClause, GenericParam, ItemId, ItemKind};
use quill_ir::{Name, NamespaceId, TypeId};
use quill_types::{ScopeId, SymbolKind, TypeData};

use crate::binder::{Binder, ClassRecord, LookupIn};

impl<'a> Binder<'a> {
    /// Walk the compilation unit: create namespace scopes (merging blocks
    /// with the same full name into one symbol) and gather classes.
    pub(crate) fn collect_items(&mut self) {
        let roots: Vec<ItemId> = self.tree.roots().to_vec();
        for item in roots {
            self.collect_item(item, self.global_scope, None);
        }
    }

    fn collect_item(&mut self, item: ItemId, scope: ScopeId, namespace: Option<NamespaceId>) {
        match &self.tree.item(item).kind {
            ItemKind::Namespace { path, items } => {
                let path = path.clone();
                let items = items.clone();

                // Declare every prefix namespace; the first segment becomes
                // visible in the enclosing scope so `A.B.C` chains resolve.
                let mut current = namespace;
                for (index, &segment) in path.iter().enumerate() {
                    let full = self.qualify_opt(current, segment);
                    let ns = self.table.declare_namespace(full);
                    if index == 0 {
                        self.scopes.declare_namespace(scope, segment, ns);
                    }
                    current = Some(ns);
                }
                let ns = current;

                // One scope per block; repeated blocks of the same
                // namespace share the symbol, not the scope.
                let block_scope = self.scopes.push_scope(Some(scope));
                for child in items {
                    self.collect_item(child, block_scope, ns);
                }
            }
            ItemKind::Class(_) => {
                self.classes.push(ClassRecord {
                    item,
                    enclosing_scope: scope,
                    namespace,
                    full_name: Name::EMPTY,
                    search_scope: self.global_scope,
                    provisional: TypeId::ERROR,
                    ty: TypeId::ERROR,
                    scope,
                    params: Vec::new(),
                    methods: Vec::new(),
                });
            }
        }
    }

    /// Signature pass A: declare every class provisionally into the
    /// throwaway search scope, with bare generic parameters (implicit
    /// `object` base, no constraints). These symbols exist purely so that
    /// constraint expressions can resolve class names - including the
    /// class being declared.
    pub(crate) fn declare_provisional_classes(&mut self) {
        for index in 0..self.classes.len() {
            let decl = self.class_decl(self.classes[index].item);
            let namespace = self.classes[index].namespace;
            let enclosing = self.classes[index].enclosing_scope;

            let full_name = self.qualify_opt(namespace, decl.name);
            let params: Vec<TypeId> = decl
                .generic_params
                .iter()
                .map(|param| {
                    let mut data = TypeData::type_parameter(param.name);
                    data.provisional = true;
                    self.table.alloc_type(data)
                })
                .collect();

            let mut data = TypeData::class(decl.name, full_name, namespace, decl.name_span);
            data.provisional = true;
            data.is_generic_definition = !params.is_empty();
            data.generic_params = params.clone();
            let provisional = self.table.alloc_type(data);

            let context_scope = self.search_scope_for(enclosing);
            // Collisions are ignored here; pass B diagnoses them against
            // the real declarations.
            let _ = self.search_scopes.declare_type(
                context_scope,
                decl.name,
                provisional,
                false,
                namespace,
                &self.table,
                self.interner,
            );
            // The bare generic parameters get a per-class child scope, so
            // a constraint like `where T : Box<T>` can resolve `T`.
            let search_scope = self.search_scopes.push_scope(Some(context_scope));
            for (param, syntax) in params.iter().zip(&decl.generic_params) {
                let _ = self.search_scopes.declare_type(
                    search_scope,
                    syntax.name,
                    *param,
                    true,
                    namespace,
                    &self.table,
                    self.interner,
                );
            }

            let record = &mut self.classes[index];
            record.full_name = full_name;
            record.provisional = provisional;
            record.search_scope = search_scope;
        }
    }

    /// Signature pass B: declare the real class symbols.
    ///
    /// Constraint clauses are resolved quietly against the search scope
    /// (so self-references work) and attached to the real generic
    /// parameters; the authoritative re-bind replaces them once every
    /// real symbol exists. A name collision reports one diagnostic per
    /// existing declaration site from the registry.
    pub(crate) fn bind_class_signatures(&mut self) {
        for index in 0..self.classes.len() {
            let decl = self.class_decl(self.classes[index].item);
            let namespace = self.classes[index].namespace;
            let enclosing = self.classes[index].enclosing_scope;
            let search_scope = self.classes[index].search_scope;
            let full_name = self.classes[index].full_name;

            let params: Vec<TypeId> = decl
                .generic_params
                .iter()
                .map(|param| self.table.alloc_type(TypeData::type_parameter(param.name)))
                .collect();

            // Quiet provisional constraint resolution; overwritten by
            // `rebind_constraints`.
            self.quiet = true;
            let provisional_bounds = self.resolve_constraint_clauses(
                LookupIn::Search,
                search_scope,
                namespace,
                &decl.generic_params,
                &decl.constraints,
            );
            self.quiet = false;
            for (param_index, bounds) in provisional_bounds {
                self.table.set_constraints(params[param_index], bounds);
            }

            let mut data = TypeData::class(decl.name, full_name, namespace, decl.name_span);
            data.is_generic_definition = !params.is_empty();
            data.generic_params = params.clone();
            let ty = self.table.alloc_type(data);

            let declared = self.scopes.declare_type(
                enclosing,
                decl.name,
                ty,
                false,
                namespace,
                &self.table,
                self.interner,
            );
            if !declared {
                let class_name = self.name_str(full_name);
                let sites = self.registry.sites(SymbolKind::Type, full_name).to_vec();
                if sites.is_empty() {
                    self.report(
                        Diagnostic::error(ErrorCode::E1002)
                            .with_message(format!("type `{class_name}` is already declared"))
                            .with_label(decl.name_span, "redeclared here"),
                    );
                }
                for prior in sites {
                    self.report(
                        Diagnostic::error(ErrorCode::E1002)
                            .with_message(format!("type `{class_name}` is already declared"))
                            .with_label(decl.name_span, "redeclared here")
                            .with_secondary_label(prior, "previously declared here"),
                    );
                }
            }
            self.registry
                .record(SymbolKind::Type, full_name, decl.name_span);
            self.table.register_full_name(ty);

            // The class scope carries the (scope-tied) generic parameters.
            let class_scope = self.scopes.push_scope(Some(enclosing));
            for (param, syntax) in params.iter().zip(&decl.generic_params) {
                let declared = self.scopes.declare_type(
                    class_scope,
                    syntax.name,
                    *param,
                    true,
                    namespace,
                    &self.table,
                    self.interner,
                );
                if !declared {
                    let param_name = self.name_str(syntax.name);
                    self.report(
                        Diagnostic::error(ErrorCode::E1002)
                            .with_message(format!(
                                "type parameter `{param_name}` conflicts with a visible type"
                            ))
                            .with_label(syntax.span, "already declared"),
                    );
                }
            }

            let record = &mut self.classes[index];
            record.ty = ty;
            record.scope = class_scope;
            record.params = params;

            tracing::debug!(class = self.interner.lookup(full_name), "declared class signature");
        }
    }

    /// Bind every constraint clause once more against the real type
    /// scopes, so constraints referencing sibling classes (or the class
    /// itself) resolve to final symbols. This pass reports diagnostics.
    pub(crate) fn rebind_constraints(&mut self) {
        for index in 0..self.classes.len() {
            let decl = self.class_decl(self.classes[index].item);
            let namespace = self.classes[index].namespace;
            let class_scope = self.classes[index].scope;
            let params = self.classes[index].params.clone();

            let bounds = self.resolve_constraint_clauses(
                LookupIn::Real,
                class_scope,
                namespace,
                &decl.generic_params,
                &decl.constraints,
            );
            for (param_index, resolved) in bounds {
                self.table.set_constraints(params[param_index], resolved);
            }
        }
    }

    /// Resolve constraint clauses to per-parameter bound lists.
    ///
    /// Clauses naming an unknown type parameter are diagnosed (unless
    /// quiet); multiple clauses for one parameter accumulate.
    pub(crate) fn resolve_constraint_clauses(
        &mut self,
        lookup: LookupIn,
        scope: ScopeId,
        namespace: Option<NamespaceId>,
        params: &[GenericParam],
        clauses: &[ConstraintClause],
    ) -> Vec<(usize, Vec<TypeId>)> {
        let mut bounds: Vec<(usize, Vec<TypeId>)> = Vec::new();
        for clause in clauses {
            let Some(param_index) = params.iter().position(|p| p.name == clause.param) else {
                let param_name = self.name_str(clause.param);
                self.report(
                    Diagnostic::error(ErrorCode::E2018)
                        .with_message(format!(
                            "constraint clause names unknown type parameter `{param_name}`"
                        ))
                        .with_label(clause.span, "no such type parameter"),
                );
                continue;
            };
            let mut resolved: Vec<TypeId> = Vec::with_capacity(clause.bounds.len());
            for &bound in &clause.bounds {
                let ty = self.resolve_type_expr(lookup, scope, bound, namespace);
                if !ty.is_error() {
                    resolved.push(ty);
                }
            }
            match bounds.iter_mut().find(|(index, _)| *index == param_index) {
                Some((_, existing)) => existing.extend(resolved),
                None => bounds.push((param_index, resolved)),
            }
        }
        bounds
    }

    /// Bind inheritance clauses after all classes have signatures.
    ///
    /// The implicit base `object` is always prepended; an explicit
    /// `: object` is a no-op, and repeated bases collapse (the base list
    /// is a set).
    pub(crate) fn bind_inheritance_clauses(&mut self) {
        for index in 0..self.classes.len() {
            let decl = self.class_decl(self.classes[index].item);
            let namespace = self.classes[index].namespace;
            let class_scope = self.classes[index].scope;
            let ty = self.classes[index].ty;

            let mut bases = vec![TypeId::OBJECT];
            for &base_expr in &decl.bases {
                let span = self.tree.type_expr(base_expr).span;
                let base = self.resolve_type_expr(LookupIn::Real, class_scope, base_expr, namespace);
                if base.is_error() || base == TypeId::OBJECT {
                    continue;
                }
                if base.is_builtin() {
                    let display = self.display(base);
                    self.report(
                        Diagnostic::error(ErrorCode::E4010)
                            .with_message(format!("cannot inherit from builtin type `{display}`"))
                            .with_label(span, "not a valid base type"),
                    );
                    continue;
                }
                if self.table.type_data(base).is_type_parameter {
                    let display = self.display(base);
                    self.report(
                        Diagnostic::error(ErrorCode::E4011)
                            .with_message(format!("cannot inherit from type parameter `{display}`"))
                            .with_label(span, "not a valid base type"),
                    );
                    continue;
                }
                if !bases.contains(&base) {
                    bases.push(base);
                }
            }
            self.table.set_bases(ty, bases);
        }
    }

    /// A visited-set DFS over the base sets; a cycle back to the starting
    /// type reports at every declaration site of that type - exactly one
    /// diagnostic per site, even when the name was declared repeatedly.
    pub(crate) fn diagnose_self_inheritance(&mut self) {
        let mut reported: rustc_hash::FxHashSet<Name> = rustc_hash::FxHashSet::default();
        for index in 0..self.classes.len() {
            let ty = self.classes[index].ty;
            if !self.table.is_subclass_of(ty, ty) {
                continue;
            }
            let full_name = self.classes[index].full_name;
            if !reported.insert(full_name) {
                continue;
            }
            let class_name = self.name_str(full_name);
            let sites = self.registry.sites(SymbolKind::Type, full_name).to_vec();
            debug_assert!(!sites.is_empty(), "declared class has no registry site");
            for span in sites {
                self.report(
                    Diagnostic::error(ErrorCode::E4001)
                        .with_message(format!("class `{class_name}` inherits from itself"))
                        .with_label(span, "part of an inheritance cycle"),
                );
            }
        }
    }
}
