//! Member-signature binding and the inheritance-diamond check.

use rustc_hash::FxHashSet;

use quill_diagnostic::{Diagnostic, ErrorCode};
use quill_ir::syntax::{FieldDecl, MemberKind, MethodDecl};
use quill_ir::{Name, Span, TypeId};
use quill_types::{
    FieldDeclareError, FieldSymbol, MemberFlags, MethodDeclareError, MethodSymbol,
    ParameterSymbol, ScopeEntry, SymbolKind, TypeData,
};

use crate::binder::{Binder, LookupIn, MethodRecord};

impl<'a> Binder<'a> {
    /// Bind every class's method and field signatures into its member
    /// tables. Each member gets its own child scope of the class scope;
    /// method generic parameters live there.
    ///
    /// Classes are processed bases-first so that override checks see the
    /// inherited member tables; inheritance cycles (already diagnosed)
    /// fall back to declaration order.
    pub(crate) fn bind_member_signatures(&mut self) {
        for index in self.member_binding_order() {
            let decl = self.class_decl(self.classes[index].item);
            for &member_id in &decl.members {
                let member = self.tree.member(member_id);
                match &member.kind {
                    MemberKind::Field(field) => self.bind_field_signature(index, field),
                    MemberKind::Method(method) => self.bind_method_signature(index, method),
                }
            }
        }
    }

    /// Post-order over the inheritance edges between declared classes.
    fn member_binding_order(&self) -> Vec<usize> {
        let mut index_of: rustc_hash::FxHashMap<TypeId, usize> = rustc_hash::FxHashMap::default();
        for (index, record) in self.classes.iter().enumerate() {
            index_of.entry(record.ty).or_insert(index);
        }

        let mut order = Vec::with_capacity(self.classes.len());
        let mut visited = FxHashSet::default();
        for index in 0..self.classes.len() {
            self.visit_bases_first(index, &index_of, &mut visited, &mut order);
        }
        order
    }

    fn visit_bases_first(
        &self,
        index: usize,
        index_of: &rustc_hash::FxHashMap<TypeId, usize>,
        visited: &mut FxHashSet<usize>,
        order: &mut Vec<usize>,
    ) {
        if !visited.insert(index) {
            return;
        }
        for &base in &self.table.type_data(self.classes[index].ty).bases {
            if let Some(&base_index) = index_of.get(&base) {
                self.visit_bases_first(base_index, index_of, visited, order);
            }
        }
        order.push(index);
    }

    fn bind_field_signature(&mut self, class_index: usize, decl: &FieldDecl) {
        let class_scope = self.classes[class_index].scope;
        let namespace = self.classes[class_index].namespace;
        let ty = self.classes[class_index].ty;

        let member_scope = self.scopes.push_scope(Some(class_scope));
        let field_ty = self.resolve_type_expr(LookupIn::Real, member_scope, decl.ty, namespace);

        let mut flags = MemberFlags::empty();
        if decl.is_static {
            flags |= MemberFlags::STATIC;
        }
        let symbol = FieldSymbol {
            name: decl.name,
            span: decl.name_span,
            containing_type: ty,
            ty: field_ty,
            flags,
        };

        self.registry
            .record(SymbolKind::Field, decl.name, decl.name_span);
        match self.table.try_declare_field(ty, symbol) {
            Ok(id) => {
                self.scopes
                    .declare_member(class_scope, decl.name, ScopeEntry::Field(id));
            }
            Err(error) => self.report_field_error(decl.name, decl.name_span, error),
        }
    }

    fn report_field_error(&mut self, name: Name, span: Span, error: FieldDeclareError) {
        let field_name = self.name_str(name);
        match error {
            FieldDeclareError::SharesTypeName => self.report(
                Diagnostic::error(ErrorCode::E1005)
                    .with_message(format!(
                        "member `{field_name}` shares the name of its containing class"
                    ))
                    .with_label(span, "rename this field"),
            ),
            FieldDeclareError::DuplicateField(prior) => {
                let prior_span = self.table.field(prior).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1004)
                        .with_message(format!("field `{field_name}` is already declared"))
                        .with_label(span, "redeclared here")
                        .with_secondary_label(prior_span, "previously declared here"),
                );
            }
            FieldDeclareError::CollidesWithMethod(method) => {
                let method_span = self.table.method(method).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1006)
                        .with_message(format!(
                            "field `{field_name}` collides with a method of the same name"
                        ))
                        .with_label(span, "field declared here")
                        .with_secondary_label(method_span, "method declared here"),
                );
            }
        }
    }

    fn bind_method_signature(&mut self, class_index: usize, decl: &MethodDecl) {
        let class_scope = self.classes[class_index].scope;
        let namespace = self.classes[class_index].namespace;
        let ty = self.classes[class_index].ty;

        let member_scope = self.scopes.push_scope(Some(class_scope));

        // Method generic parameters are scope-tied to the member scope.
        let generic_params: Vec<TypeId> = decl
            .generic_params
            .iter()
            .map(|param| self.table.alloc_type(TypeData::type_parameter(param.name)))
            .collect();
        for (param, syntax) in generic_params.iter().zip(&decl.generic_params) {
            let declared = self.scopes.declare_type(
                member_scope,
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
        let bounds = self.resolve_constraint_clauses(
            LookupIn::Real,
            member_scope,
            namespace,
            &decl.generic_params,
            &decl.constraints,
        );
        for (param_index, resolved) in bounds {
            self.table
                .set_constraints(generic_params[param_index], resolved);
        }

        let mut params: Vec<ParameterSymbol> = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let param_ty = self.resolve_type_expr(LookupIn::Real, member_scope, param.ty, namespace);
            if params.iter().any(|p| p.name == param.name) {
                let param_name = self.name_str(param.name);
                self.report(
                    Diagnostic::error(ErrorCode::E1001)
                        .with_message(format!("parameter `{param_name}` is already declared"))
                        .with_label(param.span, "duplicate parameter"),
                );
            }
            params.push(ParameterSymbol {
                name: param.name,
                ty: param_ty,
                span: param.span,
            });
        }

        let return_type = match decl.return_ty {
            Some(ret) => self.resolve_type_expr(LookupIn::Real, member_scope, ret, namespace),
            None => TypeId::VOID,
        };

        let mut flags = MemberFlags::empty();
        if decl.is_static {
            flags |= MemberFlags::STATIC;
        }
        if decl.is_virtual {
            flags |= MemberFlags::VIRTUAL;
        }
        if decl.is_override {
            flags |= MemberFlags::OVERRIDE;
        }
        let symbol = MethodSymbol {
            name: decl.name,
            span: decl.name_span,
            containing_type: ty,
            return_type,
            flags,
            params,
            generic_params,
            body: None,
        };

        self.registry
            .record(SymbolKind::Method, decl.name, decl.name_span);
        match self.table.try_declare_method(ty, symbol) {
            Ok(id) => {
                self.scopes
                    .declare_member(class_scope, decl.name, ScopeEntry::Method(id));
                self.classes[class_index].methods.push(MethodRecord {
                    method: id,
                    scope: member_scope,
                    body: decl.body,
                });
            }
            Err(error) => self.report_method_error(decl.name, decl.name_span, error),
        }
    }

    fn report_method_error(&mut self, name: Name, span: Span, error: MethodDeclareError) {
        let method_name = self.name_str(name);
        match error {
            MethodDeclareError::SharesTypeName => self.report(
                Diagnostic::error(ErrorCode::E1005)
                    .with_message(format!(
                        "member `{method_name}` shares the name of its containing class"
                    ))
                    .with_label(span, "rename this method"),
            ),
            MethodDeclareError::DuplicateMethod(prior) => {
                let prior_span = self.table.method(prior).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1003)
                        .with_message(format!("method `{method_name}` is already declared"))
                        .with_label(span, "redeclared here")
                        .with_secondary_label(prior_span, "previously declared here"),
                );
            }
            MethodDeclareError::CollidesWithField(field) => {
                let field_span = self.table.field(field).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1006)
                        .with_message(format!(
                            "method `{method_name}` collides with a field of the same name"
                        ))
                        .with_label(span, "method declared here")
                        .with_secondary_label(field_span, "field declared here"),
                );
            }
            MethodDeclareError::HidesNonVirtual(base) => {
                let base_span = self.table.method(base).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1007)
                        .with_message(format!(
                            "method `{method_name}` hides an inherited method that is not virtual"
                        ))
                        .with_label(span, "hides the inherited method")
                        .with_secondary_label(base_span, "non-virtual method declared here"),
                );
            }
            MethodDeclareError::MissingOverride(base) => {
                let base_span = self.table.method(base).span;
                self.report(
                    Diagnostic::error(ErrorCode::E1008)
                        .with_message(format!(
                            "method `{method_name}` hides a virtual inherited method; mark it `override`"
                        ))
                        .with_label(span, "missing `override`")
                        .with_secondary_label(base_span, "virtual method declared here"),
                );
            }
            MethodDeclareError::OverrideWithoutBase => self.report(
                Diagnostic::error(ErrorCode::E1009)
                    .with_message(format!(
                        "method `{method_name}` is marked `override` but no base declares it"
                    ))
                    .with_label(span, "nothing to override"),
            ),
        }
    }

    /// Detect inheritance diamonds: for each pair of unrelated types in a
    /// class's flattened base closure, a member name contributed by both
    /// is ambiguous. Each `(pair, member)` conflict is reported once -
    /// never again from the symmetric pair.
    pub(crate) fn diagnose_diamond_problem(&mut self) {
        let mut reported: FxHashSet<(TypeId, TypeId, TypeId, Name)> = FxHashSet::default();

        for index in 0..self.classes.len() {
            let ty = self.classes[index].ty;
            let decl_span = self.class_decl(self.classes[index].item).name_span;
            let closure = self.table.base_closure(ty);

            for i in 0..closure.len() {
                for j in (i + 1)..closure.len() {
                    let (first, second) = (closure[i], closure[j]);
                    if first == TypeId::OBJECT || second == TypeId::OBJECT {
                        continue;
                    }
                    if self.table.is_subclass_of(first, second)
                        || self.table.is_subclass_of(second, first)
                    {
                        continue;
                    }
                    for name in self.shared_member_names(first, second) {
                        let (lo, hi) = if first.raw() <= second.raw() {
                            (first, second)
                        } else {
                            (second, first)
                        };
                        if !reported.insert((ty, lo, hi, name)) {
                            continue;
                        }
                        let member = self.name_str(name);
                        let class_name = self.display(ty);
                        let first_name = self.display(first);
                        let second_name = self.display(second);
                        self.report(
                            Diagnostic::error(ErrorCode::E4002)
                                .with_message(format!(
                                    "class `{class_name}` inherits member `{member}` from both `{first_name}` and `{second_name}`"
                                ))
                                .with_label(decl_span, "ambiguous inherited member")
                                .with_note(
                                    "the bases are unrelated, so neither definition can win",
                                ),
                        );
                    }
                }
            }
        }
    }

    /// Member names declared directly on both types, in the first type's
    /// declaration order. Instantiation bases contribute their
    /// definition's members.
    fn shared_member_names(&self, first: TypeId, second: TypeId) -> Vec<Name> {
        let own_names = |ty: TypeId| -> Vec<Name> {
            self.table
                .methods_of(ty)
                .iter()
                .map(|&m| self.table.method(m).name)
                .chain(self.table.fields_of(ty).iter().map(|&f| self.table.field(f).name))
                .collect()
        };
        let second_names: FxHashSet<Name> = own_names(second).into_iter().collect();
        own_names(first)
            .into_iter()
            .filter(|name| second_names.contains(name))
            .collect()
    }
}
