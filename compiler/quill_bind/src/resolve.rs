//! Named-type-expression resolution, including recursive generic
//! instantiation and constraint validation.

use quill_diagnostic::{Diagnostic, ErrorCode};
use quill_ir::syntax::TypeExprId;
use quill_ir::{NamespaceId, TypeId};
use quill_types::ScopeId;

use crate::binder::{Binder, LookupIn};

impl<'a> Binder<'a> {
    /// Resolve a named type expression to a type id, reporting resolution
    /// diagnostics and returning `TypeId::ERROR` on failure.
    ///
    /// Generic arguments resolve recursively; referencing a generic
    /// definition requires arguments of the right arity, and each
    /// argument is validated against the corresponding parameter's
    /// constraint list.
    pub(crate) fn resolve_type_expr(
        &mut self,
        lookup: LookupIn,
        scope: ScopeId,
        id: TypeExprId,
        namespace: Option<NamespaceId>,
    ) -> TypeId {
        let type_expr = self.tree.type_expr(id);
        let path = type_expr.path.clone();
        let generic_args = type_expr.generic_args.clone();
        let span = type_expr.span;

        let base = if path.len() == 1 {
            match self.lookup_type_in(lookup, scope, path[0], namespace) {
                Some(ty) => ty,
                None => {
                    let name = self.name_str(path[0]);
                    self.report(
                        Diagnostic::error(ErrorCode::E2002)
                            .with_message(format!("undefined type `{name}`"))
                            .with_label(span, "not found in this scope"),
                    );
                    return TypeId::ERROR;
                }
            }
        } else {
            match self.resolve_qualified_type(lookup, scope, &path, span) {
                Some(ty) => ty,
                None => return TypeId::ERROR,
            }
        };

        self.apply_generic_args_in(lookup, base, &generic_args, scope, namespace, span)
    }

    /// Apply (and validate) generic arguments to a resolved base type,
    /// interning the instantiation. Shared by type-expression resolution
    /// and conversion-call callees (`List<int>(x)`).
    pub(crate) fn apply_generic_args(
        &mut self,
        base: TypeId,
        generic_args: &[TypeExprId],
        scope: ScopeId,
        namespace: Option<NamespaceId>,
        span: quill_ir::Span,
    ) -> TypeId {
        self.apply_generic_args_in(LookupIn::Real, base, generic_args, scope, namespace, span)
    }

    fn apply_generic_args_in(
        &mut self,
        lookup: LookupIn,
        base: TypeId,
        generic_args: &[TypeExprId],
        scope: ScopeId,
        namespace: Option<NamespaceId>,
        span: quill_ir::Span,
    ) -> TypeId {
        let args: Vec<TypeId> = generic_args
            .iter()
            .map(|&arg| self.resolve_type_expr(lookup, scope, arg, namespace))
            .collect();

        let data = self.table.type_data(base);
        if data.is_generic_definition {
            let params = data.generic_params.clone();
            if args.is_empty() {
                let display = self.display(base);
                self.report(
                    Diagnostic::error(ErrorCode::E2011)
                        .with_message(format!(
                            "generic type `{display}` requires type arguments"
                        ))
                        .with_label(span, format!("expected {} type argument(s)", params.len())),
                );
                return TypeId::ERROR;
            }
            if args.len() != params.len() {
                let display = self.display(base);
                self.report(
                    Diagnostic::error(ErrorCode::E2012)
                        .with_message(format!(
                            "wrong number of type arguments for `{display}`: expected {}, found {}",
                            params.len(),
                            args.len()
                        ))
                        .with_label(span, "in this type expression"),
                );
                return TypeId::ERROR;
            }
            for violation in self.table.check_constraints(&params, &args) {
                let argument = self.display(violation.argument);
                let param = self.display(violation.param);
                let constraint = self.display(violation.constraint);
                let arg_span = self.tree.type_expr(generic_args[violation.index]).span;
                self.report(
                    Diagnostic::error(ErrorCode::E2013)
                        .with_message(format!(
                            "type argument `{argument}` violates the constraint `{constraint}` of parameter `{param}`"
                        ))
                        .with_label(arg_span, format!("`{argument}` cannot be cast to `{constraint}`")),
                );
            }
            self.table.instantiate(base, args)
        } else if !args.is_empty() {
            let display = self.display(base);
            self.report(
                Diagnostic::error(ErrorCode::E2010)
                    .with_message(format!(
                        "type `{display}` is not generic and takes no type arguments"
                    ))
                    .with_label(span, "type arguments supplied here"),
            );
            base
        } else {
            base
        }
    }

    /// Resolve a multi-segment path: namespaces down to the final type.
    fn resolve_qualified_type(
        &mut self,
        lookup: LookupIn,
        scope: ScopeId,
        path: &[quill_ir::Name],
        span: quill_ir::Span,
    ) -> Option<TypeId> {
        let dotted: String = path
            .iter()
            .map(|&seg| self.name_str(seg))
            .collect::<Vec<_>>()
            .join(".");

        let Some(mut namespace) = self.lookup_namespace_in(lookup, scope, path[0]) else {
            let full = dotted;
            self.report(
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!("undefined type `{full}`"))
                    .with_label(span, format!("`{}` is not a namespace", self.name_str(path[0]))),
            );
            return None;
        };

        for &segment in &path[1..path.len() - 1] {
            let qualified = self.qualify(namespace, segment);
            match self.table.namespace_named(qualified) {
                Some(child) => namespace = child,
                None => {
                    let full = dotted;
                    self.report(
                        Diagnostic::error(ErrorCode::E2002)
                            .with_message(format!("undefined type `{full}`"))
                            .with_label(
                                span,
                                format!("`{}` is not a namespace", self.name_str(segment)),
                            ),
                    );
                    return None;
                }
            }
        }

        let last = path[path.len() - 1];
        let qualified = self.qualify(namespace, last);
        match self.table.type_named(qualified) {
            Some(ty) => Some(ty),
            None => {
                let full = dotted;
                self.report(
                    Diagnostic::error(ErrorCode::E2002)
                        .with_message(format!("undefined type `{full}`"))
                        .with_label(span, "no such type in this namespace"),
                );
                None
            }
        }
    }
}
