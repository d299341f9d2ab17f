//! Body binding: statements and expressions to typed bound nodes.
//!
//! Each method body binds against a scope chain rooted at its member
//! scope, with `this` bound as an implicit readonly variable of the
//! containing type inside instance methods. Every failed check reports a
//! diagnostic and substitutes an error-typed placeholder, so one pass
//! collects every problem in a body.

use quill_diagnostic::{Diagnostic, ErrorCode};
use quill_ir::bound::{
    BoundBody, BoundExpr, BoundExprId, BoundExprKind, BoundStmt, BoundStmtId, BoundStmtKind,
    LabelId, Literal, LocalId, LocalKind, VariableSymbol,
};
use quill_ir::syntax::{ExprId, ExprKind, StmtId, StmtKind, TypeExprId};
use quill_ir::{MethodId, Name, NamespaceId, Span, TypeId};
use quill_types::{ScopeId, SymbolKind};

use crate::binder::{Binder, LookupIn};
use crate::conversions::{classify_conversion, Conversion};
use crate::operators::{bind_binary_operator, bind_unary_operator};

/// Break/continue targets of the innermost enclosing loop.
struct LoopLabels {
    break_label: LabelId,
    continue_label: LabelId,
}

/// Per-body binding state.
pub(crate) struct BodyCx {
    method: MethodId,
    containing_type: TypeId,
    namespace: Option<NamespaceId>,
    return_type: TypeId,
    is_static: bool,
    locals: Vec<VariableSymbol>,
    loops: Vec<LoopLabels>,
    this_local: Option<LocalId>,
}

impl BodyCx {
    fn new_local(&mut self, symbol: VariableSymbol) -> LocalId {
        let id = LocalId::from_raw(
            u32::try_from(self.locals.len()).unwrap_or_else(|_| panic!("local slot overflow")),
        );
        self.locals.push(symbol);
        id
    }
}

impl<'a> Binder<'a> {
    pub(crate) fn bind_method_body(&mut self, class_index: usize, method_index: usize) -> BoundBody {
        let record = &self.classes[class_index];
        let namespace = record.namespace;
        let containing_type = record.ty;
        let method_record = &record.methods[method_index];
        let method = method_record.method;
        let member_scope = method_record.scope;
        let body_stmt = method_record.body;

        let symbol = self.table.method(method);
        let params = symbol.params.clone();
        let return_type = symbol.return_type;
        let is_static = symbol.is_static();

        let mut cx = BodyCx {
            method,
            containing_type,
            namespace,
            return_type,
            is_static,
            locals: Vec::new(),
            loops: Vec::new(),
            this_local: None,
        };

        let body_scope = self.scopes.push_scope(Some(member_scope));
        if !is_static {
            let this_name = self.interner.intern("this");
            let local = cx.new_local(VariableSymbol {
                name: this_name,
                ty: containing_type,
                readonly: true,
                kind: LocalKind::This,
            });
            let declared = self.scopes.declare_variable(body_scope, this_name, local);
            debug_assert!(declared, "`this` cannot collide in a fresh body scope");
            cx.this_local = Some(local);
        }
        for param in &params {
            let local = cx.new_local(VariableSymbol {
                name: param.name,
                ty: param.ty,
                readonly: false,
                kind: LocalKind::Parameter,
            });
            // Duplicate parameter names were diagnosed at signature time.
            let _ = self.scopes.declare_variable(body_scope, param.name, local);
        }

        let root = self.bind_statement(&mut cx, body_scope, body_stmt);

        BoundBody {
            method,
            locals: cx.locals,
            root,
        }
    }

    // Statements

    fn bind_statement(&mut self, cx: &mut BodyCx, scope: ScopeId, id: StmtId) -> BoundStmtId {
        let tree = self.tree;
        let stmt = tree.stmt(id);
        let span = stmt.span;
        let kind = match &stmt.kind {
            StmtKind::Block(stmts) => {
                let block_scope = self.scopes.push_scope(Some(scope));
                let bound: Vec<BoundStmtId> = stmts
                    .iter()
                    .map(|&child| self.bind_statement(cx, block_scope, child))
                    .collect();
                BoundStmtKind::Block(bound)
            }
            StmtKind::VariableDeclaration {
                name,
                name_span,
                readonly,
                ty,
                initializer,
            } => self.bind_variable_declaration(
                cx,
                scope,
                *name,
                *name_span,
                *readonly,
                *ty,
                *initializer,
            ),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let bound_condition = self.bind_expression(cx, scope, *condition);
                let bound_condition = self.convert(bound_condition, TypeId::BOOL);
                let bound_then = self.bind_statement(cx, scope, *then_branch);
                let bound_else = else_branch.map(|e| self.bind_statement(cx, scope, e));
                BoundStmtKind::If {
                    condition: bound_condition,
                    then_branch: bound_then,
                    else_branch: bound_else,
                }
            }
            StmtKind::While { condition, body } => {
                let bound_condition = self.bind_expression(cx, scope, *condition);
                let bound_condition = self.convert(bound_condition, TypeId::BOOL);
                let break_label = self.arena.new_label("break");
                let continue_label = self.arena.new_label("continue");
                cx.loops.push(LoopLabels {
                    break_label,
                    continue_label,
                });
                let bound_body = self.bind_statement(cx, scope, *body);
                cx.loops.pop();
                BoundStmtKind::While {
                    condition: bound_condition,
                    body: bound_body,
                    break_label,
                    continue_label,
                }
            }
            StmtKind::For {
                initializer,
                condition,
                mutation,
                body,
            } => {
                // The initializer's declarations are visible in the
                // condition, mutation, and body.
                let for_scope = self.scopes.push_scope(Some(scope));
                let bound_init = self.bind_statement(cx, for_scope, *initializer);
                let bound_condition = self.bind_expression(cx, for_scope, *condition);
                let bound_condition = self.convert(bound_condition, TypeId::BOOL);
                let bound_mutation = self.bind_statement(cx, for_scope, *mutation);
                let break_label = self.arena.new_label("break");
                let continue_label = self.arena.new_label("continue");
                cx.loops.push(LoopLabels {
                    break_label,
                    continue_label,
                });
                let bound_body = self.bind_statement(cx, for_scope, *body);
                cx.loops.pop();
                BoundStmtKind::For {
                    initializer: bound_init,
                    condition: bound_condition,
                    mutation: bound_mutation,
                    body: bound_body,
                    break_label,
                    continue_label,
                }
            }
            StmtKind::Break => match cx.loops.last() {
                Some(labels) => BoundStmtKind::Goto(labels.break_label),
                None => {
                    self.report(
                        Diagnostic::error(ErrorCode::E4004)
                            .with_message("`break` outside a loop")
                            .with_label(span, "no enclosing loop"),
                    );
                    let error = self.error_expr(span);
                    BoundStmtKind::Expression(error)
                }
            },
            StmtKind::Continue => match cx.loops.last() {
                Some(labels) => BoundStmtKind::Goto(labels.continue_label),
                None => {
                    self.report(
                        Diagnostic::error(ErrorCode::E4005)
                            .with_message("`continue` outside a loop")
                            .with_label(span, "no enclosing loop"),
                    );
                    let error = self.error_expr(span);
                    BoundStmtKind::Expression(error)
                }
            },
            StmtKind::Return(value) => self.bind_return(cx, scope, *value, span),
            StmtKind::Expression(expr) => {
                let bound = self.bind_expression(cx, scope, *expr);
                if !is_valid_expression_statement(&self.arena.expr(bound).kind) {
                    self.report(
                        Diagnostic::error(ErrorCode::E4003)
                            .with_message(
                                "only assignment and call expressions can be used as a statement",
                            )
                            .with_label(span, "expression value is discarded"),
                    );
                }
                BoundStmtKind::Expression(bound)
            }
        };
        self.arena.push_stmt(BoundStmt { kind, span })
    }

    fn bind_variable_declaration(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        name: Name,
        name_span: Span,
        readonly: bool,
        ty: Option<TypeExprId>,
        initializer: Option<ExprId>,
    ) -> BoundStmtKind {
        let annotation = ty.map(|t| self.resolve_type_expr(LookupIn::Real, scope, t, cx.namespace));
        let bound_init = initializer.map(|e| self.bind_expression(cx, scope, e));

        let (var_ty, final_init) = match (annotation, bound_init) {
            (Some(annotated), Some(init)) => (annotated, Some(self.convert(init, annotated))),
            (Some(annotated), None) => {
                if readonly {
                    let var_name = self.name_str(name);
                    self.report(
                        Diagnostic::error(ErrorCode::E3009)
                            .with_message(format!(
                                "readonly variable `{var_name}` must be initialized"
                            ))
                            .with_label(name_span, "missing initializer"),
                    );
                }
                (annotated, None)
            }
            (None, Some(init)) => {
                let init_ty = self.arena.expr(init).ty;
                if init_ty.is_void() {
                    let init_span = self.arena.expr(init).span;
                    self.report(
                        Diagnostic::error(ErrorCode::E3001)
                            .with_message("cannot initialize a variable with a value of type `void`")
                            .with_label(init_span, "this call returns no value"),
                    );
                    (TypeId::ERROR, Some(init))
                } else {
                    (init_ty, Some(init))
                }
            }
            (None, None) => {
                let var_name = self.name_str(name);
                self.report(
                    Diagnostic::error(ErrorCode::E3008)
                        .with_message(format!(
                            "variable `{var_name}` needs a type annotation or an initializer"
                        ))
                        .with_label(name_span, "cannot infer a type"),
                );
                (TypeId::ERROR, None)
            }
        };

        let local = cx.new_local(VariableSymbol {
            name,
            ty: var_ty,
            readonly,
            kind: LocalKind::Variable,
        });
        if !self.scopes.declare_variable(scope, name, local) {
            let var_name = self.name_str(name);
            self.report(
                Diagnostic::error(ErrorCode::E1001)
                    .with_message(format!("variable `{var_name}` is already declared"))
                    .with_label(name_span, "redeclared here"),
            );
        }
        self.registry.record(SymbolKind::Variable, name, name_span);

        BoundStmtKind::VariableDeclaration {
            local,
            initializer: final_init,
        }
    }

    fn bind_return(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        value: Option<ExprId>,
        span: Span,
    ) -> BoundStmtKind {
        let bound = value.map(|v| self.bind_expression(cx, scope, v));
        if cx.return_type.is_void() {
            if let Some(b) = bound {
                if !self.arena.expr(b).ty.is_error() {
                    self.report(
                        Diagnostic::error(ErrorCode::E4006)
                            .with_message("cannot return a value from a void method")
                            .with_label(span, "remove this value"),
                    );
                }
            }
            BoundStmtKind::Return(bound)
        } else {
            match bound {
                None => {
                    let expected = self.display(cx.return_type);
                    self.report(
                        Diagnostic::error(ErrorCode::E4007)
                            .with_message(format!(
                                "this method must return a value of type `{expected}`"
                            ))
                            .with_label(span, "missing return value"),
                    );
                    BoundStmtKind::Return(None)
                }
                Some(b) => BoundStmtKind::Return(Some(self.convert(b, cx.return_type))),
            }
        }
    }

    // Expressions

    fn bind_expression(&mut self, cx: &mut BodyCx, scope: ScopeId, id: ExprId) -> BoundExprId {
        let tree = self.tree;
        let expr = tree.expr(id);
        let span = expr.span;
        match &expr.kind {
            ExprKind::IntLiteral(value) => self.push_expr(
                BoundExprKind::Literal(Literal::Int(*value)),
                TypeId::INT,
                span,
            ),
            ExprKind::BoolLiteral(value) => self.push_expr(
                BoundExprKind::Literal(Literal::Bool(*value)),
                TypeId::BOOL,
                span,
            ),
            ExprKind::StringLiteral(value) => self.push_expr(
                BoundExprKind::Literal(Literal::String(*value)),
                TypeId::STRING,
                span,
            ),
            ExprKind::Name(name) => self.bind_name_expression(cx, scope, *name, span),
            ExprKind::This => match cx.this_local {
                Some(_) => self.push_expr(BoundExprKind::This, cx.containing_type, span),
                None => {
                    self.report(
                        Diagnostic::error(ErrorCode::E2019)
                            .with_message("`this` cannot be used in a static method")
                            .with_label(span, "static context"),
                    );
                    self.error_expr(span)
                }
            },
            ExprKind::Unary { op, operand } => {
                let bound = self.bind_expression(cx, scope, *operand);
                let operand_ty = self.arena.expr(bound).ty;
                if operand_ty.is_error() {
                    return self.error_expr(span);
                }
                match bind_unary_operator(*op, operand_ty) {
                    Some(result) => self.push_expr(
                        BoundExprKind::Unary {
                            op: *op,
                            operand: bound,
                        },
                        result,
                        span,
                    ),
                    None => {
                        let display = self.display(operand_ty);
                        self.report(
                            Diagnostic::error(ErrorCode::E3005)
                                .with_message(format!(
                                    "unary operator `{op}` is not defined for type `{display}`"
                                ))
                                .with_label(span, "invalid operand"),
                        );
                        self.error_expr(span)
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                let bound_left = self.bind_expression(cx, scope, *left);
                let bound_right = self.bind_expression(cx, scope, *right);
                let left_ty = self.arena.expr(bound_left).ty;
                let right_ty = self.arena.expr(bound_right).ty;
                if left_ty.is_error() || right_ty.is_error() {
                    return self.error_expr(span);
                }
                match bind_binary_operator(*op, left_ty, right_ty) {
                    Some(result) => self.push_expr(
                        BoundExprKind::Binary {
                            op: *op,
                            left: bound_left,
                            right: bound_right,
                        },
                        result,
                        span,
                    ),
                    None => {
                        let left_display = self.display(left_ty);
                        let right_display = self.display(right_ty);
                        self.report(
                            Diagnostic::error(ErrorCode::E3004)
                                .with_message(format!(
                                    "binary operator `{op}` is not defined for types `{left_display}` and `{right_display}`"
                                ))
                                .with_label(span, "invalid operands"),
                        );
                        self.error_expr(span)
                    }
                }
            }
            ExprKind::Assignment { target, value } => {
                self.bind_assignment(cx, scope, *target, *value, span)
            }
            ExprKind::MemberAccess {
                receiver,
                member,
                member_span,
            } => {
                let bound_receiver = self.bind_expression(cx, scope, *receiver);
                self.bind_member_access(bound_receiver, *member, *member_span, span)
            }
            ExprKind::Call {
                callee,
                generic_args,
                args,
            } => self.bind_call(cx, scope, *callee, generic_args, args, span),
            ExprKind::New { ty, args } => self.bind_new(cx, scope, *ty, args, span),
        }
    }

    fn push_expr(&mut self, kind: BoundExprKind, ty: TypeId, span: Span) -> BoundExprId {
        self.arena.push_expr(BoundExpr { kind, ty, span })
    }

    /// Bare-name resolution: variable, then field of the containing type,
    /// then (for diagnostics) method, then type, then namespace.
    fn bind_name_expression(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        name: Name,
        span: Span,
    ) -> BoundExprId {
        if let Some(local) = self.scopes.lookup_variable(scope, name) {
            if cx.this_local == Some(local) {
                return self.push_expr(BoundExprKind::This, cx.containing_type, span);
            }
            let ty = cx.locals[local.index()].ty;
            return self.push_expr(BoundExprKind::Variable { local }, ty, span);
        }

        if let Some(field) = self.table.lookup_field(cx.containing_type, name) {
            let field_ty = self.table.field(field).ty;
            let field_static = self.table.field(field).is_static();
            if cx.is_static && !field_static {
                let field_name = self.name_str(name);
                self.report(
                    Diagnostic::error(ErrorCode::E2017)
                        .with_message(format!(
                            "instance field `{field_name}` cannot be accessed from a static method"
                        ))
                        .with_label(span, "static context"),
                );
                return self.error_expr(span);
            }
            return self.push_expr(BoundExprKind::Field { field }, field_ty, span);
        }

        if self.table.lookup_method(cx.containing_type, name).is_some() {
            let method_name = self.name_str(name);
            self.report(
                Diagnostic::error(ErrorCode::E2005)
                    .with_message(format!("`{method_name}` is a method, not a value"))
                    .with_label(span, "did you mean to call it?"),
            );
            return self.error_expr(span);
        }

        if let Some(ty) =
            self.scopes
                .lookup_type(scope, name, cx.namespace, &self.table, self.interner)
        {
            return self.push_expr(BoundExprKind::NamedType { ty }, ty, span);
        }

        if let Some(namespace) = self.scopes.lookup_namespace(scope, name) {
            return self.push_expr(BoundExprKind::Namespace { namespace }, TypeId::VOID, span);
        }

        let display = self.name_str(name);
        self.report(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("undefined name `{display}`"))
                .with_label(span, "not found in this scope"),
        );
        self.error_expr(span)
    }

    // Assignment

    fn bind_assignment(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        target: ExprId,
        value: ExprId,
        span: Span,
    ) -> BoundExprId {
        let tree = self.tree;
        let bound_value = self.bind_expression(cx, scope, value);
        match &tree.expr(target).kind {
            ExprKind::Name(name) => {
                let target_span = tree.expr(target).span;
                self.bind_name_assignment(cx, scope, *name, target_span, bound_value, span)
            }
            ExprKind::MemberAccess {
                receiver,
                member,
                member_span,
            } => {
                let bound_receiver = self.bind_expression(cx, scope, *receiver);
                self.bind_member_assignment(bound_receiver, *member, *member_span, bound_value, span)
            }
            ExprKind::This => {
                self.report(
                    Diagnostic::error(ErrorCode::E3003)
                        .with_message("`this` is readonly and cannot be assigned")
                        .with_label(span, "invalid assignment"),
                );
                self.error_expr(span)
            }
            _ => {
                self.report(
                    Diagnostic::error(ErrorCode::E3006)
                        .with_message("invalid assignment target")
                        .with_label(span, "expected a variable or a field"),
                );
                self.error_expr(span)
            }
        }
    }

    fn bind_name_assignment(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        name: Name,
        target_span: Span,
        value: BoundExprId,
        span: Span,
    ) -> BoundExprId {
        if let Some(local) = self.scopes.lookup_variable(scope, name) {
            let symbol = &cx.locals[local.index()];
            let var_ty = symbol.ty;
            if symbol.readonly {
                let var_name = self.name_str(name);
                self.report(
                    Diagnostic::error(ErrorCode::E3003)
                        .with_message(format!("cannot assign to readonly variable `{var_name}`"))
                        .with_label(target_span, "declared readonly"),
                );
            }
            let converted = self.convert(value, var_ty);
            return self.push_expr(
                BoundExprKind::Assignment {
                    local,
                    value: converted,
                },
                var_ty,
                span,
            );
        }

        if let Some(field) = self.table.lookup_field(cx.containing_type, name) {
            let field_ty = self.table.field(field).ty;
            let field_static = self.table.field(field).is_static();
            let receiver = if field_static {
                self.push_expr(
                    BoundExprKind::NamedType {
                        ty: cx.containing_type,
                    },
                    cx.containing_type,
                    target_span,
                )
            } else if cx.is_static {
                let field_name = self.name_str(name);
                self.report(
                    Diagnostic::error(ErrorCode::E2017)
                        .with_message(format!(
                            "instance field `{field_name}` cannot be assigned from a static method"
                        ))
                        .with_label(target_span, "static context"),
                );
                return self.error_expr(span);
            } else {
                self.push_expr(BoundExprKind::This, cx.containing_type, target_span)
            };
            let converted = self.convert(value, field_ty);
            return self.push_expr(
                BoundExprKind::MemberAssignment {
                    receiver,
                    field,
                    value: converted,
                },
                field_ty,
                span,
            );
        }

        let display = self.name_str(name);
        self.report(
            Diagnostic::error(ErrorCode::E2001)
                .with_message(format!("undefined name `{display}`"))
                .with_label(target_span, "not found in this scope"),
        );
        self.error_expr(span)
    }

    fn bind_member_assignment(
        &mut self,
        receiver: BoundExprId,
        member: Name,
        member_span: Span,
        value: BoundExprId,
        span: Span,
    ) -> BoundExprId {
        let receiver_kind = self.arena.expr(receiver).kind.clone();
        let receiver_ty = self.arena.expr(receiver).ty;
        match receiver_kind {
            BoundExprKind::Error => self.error_expr(span),
            BoundExprKind::Namespace { namespace } => {
                let ns_name = self.interner.lookup(self.table.namespace(namespace).full_name);
                let member_name = self.name_str(member);
                self.report(
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!(
                            "namespace `{ns_name}` has no field `{member_name}`"
                        ))
                        .with_label(member_span, "not assignable"),
                );
                self.error_expr(span)
            }
            BoundExprKind::NamedType { ty } => match self.table.lookup_field(ty, member) {
                Some(field) => {
                    let field_ty = self.table.field(field).ty;
                    if !self.table.field(field).is_static() {
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2017)
                                .with_message(format!(
                                    "instance field `{member_name}` cannot be accessed through a type name"
                                ))
                                .with_label(member_span, "needs an instance"),
                        );
                        return self.error_expr(span);
                    }
                    let converted = self.convert(value, field_ty);
                    self.push_expr(
                        BoundExprKind::MemberAssignment {
                            receiver,
                            field,
                            value: converted,
                        },
                        field_ty,
                        span,
                    )
                }
                None => {
                    let display = self.display(ty);
                    let member_name = self.name_str(member);
                    self.report(
                        Diagnostic::error(ErrorCode::E2004)
                            .with_message(format!("type `{display}` has no field `{member_name}`"))
                            .with_label(member_span, "unknown field"),
                    );
                    self.error_expr(span)
                }
            },
            _ => {
                if receiver_ty.is_error() {
                    return self.error_expr(span);
                }
                if receiver_ty.is_builtin() {
                    let display = self.display(receiver_ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E2004)
                            .with_message(format!("type `{display}` has no fields"))
                            .with_label(member_span, "builtin type"),
                    );
                    return self.error_expr(span);
                }
                match self.table.lookup_field(receiver_ty, member) {
                    Some(field) => {
                        let field_ty = self.table.field(field).ty;
                        if self.table.field(field).is_static() {
                            let member_name = self.name_str(member);
                            self.report(
                                Diagnostic::error(ErrorCode::E2016)
                                    .with_message(format!(
                                        "static field `{member_name}` cannot be accessed through an instance"
                                    ))
                                    .with_label(member_span, "use the type name"),
                            );
                            return self.error_expr(span);
                        }
                        let converted = self.convert(value, field_ty);
                        self.push_expr(
                            BoundExprKind::MemberAssignment {
                                receiver,
                                field,
                                value: converted,
                            },
                            field_ty,
                            span,
                        )
                    }
                    None => {
                        let display = self.display(receiver_ty);
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2004)
                                .with_message(format!(
                                    "type `{display}` has no field `{member_name}`"
                                ))
                                .with_label(member_span, "unknown field"),
                        );
                        self.error_expr(span)
                    }
                }
            }
        }
    }

    // Member access (read position)

    fn bind_member_access(
        &mut self,
        receiver: BoundExprId,
        member: Name,
        member_span: Span,
        span: Span,
    ) -> BoundExprId {
        let receiver_kind = self.arena.expr(receiver).kind.clone();
        let receiver_ty = self.arena.expr(receiver).ty;
        match receiver_kind {
            BoundExprKind::Error => self.error_expr(span),
            BoundExprKind::Namespace { namespace } => {
                // Continue resolution by qualified name: child namespace
                // first, then a type of that full name.
                let qualified = self.qualify(namespace, member);
                if let Some(child) = self.table.namespace_named(qualified) {
                    return self.push_expr(
                        BoundExprKind::Namespace { namespace: child },
                        TypeId::VOID,
                        span,
                    );
                }
                if let Some(ty) = self.table.type_named(qualified) {
                    return self.push_expr(BoundExprKind::NamedType { ty }, ty, span);
                }
                let ns_name = self.interner.lookup(self.table.namespace(namespace).full_name);
                let member_name = self.name_str(member);
                self.report(
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!(
                            "namespace `{ns_name}` has no member `{member_name}`"
                        ))
                        .with_label(member_span, "unknown member"),
                );
                self.error_expr(span)
            }
            BoundExprKind::NamedType { ty } => {
                if let Some(field) = self.table.lookup_field(ty, member) {
                    let field_ty = self.table.field(field).ty;
                    if !self.table.field(field).is_static() {
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2017)
                                .with_message(format!(
                                    "instance field `{member_name}` cannot be accessed through a type name"
                                ))
                                .with_label(member_span, "needs an instance"),
                        );
                        return self.error_expr(span);
                    }
                    return self.push_expr(
                        BoundExprKind::MemberAccess { receiver, field },
                        field_ty,
                        span,
                    );
                }
                if self.table.lookup_method(ty, member).is_some() {
                    let member_name = self.name_str(member);
                    self.report(
                        Diagnostic::error(ErrorCode::E2005)
                            .with_message(format!("`{member_name}` is a method, not a value"))
                            .with_label(member_span, "did you mean to call it?"),
                    );
                    return self.error_expr(span);
                }
                let display = self.display(ty);
                let member_name = self.name_str(member);
                self.report(
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!("type `{display}` has no member `{member_name}`"))
                        .with_label(member_span, "unknown member"),
                );
                self.error_expr(span)
            }
            _ => {
                if receiver_ty.is_error() {
                    return self.error_expr(span);
                }
                if receiver_ty.is_builtin() {
                    let display = self.display(receiver_ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E2004)
                            .with_message(format!("type `{display}` has no members"))
                            .with_label(member_span, "builtin type"),
                    );
                    return self.error_expr(span);
                }
                if let Some(field) = self.table.lookup_field(receiver_ty, member) {
                    let field_ty = self.table.field(field).ty;
                    if self.table.field(field).is_static() {
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2016)
                                .with_message(format!(
                                    "static field `{member_name}` cannot be accessed through an instance"
                                ))
                                .with_label(member_span, "use the type name"),
                        );
                        return self.error_expr(span);
                    }
                    return self.push_expr(
                        BoundExprKind::MemberAccess { receiver, field },
                        field_ty,
                        span,
                    );
                }
                if self.table.lookup_method(receiver_ty, member).is_some() {
                    let member_name = self.name_str(member);
                    self.report(
                        Diagnostic::error(ErrorCode::E2005)
                            .with_message(format!("`{member_name}` is a method, not a value"))
                            .with_label(member_span, "did you mean to call it?"),
                    );
                    return self.error_expr(span);
                }
                let display = self.display(receiver_ty);
                let member_name = self.name_str(member);
                self.report(
                    Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!("type `{display}` has no member `{member_name}`"))
                        .with_label(member_span, "unknown member"),
                );
                self.error_expr(span)
            }
        }
    }

    // Calls

    fn bind_call(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        callee: ExprId,
        generic_args: &[TypeExprId],
        args: &[ExprId],
        span: Span,
    ) -> BoundExprId {
        let tree = self.tree;
        match &tree.expr(callee).kind {
            ExprKind::Name(name) => {
                let name = *name;
                if self.scopes.lookup_variable(scope, name).is_some() {
                    let display = self.name_str(name);
                    self.report(
                        Diagnostic::error(ErrorCode::E2006)
                            .with_message(format!("`{display}` is a variable and cannot be called"))
                            .with_label(span, "not callable"),
                    );
                    return self.error_expr(span);
                }
                // A single-argument call naming a visible type is a
                // conversion.
                if args.len() == 1 {
                    if let Some(base) =
                        self.scopes
                            .lookup_type(scope, name, cx.namespace, &self.table, self.interner)
                    {
                        let target =
                            self.apply_generic_args(base, generic_args, scope, cx.namespace, span);
                        return self.bind_conversion(cx, scope, target, args[0], span);
                    }
                }
                if let Some(method) = self.table.lookup_method(cx.containing_type, name) {
                    let method_static = self.table.method(method).is_static();
                    let receiver = if method_static {
                        None
                    } else if cx.is_static {
                        let display = self.name_str(name);
                        self.report(
                            Diagnostic::error(ErrorCode::E2017)
                                .with_message(format!(
                                    "instance method `{display}` cannot be called from a static method"
                                ))
                                .with_label(span, "static context"),
                        );
                        return self.error_expr(span);
                    } else {
                        Some(self.push_expr(BoundExprKind::This, cx.containing_type, span))
                    };
                    return self.finish_method_call(
                        cx,
                        scope,
                        method,
                        receiver,
                        generic_args,
                        args,
                        span,
                    );
                }
                let display = self.name_str(name);
                self.report(
                    Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!("undefined method `{display}`"))
                        .with_label(span, "no such method in this context"),
                );
                self.error_expr(span)
            }
            ExprKind::MemberAccess {
                receiver,
                member,
                member_span,
            } => {
                let member = *member;
                let member_span = *member_span;
                let bound_receiver = self.bind_expression(cx, scope, *receiver);
                self.bind_member_call(
                    cx,
                    scope,
                    bound_receiver,
                    member,
                    member_span,
                    generic_args,
                    args,
                    span,
                )
            }
            _ => {
                self.report(
                    Diagnostic::error(ErrorCode::E2006)
                        .with_message("this expression is not callable")
                        .with_label(span, "expected a method name"),
                );
                self.error_expr(span)
            }
        }
    }

    fn bind_member_call(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        receiver: BoundExprId,
        member: Name,
        member_span: Span,
        generic_args: &[TypeExprId],
        args: &[ExprId],
        span: Span,
    ) -> BoundExprId {
        let receiver_kind = self.arena.expr(receiver).kind.clone();
        let receiver_ty = self.arena.expr(receiver).ty;
        match receiver_kind {
            BoundExprKind::Error => self.error_expr(span),
            BoundExprKind::Namespace { namespace } => {
                let qualified = self.qualify(namespace, member);
                if let Some(ty) = self.table.type_named(qualified) {
                    if args.len() == 1 {
                        let target =
                            self.apply_generic_args(ty, generic_args, scope, cx.namespace, span);
                        return self.bind_conversion(cx, scope, target, args[0], span);
                    }
                    let display = self.display(ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E3007)
                            .with_message(format!(
                                "conversion to `{display}` expects exactly one argument"
                            ))
                            .with_label(span, format!("found {}", args.len())),
                    );
                    return self.error_expr(span);
                }
                let ns_name = self.interner.lookup(self.table.namespace(namespace).full_name);
                let member_name = self.name_str(member);
                self.report(
                    Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!(
                            "namespace `{ns_name}` has no method `{member_name}`"
                        ))
                        .with_label(member_span, "unknown method"),
                );
                self.error_expr(span)
            }
            BoundExprKind::NamedType { ty } => match self.table.lookup_method(ty, member) {
                Some(method) => {
                    if !self.table.method(method).is_static() {
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2017)
                                .with_message(format!(
                                    "instance method `{member_name}` cannot be called through a type name"
                                ))
                                .with_label(member_span, "needs an instance"),
                        );
                        return self.error_expr(span);
                    }
                    self.finish_method_call(cx, scope, method, None, generic_args, args, span)
                }
                None => {
                    let display = self.display(ty);
                    let member_name = self.name_str(member);
                    self.report(
                        Diagnostic::error(ErrorCode::E2003)
                            .with_message(format!(
                                "type `{display}` has no method `{member_name}`"
                            ))
                            .with_label(member_span, "unknown method"),
                    );
                    self.error_expr(span)
                }
            },
            _ => {
                if receiver_ty.is_error() {
                    return self.error_expr(span);
                }
                if receiver_ty.is_builtin() {
                    let display = self.display(receiver_ty);
                    self.report(
                        Diagnostic::error(ErrorCode::E2003)
                            .with_message(format!("type `{display}` has no methods"))
                            .with_label(member_span, "builtin type"),
                    );
                    return self.error_expr(span);
                }
                match self.table.lookup_method(receiver_ty, member) {
                    Some(method) => {
                        if self.table.method(method).is_static() {
                            let member_name = self.name_str(member);
                            self.report(
                                Diagnostic::error(ErrorCode::E2016)
                                    .with_message(format!(
                                        "static method `{member_name}` cannot be called through an instance"
                                    ))
                                    .with_label(member_span, "use the type name"),
                            );
                            return self.error_expr(span);
                        }
                        self.finish_method_call(
                            cx,
                            scope,
                            method,
                            Some(receiver),
                            generic_args,
                            args,
                            span,
                        )
                    }
                    None => {
                        let display = self.display(receiver_ty);
                        let member_name = self.name_str(member);
                        self.report(
                            Diagnostic::error(ErrorCode::E2003)
                                .with_message(format!(
                                    "type `{display}` has no method `{member_name}`"
                                ))
                                .with_label(member_span, "unknown method"),
                        );
                        self.error_expr(span)
                    }
                }
            }
        }
    }

    fn finish_method_call(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        method: MethodId,
        receiver: Option<BoundExprId>,
        generic_args: &[TypeExprId],
        args: &[ExprId],
        span: Span,
    ) -> BoundExprId {
        let symbol = self.table.method(method);
        let method_name = symbol.name;
        let params = symbol.params.clone();
        let generic_params = symbol.generic_params.clone();
        let return_type = symbol.return_type;

        if !generic_args.is_empty() {
            let resolved: Vec<TypeId> = generic_args
                .iter()
                .map(|&arg| self.resolve_type_expr(LookupIn::Real, scope, arg, cx.namespace))
                .collect();
            if resolved.len() != generic_params.len() {
                let display = self.name_str(method_name);
                self.report(
                    Diagnostic::error(ErrorCode::E2015)
                        .with_message(format!(
                            "method `{display}` expects {} type argument(s), found {}",
                            generic_params.len(),
                            resolved.len()
                        ))
                        .with_label(span, "wrong number of type arguments"),
                );
            } else {
                for violation in self.table.check_constraints(&generic_params, &resolved) {
                    let argument = self.display(violation.argument);
                    let param = self.display(violation.param);
                    let constraint = self.display(violation.constraint);
                    let arg_span = self.tree.type_expr(generic_args[violation.index]).span;
                    self.report(
                        Diagnostic::error(ErrorCode::E2014)
                            .with_message(format!(
                                "method type argument `{argument}` violates the constraint `{constraint}` of parameter `{param}`"
                            ))
                            .with_label(arg_span, format!("`{argument}` cannot be cast to `{constraint}`")),
                    );
                }
            }
        }

        let bound_args: Vec<BoundExprId> = args
            .iter()
            .map(|&arg| self.bind_expression(cx, scope, arg))
            .collect();
        if bound_args.len() != params.len() {
            let display = self.name_str(method_name);
            self.report(
                Diagnostic::error(ErrorCode::E3007)
                    .with_message(format!(
                        "method `{display}` expects {} argument(s), found {}",
                        params.len(),
                        bound_args.len()
                    ))
                    .with_label(span, "wrong number of arguments"),
            );
            return self.error_expr(span);
        }
        let converted: Vec<BoundExprId> = bound_args
            .into_iter()
            .zip(&params)
            .map(|(arg, param)| self.convert(arg, param.ty))
            .collect();

        self.push_expr(
            BoundExprKind::MethodCall {
                receiver,
                method,
                args: converted,
            },
            return_type,
            span,
        )
    }

    fn bind_conversion(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        target: TypeId,
        arg: ExprId,
        span: Span,
    ) -> BoundExprId {
        let operand = self.bind_expression(cx, scope, arg);
        let from = self.arena.expr(operand).ty;
        if from.is_error() || target.is_error() {
            return self.error_expr(span);
        }
        let conversion = classify_conversion(&self.table, from, target);
        if !conversion.exists() {
            let from_display = self.display(from);
            let to_display = self.display(target);
            self.report(
                Diagnostic::error(ErrorCode::E3001)
                    .with_message(format!(
                        "cannot convert `{from_display}` to `{to_display}`"
                    ))
                    .with_label(span, "no conversion exists"),
            );
            return self.error_expr(span);
        }
        self.push_expr(
            BoundExprKind::Conversion {
                conversion: conversion.kind(),
                operand,
            },
            target,
            span,
        )
    }

    fn bind_new(
        &mut self,
        cx: &mut BodyCx,
        scope: ScopeId,
        ty_expr: TypeExprId,
        args: &[ExprId],
        span: Span,
    ) -> BoundExprId {
        let target = self.resolve_type_expr(LookupIn::Real, scope, ty_expr, cx.namespace);
        if target.is_error() {
            return self.error_expr(span);
        }
        if target.is_builtin() {
            let display = self.display(target);
            self.report(
                Diagnostic::error(ErrorCode::E3010)
                    .with_message(format!("builtin type `{display}` cannot be constructed"))
                    .with_label(span, "not constructible"),
            );
            return self.error_expr(span);
        }
        if self.table.type_data(target).is_type_parameter {
            let display = self.display(target);
            self.report(
                Diagnostic::error(ErrorCode::E3010)
                    .with_message(format!("type parameter `{display}` cannot be constructed"))
                    .with_label(span, "not constructible"),
            );
            return self.error_expr(span);
        }
        for &arg in args {
            let _ = self.bind_expression(cx, scope, arg);
        }
        if !args.is_empty() {
            self.report(
                Diagnostic::error(ErrorCode::E3007)
                    .with_message("constructors take no arguments; fields are default-initialized")
                    .with_label(span, format!("found {} argument(s)", args.len())),
            );
        }
        self.push_expr(BoundExprKind::ObjectCreation, target, span)
    }

    /// Insert an implicit conversion to `target`, or diagnose. Error
    /// types pass through silently so one mistake reports once.
    fn convert(&mut self, expr: BoundExprId, target: TypeId) -> BoundExprId {
        let from = self.arena.expr(expr).ty;
        let span = self.arena.expr(expr).span;
        if from.is_error() || target.is_error() {
            return expr;
        }
        match classify_conversion(&self.table, from, target) {
            Conversion::Identity => expr,
            Conversion::Implicit => self.push_expr(
                BoundExprKind::Conversion {
                    conversion: quill_ir::bound::ConversionKind::Implicit,
                    operand: expr,
                },
                target,
                span,
            ),
            Conversion::Explicit => {
                let from_display = self.display(from);
                let to_display = self.display(target);
                self.report(
                    Diagnostic::error(ErrorCode::E3002)
                        .with_message(format!(
                            "cannot implicitly convert `{from_display}` to `{to_display}`; an explicit conversion exists"
                        ))
                        .with_label(span, format!("consider `{to_display}(...)`")),
                );
                self.error_expr(span)
            }
            Conversion::None => {
                let from_display = self.display(from);
                let to_display = self.display(target);
                self.report(
                    Diagnostic::error(ErrorCode::E3001)
                        .with_message(format!(
                            "cannot convert `{from_display}` to `{to_display}`"
                        ))
                        .with_label(span, "no conversion exists"),
                );
                self.error_expr(span)
            }
        }
    }
}

/// Only assignment and call expressions are legal free-standing
/// statements; error placeholders pass to avoid cascades.
fn is_valid_expression_statement(kind: &BoundExprKind) -> bool {
    matches!(
        kind,
        BoundExprKind::Assignment { .. }
            | BoundExprKind::MemberAssignment { .. }
            | BoundExprKind::MethodCall { .. }
            | BoundExprKind::Error
    )
}
