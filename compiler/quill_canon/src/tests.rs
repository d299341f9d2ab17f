use pretty_assertions::assert_eq;

use quill_ir::bound::{
    BoundArena, BoundBody, BoundExpr, BoundExprId, BoundExprKind, BoundStmt, BoundStmtId,
    BoundStmtKind, LabelId, Literal, LoweredBody,
};
use quill_ir::{MethodId, Span, TypeId};

use crate::lower_body;

fn sp(n: u32) -> Span {
    Span::new(n, n + 1)
}

fn bool_literal(arena: &mut BoundArena, value: bool) -> BoundExprId {
    arena.push_expr(BoundExpr {
        kind: BoundExprKind::Literal(Literal::Bool(value)),
        ty: TypeId::BOOL,
        span: sp(0),
    })
}

fn int_statement(arena: &mut BoundArena, value: i64) -> BoundStmtId {
    let expr = arena.push_expr(BoundExpr {
        kind: BoundExprKind::Literal(Literal::Int(value)),
        ty: TypeId::INT,
        span: sp(1),
    });
    arena.push_stmt(BoundStmt {
        kind: BoundStmtKind::Expression(expr),
        span: sp(1),
    })
}

fn stmt(arena: &mut BoundArena, kind: BoundStmtKind) -> BoundStmtId {
    arena.push_stmt(BoundStmt { kind, span: sp(2) })
}

fn lower(arena: &mut BoundArena, root: BoundStmtId) -> LoweredBody {
    lower_body(
        arena,
        BoundBody {
            method: MethodId::from_raw(0),
            locals: Vec::new(),
            root,
        },
    )
}

/// Shorthand for asserting the shape of a lowered statement list.
#[derive(Debug, PartialEq, Eq)]
enum Shape {
    Expr,
    Goto(LabelId),
    GotoIf(LabelId, bool),
    Mark(LabelId),
    Return,
}

fn shape(arena: &BoundArena, body: &LoweredBody) -> Vec<Shape> {
    body.statements
        .iter()
        .map(|&id| match &arena.stmt(id).kind {
            BoundStmtKind::Expression(_) | BoundStmtKind::VariableDeclaration { .. } => Shape::Expr,
            BoundStmtKind::Goto(label) => Shape::Goto(*label),
            BoundStmtKind::ConditionalGoto { label, jump_if, .. } => Shape::GotoIf(*label, *jump_if),
            BoundStmtKind::Label(label) => Shape::Mark(*label),
            BoundStmtKind::Return(_) => Shape::Return,
            structured => panic!("structured statement survived lowering: {structured:?}"),
        })
        .collect()
}

#[test]
fn if_without_else_lowers_to_goto_false() {
    let mut arena = BoundArena::new();
    let condition = bool_literal(&mut arena, true);
    let then_branch = int_statement(&mut arena, 1);
    let root = stmt(
        &mut arena,
        BoundStmtKind::If {
            condition,
            then_branch,
            else_branch: None,
        },
    );

    let body = lower(&mut arena, root);
    let shapes = shape(&arena, &body);
    let Shape::GotoIf(end, false) = shapes[0] else {
        panic!("expected a goto-on-false first, got {shapes:?}");
    };
    assert_eq!(shapes, vec![Shape::GotoIf(end, false), Shape::Expr, Shape::Mark(end)]);
}

#[test]
fn if_with_else_lowers_to_two_labels() {
    let mut arena = BoundArena::new();
    let condition = bool_literal(&mut arena, true);
    let then_branch = int_statement(&mut arena, 1);
    let else_branch = int_statement(&mut arena, 2);
    let root = stmt(
        &mut arena,
        BoundStmtKind::If {
            condition,
            then_branch,
            else_branch: Some(else_branch),
        },
    );

    let body = lower(&mut arena, root);
    let shapes = shape(&arena, &body);
    let Shape::GotoIf(else_label, false) = shapes[0] else {
        panic!("expected a goto-on-false first, got {shapes:?}");
    };
    let Shape::Goto(end_label) = shapes[2] else {
        panic!("expected a goto after the then-branch, got {shapes:?}");
    };
    assert_eq!(
        shapes,
        vec![
            Shape::GotoIf(else_label, false),
            Shape::Expr,
            Shape::Goto(end_label),
            Shape::Mark(else_label),
            Shape::Expr,
            Shape::Mark(end_label),
        ]
    );
}

#[test]
fn while_reuses_its_break_and_continue_labels() {
    let mut arena = BoundArena::new();
    let break_label = arena.new_label("break");
    let continue_label = arena.new_label("continue");
    let condition = bool_literal(&mut arena, true);
    let body_stmt = int_statement(&mut arena, 1);
    let root = stmt(
        &mut arena,
        BoundStmtKind::While {
            condition,
            body: body_stmt,
            break_label,
            continue_label,
        },
    );

    let body = lower(&mut arena, root);
    let shapes = shape(&arena, &body);
    let Shape::Mark(body_label) = shapes[1] else {
        panic!("expected the body label second, got {shapes:?}");
    };
    assert_eq!(
        shapes,
        vec![
            Shape::Goto(continue_label),
            Shape::Mark(body_label),
            Shape::Expr,
            Shape::Mark(continue_label),
            Shape::GotoIf(body_label, true),
            Shape::Mark(break_label),
        ]
    );
}

#[test]
fn for_keeps_label_identities_and_runs_mutation_on_continue() {
    let mut arena = BoundArena::new();
    let break_label = arena.new_label("break");
    let continue_label = arena.new_label("continue");
    let initializer = int_statement(&mut arena, 0);
    let condition = bool_literal(&mut arena, true);
    let mutation = int_statement(&mut arena, 1);
    // The body `continue`s, referencing the for's continue label.
    let continue_goto = stmt(&mut arena, BoundStmtKind::Goto(continue_label));
    let root = stmt(
        &mut arena,
        BoundStmtKind::For {
            initializer,
            condition,
            mutation,
            body: continue_goto,
            break_label,
            continue_label,
        },
    );

    let body = lower(&mut arena, root);
    let shapes = shape(&arena, &body);
    let Shape::Goto(while_continue) = shapes[1] else {
        panic!("expected the while-entry goto second, got {shapes:?}");
    };
    let Shape::Mark(body_label) = shapes[2] else {
        panic!("expected the body label third, got {shapes:?}");
    };
    // init; goto check; body:; goto for-continue; for-continue:; mutation;
    // check:; gotoTrue body; break:
    assert_eq!(
        shapes,
        vec![
            Shape::Expr,
            Shape::Goto(while_continue),
            Shape::Mark(body_label),
            Shape::Goto(continue_label),
            Shape::Mark(continue_label),
            Shape::Expr,
            Shape::Mark(while_continue),
            Shape::GotoIf(body_label, true),
            Shape::Mark(break_label),
        ]
    );
    // The for's own labels survive into the lowered form.
    assert_ne!(while_continue, continue_label);
}

#[test]
fn nested_blocks_flatten_in_order() {
    let mut arena = BoundArena::new();
    let first = int_statement(&mut arena, 1);
    let second = int_statement(&mut arena, 2);
    let third = int_statement(&mut arena, 3);
    let inner = stmt(&mut arena, BoundStmtKind::Block(vec![second, third]));
    let ret = stmt(&mut arena, BoundStmtKind::Return(None));
    let outer = stmt(&mut arena, BoundStmtKind::Block(vec![first, inner, ret]));

    let body = lower(&mut arena, outer);
    assert_eq!(body.statements, vec![first, second, third, ret]);
}

#[test]
fn leaves_are_not_rewritten() {
    let mut arena = BoundArena::new();
    let ret = stmt(&mut arena, BoundStmtKind::Return(None));
    let root = stmt(&mut arena, BoundStmtKind::Block(vec![ret]));
    let before = arena.stmt_count();

    let body = lower(&mut arena, root);
    // Nothing structured: no new statements were pushed.
    assert_eq!(arena.stmt_count(), before);
    assert_eq!(body.statements, vec![ret]);
}
