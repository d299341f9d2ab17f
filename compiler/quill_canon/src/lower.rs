//! The lowering rewriter.

use quill_ir::bound::{
    BoundArena, BoundBody, BoundStmt, BoundStmtId, BoundStmtKind, LoweredBody,
};
use quill_ir::Span;

/// Lower one bound method body into a flat statement list.
pub fn lower_body(arena: &mut BoundArena, body: BoundBody) -> LoweredBody {
    let root = lower_stmt(arena, body.root);
    let statements = flatten(arena, root);

    tracing::debug!(
        method = body.method.raw(),
        statements = statements.len(),
        "lowered method body"
    );

    LoweredBody {
        method: body.method,
        locals: body.locals,
        statements,
    }
}

/// Rewrite one statement; recursively applied until no structured
/// construct remains. Every rewrite produces only block, goto,
/// conditional-goto, and label statements around the unchanged leaves.
fn lower_stmt(arena: &mut BoundArena, id: BoundStmtId) -> BoundStmtId {
    let span = arena.stmt(id).span;
    match arena.stmt(id).kind.clone() {
        BoundStmtKind::Block(children) => {
            let lowered: Vec<BoundStmtId> =
                children.iter().map(|&child| lower_stmt(arena, child)).collect();
            if lowered == children {
                id
            } else {
                arena.push_stmt(BoundStmt {
                    kind: BoundStmtKind::Block(lowered),
                    span,
                })
            }
        }

        BoundStmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let rewritten = match else_branch {
                // if c then T
                //   -> gotoFalse c end; T; end:
                None => {
                    let end_label = arena.new_label("end");
                    let goto_end = push(
                        arena,
                        BoundStmtKind::ConditionalGoto {
                            label: end_label,
                            condition,
                            jump_if: false,
                        },
                        span,
                    );
                    let end = push(arena, BoundStmtKind::Label(end_label), span);
                    push(
                        arena,
                        BoundStmtKind::Block(vec![goto_end, then_branch, end]),
                        span,
                    )
                }
                // if c then T else E
                //   -> gotoFalse c else; T; goto end; else:; E; end:
                Some(else_branch) => {
                    let else_label = arena.new_label("else");
                    let end_label = arena.new_label("end");
                    let goto_else = push(
                        arena,
                        BoundStmtKind::ConditionalGoto {
                            label: else_label,
                            condition,
                            jump_if: false,
                        },
                        span,
                    );
                    let goto_end = push(arena, BoundStmtKind::Goto(end_label), span);
                    let else_mark = push(arena, BoundStmtKind::Label(else_label), span);
                    let end_mark = push(arena, BoundStmtKind::Label(end_label), span);
                    push(
                        arena,
                        BoundStmtKind::Block(vec![
                            goto_else,
                            then_branch,
                            goto_end,
                            else_mark,
                            else_branch,
                            end_mark,
                        ]),
                        span,
                    )
                }
            };
            lower_stmt(arena, rewritten)
        }

        // while c { B }
        //   -> goto continue; body:; B; continue:; gotoTrue c body; break:
        //
        // The loop's own break/continue labels are reused, so gotos bound
        // from `break`/`continue` statements already point at the right
        // targets.
        BoundStmtKind::While {
            condition,
            body,
            break_label,
            continue_label,
        } => {
            let body_label = arena.new_label("body");
            let goto_continue = push(arena, BoundStmtKind::Goto(continue_label), span);
            let body_mark = push(arena, BoundStmtKind::Label(body_label), span);
            let continue_mark = push(arena, BoundStmtKind::Label(continue_label), span);
            let loop_back = push(
                arena,
                BoundStmtKind::ConditionalGoto {
                    label: body_label,
                    condition,
                    jump_if: true,
                },
                span,
            );
            let break_mark = push(arena, BoundStmtKind::Label(break_label), span);
            let rewritten = push(
                arena,
                BoundStmtKind::Block(vec![
                    goto_continue,
                    body_mark,
                    body,
                    continue_mark,
                    loop_back,
                    break_mark,
                ]),
                span,
            );
            lower_stmt(arena, rewritten)
        }

        // for (init; c; M) { B }
        //   -> { init; while c { B; continue:; M } }
        //
        // The for's break label becomes the while's break label and its
        // continue label lands just before the mutation, so `continue`
        // still runs M. The while gets a fresh, unreferenced continue
        // label of its own.
        BoundStmtKind::For {
            initializer,
            condition,
            mutation,
            body,
            break_label,
            continue_label,
        } => {
            let continue_mark = push(arena, BoundStmtKind::Label(continue_label), span);
            let while_body = push(
                arena,
                BoundStmtKind::Block(vec![body, continue_mark, mutation]),
                span,
            );
            let while_continue = arena.new_label("continue");
            let while_stmt = push(
                arena,
                BoundStmtKind::While {
                    condition,
                    body: while_body,
                    break_label,
                    continue_label: while_continue,
                },
                span,
            );
            let rewritten = push(
                arena,
                BoundStmtKind::Block(vec![initializer, while_stmt]),
                span,
            );
            lower_stmt(arena, rewritten)
        }

        // Leaves are already flat.
        BoundStmtKind::Expression(_)
        | BoundStmtKind::VariableDeclaration { .. }
        | BoundStmtKind::Label(_)
        | BoundStmtKind::Goto(_)
        | BoundStmtKind::ConditionalGoto { .. }
        | BoundStmtKind::Return(_) => id,
    }
}

fn push(arena: &mut BoundArena, kind: BoundStmtKind, span: Span) -> BoundStmtId {
    arena.push_stmt(BoundStmt { kind, span })
}

/// Collapse nested blocks into one linear sequence, depth-first and
/// order-preserving.
fn flatten(arena: &BoundArena, root: BoundStmtId) -> Vec<BoundStmtId> {
    let mut statements = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        match &arena.stmt(id).kind {
            BoundStmtKind::Block(children) => {
                for &child in children.iter().rev() {
                    stack.push(child);
                }
            }
            _ => statements.push(id),
        }
    }
    statements
}
