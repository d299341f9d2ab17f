use pretty_assertions::assert_eq;

use quill_canon::lower_body;
use quill_diagnostic::DiagnosticBag;
use quill_ir::bound::{
    BoundArena, BoundBody, BoundExpr, BoundExprId, BoundExprKind, BoundStmt, BoundStmtId,
    BoundStmtKind, Literal, LocalId, LocalKind, LoweredBody, VariableSymbol,
};
use quill_ir::{MethodId, Name, Span, StringInterner, TypeId};

use crate::{all_paths_return, check_definite_assignment, ControlFlowGraph};

fn sp(n: u32) -> Span {
    Span::new(n, n + 1)
}

struct BodyFixture {
    arena: BoundArena,
    locals: Vec<VariableSymbol>,
}

impl BodyFixture {
    fn new() -> Self {
        BodyFixture {
            arena: BoundArena::new(),
            locals: Vec::new(),
        }
    }

    fn local(&mut self, name: Name, kind: LocalKind) -> LocalId {
        let id = LocalId::from_raw(self.locals.len() as u32);
        self.locals.push(VariableSymbol {
            name,
            ty: TypeId::INT,
            readonly: false,
            kind,
        });
        id
    }

    fn int(&mut self, value: i64) -> BoundExprId {
        self.arena.push_expr(BoundExpr {
            kind: BoundExprKind::Literal(Literal::Int(value)),
            ty: TypeId::INT,
            span: sp(0),
        })
    }

    fn bool_lit(&mut self, value: bool) -> BoundExprId {
        self.arena.push_expr(BoundExpr {
            kind: BoundExprKind::Literal(Literal::Bool(value)),
            ty: TypeId::BOOL,
            span: sp(1),
        })
    }

    fn read(&mut self, local: LocalId, span: Span) -> BoundExprId {
        self.arena.push_expr(BoundExpr {
            kind: BoundExprKind::Variable { local },
            ty: TypeId::INT,
            span,
        })
    }

    fn assign(&mut self, local: LocalId, value: BoundExprId) -> BoundStmtId {
        let expr = self.arena.push_expr(BoundExpr {
            kind: BoundExprKind::Assignment { local, value },
            ty: TypeId::INT,
            span: sp(2),
        });
        self.stmt(BoundStmtKind::Expression(expr))
    }

    fn stmt(&mut self, kind: BoundStmtKind) -> BoundStmtId {
        self.arena.push_stmt(BoundStmt { kind, span: sp(3) })
    }

    fn declare(&mut self, local: LocalId, initializer: Option<BoundExprId>) -> BoundStmtId {
        self.stmt(BoundStmtKind::VariableDeclaration { local, initializer })
    }

    fn finish(mut self, stmts: Vec<BoundStmtId>) -> (BoundArena, LoweredBody) {
        let root = self.stmt(BoundStmtKind::Block(stmts));
        let body = BoundBody {
            method: MethodId::from_raw(0),
            locals: self.locals,
            root,
        };
        let lowered = lower_body(&mut self.arena, body);
        (self.arena, lowered)
    }
}

fn assignment_codes(arena: &BoundArena, body: &LoweredBody) -> Vec<String> {
    let interner = StringInterner::new();
    // The fixtures fabricate local names with `Name::from_raw(..)` far
    // beyond the pre-interned builtins; intern placeholder strings so the
    // reporter's name lookup for those indices resolves instead of
    // tripping the interner's out-of-bounds panic contract.
    while interner.len() <= 101 {
        interner.intern(&format!("local{}", interner.len()));
    }
    let graph = ControlFlowGraph::build(arena, &body.statements);
    let mut bag = DiagnosticBag::new();
    check_definite_assignment(&graph, body, arena, &interner, &mut bag);
    bag.iter().map(|d| d.code.as_str().to_owned()).collect()
}

#[test]
fn empty_body_does_not_return_on_all_paths() {
    let fixture = BodyFixture::new();
    let (arena, body) = fixture.finish(Vec::new());
    let graph = ControlFlowGraph::build(&arena, &body.statements);
    assert!(!all_paths_return(&graph, &arena));
}

#[test]
fn single_return_covers_all_paths() {
    let mut fixture = BodyFixture::new();
    let value = fixture.int(1);
    let ret = fixture.stmt(BoundStmtKind::Return(Some(value)));
    let (arena, body) = fixture.finish(vec![ret]);
    let graph = ControlFlowGraph::build(&arena, &body.statements);
    assert!(all_paths_return(&graph, &arena));
}

#[test]
fn if_with_one_returning_branch_misses_a_path() {
    // The condition reads a parameter so neither edge is pruned.
    let mut fixture = BodyFixture::new();
    let param = fixture.local(Name::from_raw(100), LocalKind::Parameter);
    let cond_read = fixture.read(param, sp(4));
    let value = fixture.int(1);
    let then_ret = fixture.stmt(BoundStmtKind::Return(Some(value)));
    let if_stmt = fixture.stmt(BoundStmtKind::If {
        condition: cond_read,
        then_branch: then_ret,
        else_branch: None,
    });
    let (arena, body) = fixture.finish(vec![if_stmt]);
    let graph = ControlFlowGraph::build(&arena, &body.statements);
    assert!(!all_paths_return(&graph, &arena));
}

#[test]
fn if_with_both_branches_returning_covers_all_paths() {
    let mut fixture = BodyFixture::new();
    let param = fixture.local(Name::from_raw(100), LocalKind::Parameter);
    let cond_read = fixture.read(param, sp(4));
    let one = fixture.int(1);
    let then_ret = fixture.stmt(BoundStmtKind::Return(Some(one)));
    let two = fixture.int(2);
    let else_ret = fixture.stmt(BoundStmtKind::Return(Some(two)));
    let if_stmt = fixture.stmt(BoundStmtKind::If {
        condition: cond_read,
        then_branch: then_ret,
        else_branch: Some(else_ret),
    });
    let (arena, body) = fixture.finish(vec![if_stmt]);
    let graph = ControlFlowGraph::build(&arena, &body.statements);
    assert!(all_paths_return(&graph, &arena));
}

#[test]
fn infinite_loop_vacuously_returns() {
    let mut fixture = BodyFixture::new();
    let break_label = fixture.arena.new_label("break");
    let continue_label = fixture.arena.new_label("continue");
    let condition = fixture.bool_lit(true);
    let body_stmt = fixture.stmt(BoundStmtKind::Block(Vec::new()));
    let while_stmt = fixture.stmt(BoundStmtKind::While {
        condition,
        body: body_stmt,
        break_label,
        continue_label,
    });
    let (arena, body) = fixture.finish(vec![while_stmt]);
    let graph = ControlFlowGraph::build(&arena, &body.statements);
    // `while (true) {}` with no break: the only exit (after the break
    // label) is unreachable thanks to constant-condition pruning.
    assert!(all_paths_return(&graph, &arena));
}

#[test]
fn dead_branch_assignment_is_ignored_but_read_is_flagged() {
    // var a: int; if (false) { a = 1; } var b = a;
    let mut fixture = BodyFixture::new();
    let a = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let b = fixture.local(Name::from_raw(101), LocalKind::Variable);
    let decl_a = fixture.declare(a, None);
    let condition = fixture.bool_lit(false);
    let one = fixture.int(1);
    let assign_a = fixture.assign(a, one);
    let if_stmt = fixture.stmt(BoundStmtKind::If {
        condition,
        then_branch: assign_a,
        else_branch: None,
    });
    let read_a = fixture.read(a, sp(40));
    let decl_b = fixture.declare(b, Some(read_a));
    let (arena, body) = fixture.finish(vec![decl_a, if_stmt, decl_b]);

    // Exactly one diagnostic: the final read. The dead assignment inside
    // `if (false)` neither helps nor is itself flagged.
    assert_eq!(assignment_codes(&arena, &body), vec!["E4009"]);
}

#[test]
fn assignment_on_every_path_satisfies_the_read() {
    // var a: int; if (p) { a = 1; } else { a = 2; } var b = a;
    let mut fixture = BodyFixture::new();
    let p = fixture.local(Name::from_raw(99), LocalKind::Parameter);
    let a = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let b = fixture.local(Name::from_raw(101), LocalKind::Variable);
    let decl_a = fixture.declare(a, None);
    let cond = fixture.read(p, sp(4));
    let one = fixture.int(1);
    let assign_then = fixture.assign(a, one);
    let two = fixture.int(2);
    let assign_else = fixture.assign(a, two);
    let if_stmt = fixture.stmt(BoundStmtKind::If {
        condition: cond,
        then_branch: assign_then,
        else_branch: Some(assign_else),
    });
    let read_a = fixture.read(a, sp(41));
    let decl_b = fixture.declare(b, Some(read_a));
    let (arena, body) = fixture.finish(vec![decl_a, if_stmt, decl_b]);

    assert_eq!(assignment_codes(&arena, &body), Vec::<String>::new());
}

#[test]
fn one_sided_assignment_is_flagged_at_the_read() {
    // var a: int; if (p) { a = 1; } var b = a;
    let mut fixture = BodyFixture::new();
    let p = fixture.local(Name::from_raw(99), LocalKind::Parameter);
    let a = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let b = fixture.local(Name::from_raw(101), LocalKind::Variable);
    let decl_a = fixture.declare(a, None);
    let cond = fixture.read(p, sp(4));
    let one = fixture.int(1);
    let assign_then = fixture.assign(a, one);
    let if_stmt = fixture.stmt(BoundStmtKind::If {
        condition: cond,
        then_branch: assign_then,
        else_branch: None,
    });
    let read_a = fixture.read(a, sp(42));
    let decl_b = fixture.declare(b, Some(read_a));
    let (arena, body) = fixture.finish(vec![decl_a, if_stmt, decl_b]);

    assert_eq!(assignment_codes(&arena, &body), vec!["E4009"]);
}

#[test]
fn declaration_with_initializer_assigns() {
    let mut fixture = BodyFixture::new();
    let a = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let b = fixture.local(Name::from_raw(101), LocalKind::Variable);
    let one = fixture.int(1);
    let decl_a = fixture.declare(a, Some(one));
    let read_a = fixture.read(a, sp(43));
    let decl_b = fixture.declare(b, Some(read_a));
    let (arena, body) = fixture.finish(vec![decl_a, decl_b]);

    assert_eq!(assignment_codes(&arena, &body), Vec::<String>::new());
}

#[test]
fn loop_body_assignment_does_not_satisfy_a_later_read() {
    // var a: int; while (p) { a = 1; } var b = a;
    // The loop may run zero times.
    let mut fixture = BodyFixture::new();
    let p = fixture.local(Name::from_raw(99), LocalKind::Parameter);
    let a = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let b = fixture.local(Name::from_raw(101), LocalKind::Variable);
    let decl_a = fixture.declare(a, None);
    let cond = fixture.read(p, sp(4));
    let one = fixture.int(1);
    let assign_a = fixture.assign(a, one);
    let break_label = fixture.arena.new_label("break");
    let continue_label = fixture.arena.new_label("continue");
    let while_stmt = fixture.stmt(BoundStmtKind::While {
        condition: cond,
        body: assign_a,
        break_label,
        continue_label,
    });
    let read_a = fixture.read(a, sp(44));
    let decl_b = fixture.declare(b, Some(read_a));
    let (arena, body) = fixture.finish(vec![decl_a, while_stmt, decl_b]);

    assert_eq!(assignment_codes(&arena, &body), vec!["E4009"]);
}

#[test]
fn for_loop_has_exactly_one_back_edge() {
    // for (var i = 0; p; i = i + 1) {}  -- condition reads a parameter so
    // no edge is pruned.
    let mut fixture = BodyFixture::new();
    let p = fixture.local(Name::from_raw(99), LocalKind::Parameter);
    let i = fixture.local(Name::from_raw(100), LocalKind::Variable);
    let zero = fixture.int(0);
    let init = fixture.declare(i, Some(zero));
    let cond = fixture.read(p, sp(4));
    let i_read = fixture.read(i, sp(5));
    let one = fixture.int(1);
    let sum = fixture.arena.push_expr(BoundExpr {
        kind: BoundExprKind::Binary {
            op: quill_ir::BinaryOp::Add,
            left: i_read,
            right: one,
        },
        ty: TypeId::INT,
        span: sp(6),
    });
    let mutation = fixture.assign(i, sum);
    let loop_body = fixture.stmt(BoundStmtKind::Block(Vec::new()));
    let break_label = fixture.arena.new_label("break");
    let continue_label = fixture.arena.new_label("continue");
    let for_stmt = fixture.stmt(BoundStmtKind::For {
        initializer: init,
        condition: cond,
        mutation,
        body: loop_body,
        break_label,
        continue_label,
    });
    let (arena, body) = fixture.finish(vec![for_stmt]);
    let graph = ControlFlowGraph::build(&arena, &body.statements);

    let back_edges: usize = graph
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| block.successors.iter().filter(|&&succ| succ <= index).count())
        .sum();
    assert_eq!(back_edges, 1);

    // And the loop's definite assignment is clean: `i` is assigned by the
    // initializer before the mutation reads it.
    assert_eq!(assignment_codes(&arena, &body), Vec::<String>::new());
}
