use pretty_assertions::assert_eq;

use quill_flow::ControlFlowGraph;
use quill_ir::bound::BoundStmtKind;
use quill_ir::syntax::{
    ClassDecl, MemberId, MethodDecl, ParamDecl, StmtId, TreeBuilder,
};
use quill_ir::{BinaryOp, Name, Span, StringInterner};

use crate::{compile, BoundProgram};

fn sp(n: u32) -> Span {
    Span::new(n, n + 1)
}

fn method_decl(name: Name, body: StmtId) -> MethodDecl {
    MethodDecl {
        name,
        name_span: sp(900),
        is_static: false,
        is_virtual: false,
        is_override: false,
        generic_params: Vec::new(),
        constraints: Vec::new(),
        params: Vec::new(),
        return_ty: None,
        body,
    }
}

fn class_decl(name: Name, members: Vec<MemberId>) -> ClassDecl {
    ClassDecl {
        name,
        name_span: sp(901),
        generic_params: Vec::new(),
        bases: Vec::new(),
        constraints: Vec::new(),
        members,
    }
}

fn static_main(b: &mut TreeBuilder, interner: &StringInterner, stmts: Vec<StmtId>) -> MemberId {
    let body = b.block(stmts, sp(850));
    let mut main = method_decl(interner.intern("main"), body);
    main.is_static = true;
    b.method(main, sp(851))
}

/// One class `App` holding the given members, compiled.
fn compile_app(
    interner: &StringInterner,
    build: impl FnOnce(&mut TreeBuilder, &StringInterner) -> Vec<MemberId>,
) -> BoundProgram {
    let mut b = TreeBuilder::new();
    let members = build(&mut b, interner);
    let app = b.class(class_decl(interner.intern("App"), members), sp(860));
    b.root(app);
    compile(&b.finish(), interner)
}

fn codes(program: &BoundProgram) -> Vec<&'static str> {
    program.diagnostics.iter().map(|d| d.code.as_str()).collect()
}

#[test]
fn minimal_program_compiles_clean() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| vec![static_main(b, i, Vec::new())]);

    assert_eq!(codes(&program), Vec::<&str>::new());
    assert!(!program.has_errors());
    let main = program.main.unwrap();
    let body = program.method_body(main).unwrap();
    assert!(body.statements.is_empty());
    assert_eq!(program.types().count(), 1);
}

#[test]
fn missing_main_is_an_entry_point_error() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        let body = b.block(Vec::new(), sp(0));
        vec![b.method(method_decl(i.intern("run"), body), sp(1))]
    });

    assert_eq!(codes(&program), vec!["E5001"]);
    assert!(program.main.is_none());
}

#[test]
fn instance_main_has_the_wrong_signature() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        let body = b.block(Vec::new(), sp(0));
        vec![b.method(method_decl(i.intern("main"), body), sp(1))]
    });

    assert_eq!(codes(&program), vec!["E5002"]);
    assert!(program.main.is_none());
}

#[test]
fn duplicate_main_across_classes_is_rejected() {
    let interner = StringInterner::new();
    let mut b = TreeBuilder::new();
    let first_main = static_main(&mut b, &interner, Vec::new());
    let first = b.class(class_decl(interner.intern("A"), vec![first_main]), sp(0));
    let second_main = static_main(&mut b, &interner, Vec::new());
    let second = b.class(class_decl(interner.intern("B"), vec![second_main]), sp(1));
    b.root(first);
    b.root(second);
    let program = compile(&b.finish(), &interner);

    assert_eq!(codes(&program), vec!["E5003"]);
    assert!(program.main.is_none());
}

#[test]
fn missing_return_path_is_flagged_once() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        // def half(p: bool): int { if (p) { return 1; } }
        let bool_ty = b.named_type(i.intern("bool"), sp(0));
        let int_ty = b.named_type(i.intern("int"), sp(1));
        let p_ref = b.name(i.intern("p"), sp(2));
        let one = b.int(1, sp(3));
        let ret = b.return_stmt(Some(one), sp(4));
        let then_block = b.block(vec![ret], sp(5));
        let if_stmt = b.if_stmt(p_ref, then_block, None, sp(6));
        let body = b.block(vec![if_stmt], sp(7));
        let mut half = method_decl(i.intern("half"), body);
        half.params = vec![ParamDecl {
            name: i.intern("p"),
            span: sp(8),
            ty: bool_ty,
        }];
        half.return_ty = Some(int_ty);
        let half = b.method(half, sp(9));
        vec![half, static_main(b, i, Vec::new())]
    });

    assert_eq!(codes(&program), vec!["E4008"]);
}

#[test]
fn full_return_coverage_is_clean() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        // def pick(p: bool): int { if (p) { return 1; } else { return 2; } }
        let bool_ty = b.named_type(i.intern("bool"), sp(0));
        let int_ty = b.named_type(i.intern("int"), sp(1));
        let p_ref = b.name(i.intern("p"), sp(2));
        let one = b.int(1, sp(3));
        let ret_one = b.return_stmt(Some(one), sp(4));
        let then_block = b.block(vec![ret_one], sp(5));
        let two = b.int(2, sp(6));
        let ret_two = b.return_stmt(Some(two), sp(7));
        let else_block = b.block(vec![ret_two], sp(8));
        let if_stmt = b.if_stmt(p_ref, then_block, Some(else_block), sp(9));
        let body = b.block(vec![if_stmt], sp(10));
        let mut pick = method_decl(i.intern("pick"), body);
        pick.params = vec![ParamDecl {
            name: i.intern("p"),
            span: sp(11),
            ty: bool_ty,
        }];
        pick.return_ty = Some(int_ty);
        let pick = b.method(pick, sp(12));
        vec![pick, static_main(b, i, Vec::new())]
    });

    assert_eq!(codes(&program), Vec::<&str>::new());
}

#[test]
fn dead_branch_is_exempt_but_live_read_is_flagged() {
    // var a: int; if (false) { a = 1; } var b = a;
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        let a = i.intern("a");
        let int_ty = b.named_type(i.intern("int"), sp(0));
        let decl_a = b.var_decl(a, sp(1), Some(int_ty), None, sp(2));
        let cond = b.bool_lit(false, sp(3));
        let a_tgt = b.name(a, sp(4));
        let one = b.int(1, sp(5));
        let assign = b.assign(a_tgt, one, sp(6));
        let assign_stmt = b.expr_stmt(assign, sp(7));
        let then_block = b.block(vec![assign_stmt], sp(8));
        let if_stmt = b.if_stmt(cond, then_block, None, sp(9));
        let a_ref = b.name(a, sp(10));
        let decl_b = b.var_decl(i.intern("b"), sp(11), None, Some(a_ref), sp(12));
        vec![static_main(b, i, vec![decl_a, if_stmt, decl_b])]
    });

    assert_eq!(codes(&program), vec!["E4009"]);
    // The single diagnostic points at the live read, not the dead branch.
    let span = program.diagnostics[0].primary_span().unwrap();
    assert_eq!(span, sp(10));
}

#[test]
fn for_loop_lowers_flat_with_one_back_edge() {
    let interner = StringInterner::new();
    let program = compile_app(&interner, |b, i| {
        // for (var j = 0; j < 3; j = j + 1) {}
        let j = i.intern("j");
        let zero = b.int(0, sp(0));
        let init = b.var_decl(j, sp(1), None, Some(zero), sp(2));
        let j_ref = b.name(j, sp(3));
        let three = b.int(3, sp(4));
        let cond = b.binary(BinaryOp::Lt, j_ref, three, sp(5));
        let j_read = b.name(j, sp(6));
        let one = b.int(1, sp(7));
        let bump = b.binary(BinaryOp::Add, j_read, one, sp(8));
        let j_tgt = b.name(j, sp(9));
        let assign = b.assign(j_tgt, bump, sp(10));
        let mutation = b.expr_stmt(assign, sp(11));
        let loop_body = b.block(Vec::new(), sp(12));
        let for_stmt = b.for_stmt(init, cond, mutation, loop_body, sp(13));
        vec![static_main(b, i, vec![for_stmt])]
    });

    assert_eq!(codes(&program), Vec::<&str>::new());
    let main = program.main.unwrap();
    let body = program.method_body(main).unwrap();

    // Nothing structured survives lowering.
    for &stmt in &body.statements {
        assert!(
            !matches!(
                program.arena.stmt(stmt).kind,
                BoundStmtKind::Block(_)
                    | BoundStmtKind::If { .. }
                    | BoundStmtKind::While { .. }
                    | BoundStmtKind::For { .. }
            ),
            "structured statement survived lowering"
        );
    }

    // Exactly one loop back-edge.
    let graph = ControlFlowGraph::build(&program.arena, &body.statements);
    let back_edges: usize = graph
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| block.successors.iter().filter(|&&succ| succ <= index).count())
        .sum();
    assert_eq!(back_edges, 1);
}

#[test]
fn diagnostics_are_deterministic() {
    let interner = StringInterner::new();
    let build = || {
        let mut b = TreeBuilder::new();
        // A binder error, a flow error, and a missing entry point.
        let x_ref = b.name(interner.intern("missing"), sp(0));
        let decl = b.var_decl(interner.intern("x"), sp(1), None, Some(x_ref), sp(2));
        let int_ty = b.named_type(interner.intern("int"), sp(3));
        let decl_a = b.var_decl(interner.intern("a"), sp(4), Some(int_ty), None, sp(5));
        let a_ref = b.name(interner.intern("a"), sp(6));
        let decl_b = b.var_decl(interner.intern("b"), sp(7), None, Some(a_ref), sp(8));
        let body = b.block(vec![decl, decl_a, decl_b], sp(9));
        let run = b.method(method_decl(interner.intern("run"), body), sp(10));
        let app = b.class(class_decl(interner.intern("App"), vec![run]), sp(11));
        b.root(app);
        b.finish()
    };

    let render = |program: &BoundProgram| {
        program
            .diagnostics
            .iter()
            .map(|d| format!("{d}"))
            .collect::<Vec<_>>()
    };

    let first = compile(&build(), &interner);
    let second = compile(&build(), &interner);
    assert_eq!(render(&first), render(&second));
    assert_eq!(codes(&first), vec!["E2001", "E4009", "E5001"]);
}
