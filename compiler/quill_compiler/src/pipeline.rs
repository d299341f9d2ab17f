//! The compilation pipeline: bind -> lower -> analyze -> assemble.

use quill_diagnostic::{Diagnostic, DiagnosticBag, ErrorCode};
use quill_flow::ControlFlowGraph;
use quill_ir::bound::LoweredBody;
use quill_ir::syntax::SyntaxTree;
use quill_ir::{BodyId, MethodId, StringInterner};
use quill_types::TypeTable;

use crate::output::BoundProgram;

/// Configuration for a compilation run.
pub struct CompileConfig {
    /// Logical file path, used in diagnostics only (no IO happens here).
    pub file_path: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            file_path: "main.ql".to_string(),
        }
    }
}

/// Compile one syntax tree with the default configuration.
pub fn compile(tree: &SyntaxTree, interner: &StringInterner) -> BoundProgram {
    compile_with_config(tree, interner, &CompileConfig::default())
}

/// Compile one syntax tree.
///
/// Every method body is bound, lowered to flat label/goto form, and run
/// through the control-flow analyses; lowered bodies are attached to
/// their method symbols. Diagnostics from every stage land in one
/// ordered list - binding first, then per-method flow diagnostics in
/// declaration order, then entry-point validation.
pub fn compile_with_config(
    tree: &SyntaxTree,
    interner: &StringInterner,
    config: &CompileConfig,
) -> BoundProgram {
    let result = quill_bind::bind(tree, interner);
    let mut table = result.table;
    let mut arena = result.arena;
    let mut diagnostics = result.diagnostics;

    let mut bodies: Vec<LoweredBody> = Vec::with_capacity(result.bodies.len());
    for (method, body) in result.bodies {
        let lowered = quill_canon::lower_body(&mut arena, body);
        let graph = ControlFlowGraph::build(&arena, &lowered.statements);

        let (return_type, name, name_span) = {
            let symbol = table.method(method);
            (symbol.return_type, symbol.name, symbol.span)
        };
        if !return_type.is_void()
            && !return_type.is_error()
            && !quill_flow::all_paths_return(&graph, &arena)
        {
            let method_name = interner.lookup(name);
            diagnostics.report(
                Diagnostic::error(ErrorCode::E4008)
                    .with_message(format!(
                        "method `{method_name}`: not all code paths return a value"
                    ))
                    .with_label(name_span, "some path reaches the end without `return`"),
            );
        }
        quill_flow::check_definite_assignment(&graph, &lowered, &arena, interner, &mut diagnostics);

        let body_id = BodyId::from_raw(
            u32::try_from(bodies.len()).unwrap_or_else(|_| panic!("body pool overflow")),
        );
        bodies.push(lowered);
        table.attach_body(method, body_id);
    }

    let main = resolve_entry_point(&table, interner, config, &mut diagnostics);

    tracing::debug!(
        bodies = bodies.len(),
        diagnostics = diagnostics.len(),
        has_main = main.is_some(),
        "compilation finished"
    );

    BoundProgram {
        main,
        table,
        arena,
        bodies,
        diagnostics: diagnostics.into_vec(),
    }
}

/// Find and validate the entry point: exactly one static, non-generic,
/// parameterless, void method named `main`.
fn resolve_entry_point(
    table: &TypeTable,
    interner: &StringInterner,
    config: &CompileConfig,
    diagnostics: &mut DiagnosticBag,
) -> Option<MethodId> {
    let main_name = interner.intern("main");
    let candidates: Vec<MethodId> = table
        .methods()
        .filter(|(_, symbol)| symbol.name == main_name)
        .map(|(id, _)| id)
        .collect();

    match candidates.as_slice() {
        [] => {
            diagnostics.report(Diagnostic::error(ErrorCode::E5001).with_message(format!(
                "no `main` method found in {}",
                config.file_path
            )));
            None
        }
        [single] => {
            let symbol = table.method(*single);
            let well_formed = symbol.is_static()
                && symbol.return_type.is_void()
                && symbol.params.is_empty()
                && !symbol.is_generic();
            if well_formed {
                Some(*single)
            } else {
                diagnostics.report(
                    Diagnostic::error(ErrorCode::E5002)
                        .with_message(
                            "`main` must be a static, parameterless method returning no value",
                        )
                        .with_label(symbol.span, "wrong signature for an entry point"),
                );
                None
            }
        }
        many => {
            let mut diagnostic = Diagnostic::error(ErrorCode::E5003)
                .with_message(format!("found {} `main` methods; expected one", many.len()));
            for &candidate in many {
                diagnostic =
                    diagnostic.with_label(table.method(candidate).span, "candidate `main` here");
            }
            diagnostics.report(diagnostic);
            None
        }
    }
}
