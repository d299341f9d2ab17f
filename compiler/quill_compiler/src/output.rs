//! The bound program handed to the evaluator and emitter.

use quill_diagnostic::Diagnostic;
use quill_ir::bound::{BoundArena, LoweredBody};
use quill_ir::{MethodId, TypeId};
use quill_types::TypeTable;

/// Result of semantic analysis for one compilation unit.
///
/// A program with any error diagnostic must not be evaluated or emitted;
/// `has_errors` is the gate.
pub struct BoundProgram {
    /// The validated entry point, when one exists.
    pub main: Option<MethodId>,
    /// The flat type-symbol table with attached lowered method bodies.
    pub table: TypeTable,
    /// Arena holding every bound node of the program.
    pub arena: BoundArena,
    pub(crate) bodies: Vec<LoweredBody>,
    /// Every diagnostic of the compilation, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

impl BoundProgram {
    /// Check if any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// The lowered body attached to a method, if it has one.
    pub fn method_body(&self, method: MethodId) -> Option<&LoweredBody> {
        self.table
            .method(method)
            .body
            .map(|id| &self.bodies[id.index()])
    }

    /// Program-level type symbols: declared classes and their
    /// instantiations.
    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.table.declared_types()
    }
}
