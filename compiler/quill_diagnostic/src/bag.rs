//! Append-only diagnostic accumulator.
//!
//! One bag is shared across every binder and analysis stage of a
//! compilation. It preserves report order exactly: no deduplication, no
//! sorting, no suppression - a stage may never remove or reorder another
//! stage's diagnostics, and binding the same tree twice must yield an
//! identical diagnostic list.

use crate::Diagnostic;

/// Order-preserving, append-only collection of diagnostics.
#[derive(Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic of another bag, preserving its order.
    pub fn absorb(&mut self, other: DiagnosticBag) {
        self.error_count += other.error_count;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Iterate diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics collected.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Check if any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Consume the bag, yielding diagnostics in report order.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use quill_ir::Span;

    fn diag(code: ErrorCode, msg: &str) -> Diagnostic {
        Diagnostic::error(code)
            .with_message(msg)
            .with_label(Span::new(0, 1), "here")
    }

    #[test]
    fn preserves_report_order() {
        let mut bag = DiagnosticBag::new();
        bag.report(diag(ErrorCode::E2001, "first"));
        bag.report(diag(ErrorCode::E3001, "second"));
        bag.report(diag(ErrorCode::E2001, "first")); // identical: not deduplicated
        let messages: Vec<_> = bag.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "first"]);
        assert_eq!(bag.error_count(), 3);
    }

    #[test]
    fn absorb_appends_in_order() {
        let mut a = DiagnosticBag::new();
        a.report(diag(ErrorCode::E2001, "a"));
        let mut b = DiagnosticBag::new();
        b.report(diag(ErrorCode::E2002, "b"));
        b.report(diag(ErrorCode::E2003, "c"));
        a.absorb(b);
        let messages: Vec<_> = a.into_vec().into_iter().map(|d| d.message).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut bag = DiagnosticBag::new();
        bag.report(Diagnostic::warning(ErrorCode::E4008).with_message("w"));
        assert!(!bag.has_errors());
        assert_eq!(bag.len(), 1);
    }
}
