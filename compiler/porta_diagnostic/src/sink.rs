use crate::Diagnostic;

/// Receiver for diagnostics.
///
/// Implemented for `Vec<Diagnostic>` (collect everything), for any
/// `FnMut(Diagnostic)` closure, and for [`DiagnosticQueue`](crate::DiagnosticQueue).
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Diagnostic),
{
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic);
    }
}
