//! Per-compilation-unit diagnostic queue.
//!
//! Ordered and append-only: diagnostics are collected exhaustively — one
//! violation never suppresses detection of unrelated violations, so there
//! is no deduplication, no error limit, and no follow-on filtering here.
//! The code generator is the sole consumer of the error count.

use vela_ir::Span;

use crate::Diagnostic;

/// Ordered, append-only diagnostic collection for one module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        if diag.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
    }

    /// Number of CompileError-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Whether the containing module must be refused code generation.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Total number of diagnostics (all severities).
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Iterate without consuming.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Sort by primary source position (stable: ties keep emission order)
    /// and take the collected diagnostics.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|d| d.primary_span().map_or((u32::MAX, u32::MAX), span_key));
        self.diagnostics
    }

    /// Absorb another queue (stages hand their queue forward).
    pub fn extend(&mut self, other: DiagnosticQueue) {
        self.error_count += other.error_count;
        self.diagnostics.extend(other.diagnostics);
    }
}

fn span_key(span: Span) -> (u32, u32) {
    (span.start, span.end)
}
