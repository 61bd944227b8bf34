//! Core diagnostic types.
//!
//! Defines [`Diagnostic`], [`Label`], and [`Severity`] — the building
//! blocks every compiler stage uses to report problems. Diagnostics are
//! values: they are collected, never thrown as control flow.

use std::fmt;

use vela_ir::{BindingId, Span};

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// `DevRuntimeWarning` covers checks that cannot be proven statically:
/// the code generator emits a development-build guard for them.
/// `ProdSilent` is the production face of the same checks — the guard is
/// compiled out, no check, no warning.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    CompileError,
    DevRuntimeWarning,
    ProdSilent,
}

impl Severity {
    /// Whether this severity blocks code generation.
    #[inline]
    pub const fn blocks_codegen(self) -> bool {
        matches!(self, Severity::CompileError)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::CompileError => write!(f, "error"),
            Severity::DevRuntimeWarning => write!(f, "dev-warning"),
            Severity::ProdSilent => write!(f, "silent"),
        }
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary location.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context, e.g. the producing
    /// declaration of a mismatched handle).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A structured diagnostic record.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Kind, for searchability and severity defaulting.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main message.
    pub message: String,
    /// Labeled spans; the first primary label is the source range.
    pub labels: Vec<Label>,
    /// Identities of the offending bindings, when known.
    pub bindings: Vec<BindingId>,
}

impl Diagnostic {
    /// Create a diagnostic at the kind's default severity.
    #[cold]
    pub fn new(code: ErrorCode) -> Self {
        Diagnostic {
            code,
            severity: code.default_severity(),
            message: String::new(),
            labels: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the offending location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Record an offending binding identity.
    pub fn with_binding(mut self, binding: BindingId) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Check if this diagnostic blocks code generation.
    pub fn is_error(&self) -> bool {
        self.severity.blocks_codegen()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {}: {}", marker, label.span, label.message)?;
        }
        Ok(())
    }
}
