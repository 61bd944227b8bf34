//! Result types for the compiler driver.
//!
//! These are the public interface between the driver and its consumers;
//! they carry everything needed to present results without exposing the
//! stage crates' internals.

use vela_diagnostic::Diagnostic;
use vela_sema::ModuleExports;

/// Result of compiling one module.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    /// Whether the module compiled without errors.
    pub success: bool,
    /// Generated code; `None` when any compile error was recorded.
    pub code: Option<String>,
    /// Diagnostics from all stages, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Signal-mode table for the module's top-level bindings, consumable
    /// as the import table of a dependent module.
    pub exports: ModuleExports,
}
