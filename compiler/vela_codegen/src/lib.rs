//! Code generation for the Vela compiler.
//!
//! Stage 6 of the pipeline: turns the normalized tree plus the semantic
//! tables and block plans into JavaScript-shaped output against the
//! abstract reactive runtime interface.
//!
//! Emission rules:
//!
//! - A `state` declaration becomes one `createSignal` call bound to a
//!   `[getter, setter]` pair.
//! - A live read emits a getter call at every use site, never hoisted.
//! - A live write emits a setter call; compound assignment reads then
//!   writes (`x += 1` ⇒ `set$x(x() + 1)`).
//! - Inert handles pass through bare: the getter for `readonly`, the
//!   `[getter, setter]` pair for `readwrite`; never re-wrapped.
//! - Tracked blocks wrap in `createMemo` when their value is consumed and
//!   `createEffect` when only side effects matter; untracked blocks
//!   evaluate inline, exactly once.
//! - Templates emit hyperscript calls: `h(tag, props, ...children)`.
//! - Development builds emit an inline shape check for every guard
//!   request; production builds compile the guards out entirely.
//!
//! Emission is refused — [`emit`] returns `None` — when the diagnostic
//! queue holds at least one compile error for the module.

mod emitter;
mod writer;

#[cfg(test)]
mod tests;

use vela_ir::hir::{Hir, HirModule};
use vela_ir::reactive::LoweredModule;
use vela_ir::StringInterner;
use vela_sema::SemaResult;

pub use writer::CodeWriter;

/// Names of the reactive runtime entry points the generated code calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeInterface {
    pub create_signal: String,
    pub create_effect: String,
    pub create_memo: String,
    /// The rendering call for template elements.
    pub hyperscript: String,
}

impl Default for RuntimeInterface {
    fn default() -> Self {
        RuntimeInterface {
            create_signal: "createSignal".to_owned(),
            create_effect: "createEffect".to_owned(),
            create_memo: "createMemo".to_owned(),
            hyperscript: "h".to_owned(),
        }
    }
}

/// Configuration for one emission run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Compile dev-runtime guards out and silence their warnings.
    pub production: bool,
    pub runtime: RuntimeInterface,
}

/// Emit one module, or refuse when it carries compile errors.
#[tracing::instrument(level = "debug", skip_all, fields(errors = sema.diagnostics.error_count()))]
pub fn emit(
    hir: &Hir,
    module: &HirModule,
    interner: &StringInterner,
    sema: &SemaResult,
    lowered: &LoweredModule,
    options: &CodegenOptions,
) -> Option<String> {
    if sema.diagnostics.has_errors() {
        tracing::debug!("emission refused: module has compile errors");
        return None;
    }
    Some(emitter::emit_module(
        hir, module, interner, sema, lowered, options,
    ))
}
