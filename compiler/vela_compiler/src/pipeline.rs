//! The compilation pipeline: normalize → analyze → lower → emit.

use vela_codegen::{emit, CodegenOptions, RuntimeInterface};
use vela_ir::{ast, StringInterner};
use vela_lower::lower;
use vela_norm::normalize;
use vela_sema::{analyze, ModuleExports, SemaOptions, TrackingPolicy};

use crate::output::CompileOutput;

/// Configuration for a compilation run.
#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    /// How component bodies are classified for tracking.
    pub policy: TrackingPolicy,
    /// Compile dev-runtime guards out and silence their warnings.
    pub production: bool,
    /// Names of the reactive runtime entry points.
    pub runtime: RuntimeInterface,
    /// Exports of sibling modules, consulted when a name is not found in
    /// any local scope.
    pub imports: ModuleExports,
}

/// Full single-module pipeline: normalize → analyze → lower → emit.
///
/// All stages run to completion regardless of errors so diagnostics are
/// exhaustive; emission is the sole gate, refusing when any compile error
/// was recorded.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn compile_module(
    module: &ast::Module,
    interner: &StringInterner,
    options: &CompileOptions,
) -> CompileOutput {
    let norm = normalize(module);

    let sema_options = SemaOptions {
        policy: options.policy,
        imports: options.imports.clone(),
    };
    let sema = analyze(&norm.hir, &norm.module, interner, &sema_options);

    let lowered = lower(&norm.hir, &norm.module, &sema);

    let codegen_options = CodegenOptions {
        production: options.production,
        runtime: options.runtime.clone(),
    };
    let code = emit(
        &norm.hir,
        &norm.module,
        interner,
        &sema,
        &lowered,
        &codegen_options,
    );

    let success = code.is_some();
    let exports = sema.resolution.exports.clone();
    let mut diagnostics = sema.diagnostics.into_sorted();
    if options.production {
        // Dev-runtime warnings are silent in production builds.
        diagnostics.retain(|d| d.severity.blocks_codegen());
    }

    tracing::debug!(success, diagnostics = diagnostics.len(), "compilation complete");

    CompileOutput {
        success,
        code,
        diagnostics,
        exports,
    }
}
