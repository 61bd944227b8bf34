//! Semantic analysis for the Vela compiler.
//!
//! Stages 2–4 of the pipeline, run over the normalized IR:
//!
//! 1. **Binding resolution** ([`resolve`] internals): a single top-down
//!    traversal that assigns every binding an identity and an immutable
//!    [`vela_ir::SignalMode`], creates [`SignalDescriptor`] rows for
//!    reactive cells, and produces the module's [`ModuleExports`].
//! 2. **Duality checking** ([`duality`] internals): static value classes
//!    for every expression, operator-target validity, pattern/source
//!    operator matching, and the inert-as-signal-value rule. Checks whose
//!    source class is statically undecidable become [`GuardRequest`]s for
//!    the code generator instead of compile errors.
//! 3. **Tracking classification** ([`tracking`] internals): tracked or
//!    untracked per enhanced block, with the origin that justifies it.
//!
//! All three stages append to one [`DiagnosticQueue`]; a violation in one
//! stage never suppresses detection in another.

mod duality;
mod resolve;
mod tracking;


pub use duality::{GuardRequest, GuardSite, ReturnSummary, ValueClass};
pub use resolve::{
    Binding, BindingKind, ModuleExports, Resolution, SignalDescriptor, SignalOrigin,
};
pub use tracking::{TrackingInfo, TrackingOrigin};

use rustc_hash::FxHashMap;
use vela_diagnostic::DiagnosticQueue;
use vela_ir::hir::{Hir, HirModule};
use vela_ir::{FunctionId, StringInterner};

/// How component bodies are classified for tracking.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TrackingPolicy {
    /// Component bodies run once at setup; only explicit constructs
    /// (effects, memos, template containers) track.
    #[default]
    ComponentBodySetupOnly,
    /// Component bodies are themselves tracking contexts.
    ComponentBodyTracking,
}

/// Configuration for one semantic-analysis run.
#[derive(Debug, Default)]
pub struct SemaOptions {
    pub policy: TrackingPolicy,
    /// Exports of sibling modules, consulted (read-only) when a name is
    /// not found in any local scope.
    pub imports: ModuleExports,
}

/// Everything the later stages need from semantic analysis.
#[derive(Debug)]
pub struct SemaResult {
    pub resolution: Resolution,
    /// Static value class per expression, indexed by `ExprId`.
    pub classes: Vec<ValueClass>,
    /// Dev-runtime guard requests for statically undecidable checks.
    pub guards: Vec<GuardRequest>,
    /// Return summaries for same-module functions.
    pub summaries: FxHashMap<FunctionId, ReturnSummary>,
    /// Tracking fact per enhanced block, indexed by `BlockId`.
    pub tracking: Vec<TrackingInfo>,
    pub diagnostics: DiagnosticQueue,
}

/// Run binding resolution, duality checking, and tracking classification
/// over one normalized module.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn analyze(
    hir: &Hir,
    module: &HirModule,
    interner: &StringInterner,
    options: &SemaOptions,
) -> SemaResult {
    let mut diagnostics = DiagnosticQueue::new();

    let resolution = resolve::resolve(hir, module, interner, &options.imports, &mut diagnostics);
    let duality = duality::check(hir, &resolution, interner, &mut diagnostics);
    let tracking = tracking::classify(hir, module, &resolution, options.policy, &mut diagnostics);

    tracing::debug!(
        bindings = resolution.binding_count(),
        signals = resolution.signal_count(),
        guards = duality.guards.len(),
        errors = diagnostics.error_count(),
        "semantic analysis complete"
    );

    SemaResult {
        resolution,
        classes: duality.classes,
        guards: duality.guards,
        summaries: duality.summaries,
        tracking,
        diagnostics,
    }
}
