//! Duality checking: readonly/readwrite operator discipline.
//!
//! Every expression is assigned a static [`ValueClass`]:
//!
//! - `Plain` — an ordinary value; destructuring it with a signal-operator
//!   pattern is a compile error.
//! - `Inert(op)` — an opaque signal handle produced by `op`; a consuming
//!   pattern must carry the same operator.
//! - `Unknown` — statically undecidable (foreign calls, arbitrary member
//!   access). Checks against `Unknown` never fail the build: they become
//!   [`GuardRequest`]s, realized by the code generator as development-build
//!   shape checks and compiled out in production.
//!
//! Calls to same-module functions are classified through per-function
//! return summaries, so a `createCounter()`-style factory whose body
//! resolves to an object literal carries exact per-property classes to its
//! call sites.

use rustc_hash::FxHashMap;

use vela_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use vela_ir::hir::{self, ExprKind, Hir, PatternKind, StmtKind};
use vela_ir::{
    BlockId, ExprId, FunctionId, Name, PatternId, SignalOp, Span, StringInterner, TemplateId,
};
use vela_stack::ensure_sufficient_stack;

/// Static classification of an expression's value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueClass {
    /// An ordinary value (including a Live read, which yields the current
    /// value).
    Plain,
    /// An opaque handle produced by the given operator.
    Inert(SignalOp),
    /// Statically undecidable.
    Unknown,
}

impl Default for ValueClass {
    fn default() -> Self {
        ValueClass::Unknown
    }
}

/// What a same-module function's body resolves to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnSummary {
    /// Class of the resolved value itself.
    pub class: ValueClass,
    /// Per-property classes when the resolver is an object literal.
    pub props: FxHashMap<Name, ValueClass>,
}

/// Where a dev-runtime guard attaches.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GuardSite {
    /// A binding pattern consuming the value.
    Pattern(PatternId),
    /// A component prop attribute, identified by template and prop name.
    Attr { template: TemplateId, prop: Name },
}

/// A dev-runtime shape check requested for a statically undecidable
/// duality fact.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GuardRequest {
    pub site: GuardSite,
    /// Capability the consumer expects the value to carry.
    pub op: SignalOp,
    /// Consuming site in the source.
    pub span: Span,
}

pub(crate) struct DualityOutcome {
    pub classes: Vec<ValueClass>,
    pub guards: Vec<GuardRequest>,
    pub summaries: FxHashMap<FunctionId, ReturnSummary>,
}

/// Check one module. Expression classes are computed once and memoized;
/// every check site is visited regardless of earlier violations.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn check(
    hir: &Hir,
    resolution: &crate::Resolution,
    interner: &StringInterner,
    diagnostics: &mut DiagnosticQueue,
) -> DualityOutcome {
    let mut checker = Checker {
        hir,
        resolution,
        interner,
        diagnostics,
        classes: vec![None; hir.expr_count()],
        guards: Vec::new(),
        summaries: FxHashMap::default(),
    };

    checker.summarize_functions();
    checker.check_exprs();
    checker.check_stmts();
    checker.check_instantiations();

    DualityOutcome {
        classes: checker
            .classes
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
        guards: checker.guards,
        summaries: checker.summaries,
    }
}

struct Checker<'a> {
    hir: &'a Hir,
    resolution: &'a crate::Resolution,
    interner: &'a StringInterner,
    diagnostics: &'a mut DiagnosticQueue,
    classes: Vec<Option<ValueClass>>,
    guards: Vec<GuardRequest>,
    summaries: FxHashMap<FunctionId, ReturnSummary>,
}

impl Checker<'_> {
    /// Build return summaries in declaration order; a call to a function
    /// declared later classifies `Unknown` inside an earlier summary.
    fn summarize_functions(&mut self) {
        for id in self.hir.function_ids() {
            let body = self.hir.function(id).body;
            let summary = self.summarize_block(body);
            self.summaries.insert(id, summary);
        }
    }

    fn summarize_block(&mut self, body: BlockId) -> ReturnSummary {
        match self.hir.block(body).resolver {
            hir::Resolver::Empty => ReturnSummary {
                class: ValueClass::Plain,
                props: FxHashMap::default(),
            },
            hir::Resolver::Expr(expr) => {
                if let ExprKind::Object { props } = self.hir.expr(expr).kind {
                    let entries: Vec<(Name, ExprId)> = self
                        .hir
                        .obj_props(props)
                        .iter()
                        .map(|p| (p.key, p.value))
                        .collect();
                    let mut prop_classes = FxHashMap::default();
                    for (key, value) in entries {
                        prop_classes.insert(key, self.classify(value));
                    }
                    ReturnSummary {
                        class: ValueClass::Plain,
                        props: prop_classes,
                    }
                } else {
                    ReturnSummary {
                        class: self.classify(expr),
                        props: FxHashMap::default(),
                    }
                }
            }
            hir::Resolver::If { .. } | hir::Resolver::For { .. } => ReturnSummary::default(),
        }
    }

    fn classify(&mut self, id: ExprId) -> ValueClass {
        if let Some(class) = self.classes[id.index()] {
            return class;
        }
        let class = ensure_sufficient_stack(|| self.classify_inner(id));
        self.classes[id.index()] = Some(class);
        class
    }

    fn classify_inner(&mut self, id: ExprId) -> ValueClass {
        let expr = *self.hir.expr(id);
        match expr.kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Undefined
            | ExprKind::Binary { .. }
            | ExprKind::Unary { .. }
            | ExprKind::Object { .. }
            | ExprKind::Template(_) => ValueClass::Plain,

            ExprKind::Ident(_) => match self.resolution.mode_of_use(id) {
                Some(mode) => match mode.op() {
                    Some(op) if mode.is_inert() => ValueClass::Inert(op),
                    // Live and Plain mentions yield the current value.
                    _ => ValueClass::Plain,
                },
                // Unresolved (already reported by the resolver).
                None => ValueClass::Unknown,
            },

            ExprKind::Signal { op, operand } => {
                self.check_operator_target(op, operand, expr.span);
                ValueClass::Inert(op)
            }

            // `signal(init)` yields the `[getter, setter]` handle pair.
            ExprKind::SignalCtor { .. } => ValueClass::Inert(SignalOp::Readwrite),

            ExprKind::Member { object, property } => self.prop_class(object, property),

            ExprKind::Call { callee, .. } => self
                .call_summary(callee)
                .map_or(ValueClass::Unknown, |s| s.class),

            // An assignment expression's value is the assigned value.
            ExprKind::Assign { value, .. } => self.classify(value),

            ExprKind::Block(body) => self.block_class(body),

            // A memo yields a runtime-created readable; its shape is not
            // modeled statically.
            ExprKind::Memo { .. } => ValueClass::Unknown,
            ExprKind::Effect { .. } => ValueClass::Plain,
        }
    }

    fn block_class(&mut self, body: BlockId) -> ValueClass {
        match self.hir.block(body).resolver {
            hir::Resolver::Empty => ValueClass::Plain,
            hir::Resolver::Expr(expr) => self.classify(expr),
            hir::Resolver::If { .. } | hir::Resolver::For { .. } => ValueClass::Unknown,
        }
    }

    /// The summary behind a call, when the callee names a same-module
    /// function.
    fn call_summary(&mut self, callee: ExprId) -> Option<ReturnSummary> {
        let ExprKind::Ident(name) = self.hir.expr(callee).kind else {
            return None;
        };
        let id = self.resolution.function_by_name(name)?;
        self.summaries.get(&id).cloned()
    }

    /// Class of `object.key`, exact for object literals and summarized
    /// calls, `Unknown` otherwise.
    fn prop_class(&mut self, object: ExprId, key: Name) -> ValueClass {
        match self.hir.expr(object).kind {
            ExprKind::Object { props } => {
                let value = self
                    .hir
                    .obj_props(props)
                    .iter()
                    .find(|p| p.key == key)
                    .map(|p| p.value);
                match value {
                    Some(value) => self.classify(value),
                    None => ValueClass::Unknown,
                }
            }
            ExprKind::Call { callee, .. } => match self.call_summary(callee) {
                Some(summary) => summary.props.get(&key).copied().unwrap_or_default(),
                None => ValueClass::Unknown,
            },
            _ => ValueClass::Unknown,
        }
    }

    /// `readonly`/`readwrite` applies only to a Live binding mention.
    fn check_operator_target(&mut self, op: SignalOp, operand: ExprId, span: Span) {
        match self.hir.expr(operand).kind {
            ExprKind::Ident(name) => match self.resolution.mode_of_use(operand) {
                Some(mode) if mode.is_live() => {}
                Some(mode) => {
                    self.diagnostics.push(
                        Diagnostic::new(ErrorCode::InvalidOperatorTarget)
                            .with_message(format!(
                                "`{op}` requires a live signal binding, but `{}` is {mode}",
                                self.interner.lookup(name)
                            ))
                            .with_label(span, "operator applied here"),
                    );
                }
                // Unresolved operand: already reported.
                None => {}
            },
            _ => {
                self.diagnostics.push(
                    Diagnostic::new(ErrorCode::InvalidOperatorTarget)
                        .with_message(format!(
                            "`{op}` applies to a signal binding, not an arbitrary expression"
                        ))
                        .with_label(span, "operator applied here"),
                );
            }
        }
    }

    /// Classify every expression (forcing operator-target checks) and
    /// enforce the expression-level rules.
    fn check_exprs(&mut self) {
        for index in 0..self.hir.expr_count() {
            let id = ExprId::new(index as u32);
            self.classify(id);
            let expr = *self.hir.expr(id);
            match expr.kind {
                ExprKind::SignalCtor { init } => {
                    self.require_signal_value(init, "a signal constructor argument");
                }
                ExprKind::Assign { target, value, .. } => {
                    let mode = self.resolution.mode_of_use(target);
                    if mode.is_some_and(vela_ir::SignalMode::is_live) {
                        self.require_signal_value(value, "written to a live signal");
                    }
                    if let Some(mode) = mode {
                        if mode.is_live() && !mode.is_writable() {
                            self.reject_readonly_write(target, mode, expr.span);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn check_stmts(&mut self) {
        for index in 0..self.hir.stmt_count() {
            let id = vela_ir::StmtId::new(index as u32);
            match self.hir.stmt(id).kind {
                StmtKind::State { init, .. } => {
                    self.require_signal_value(init, "a `state` initializer");
                }
                StmtKind::Decl { pattern, init, .. } => {
                    let class = self.classify(init);
                    self.check_pattern(pattern, class, Some(init));
                }
                _ => {}
            }
        }
    }

    /// Match a binding pattern against the class of its source value.
    ///
    /// `source` is the source expression when one is addressable (used for
    /// per-property classes); nested sub-patterns beyond one property
    /// level check against `Unknown`.
    fn check_pattern(&mut self, id: PatternId, class: ValueClass, source: Option<ExprId>) {
        let pattern = *self.hir.pattern(id);
        match pattern.kind {
            PatternKind::Name { op: Some(op), .. } => {
                self.match_rebind(op, class, pattern.span, GuardSite::Pattern(id));
            }
            PatternKind::Name { op: None, .. } => {}
            PatternKind::Object { entries, .. } => {
                let entries: Vec<(Name, PatternId)> = self
                    .hir
                    .pat_entries(entries)
                    .iter()
                    .map(|e| (e.key, e.pattern))
                    .collect();
                for (key, sub) in entries {
                    let sub_class = match source {
                        Some(expr) => self.prop_class(expr, key),
                        None => ValueClass::Unknown,
                    };
                    // Deeper levels have no addressable source expression.
                    self.check_pattern(sub, sub_class, None);
                }
            }
        }
    }

    fn match_rebind(&mut self, op: SignalOp, class: ValueClass, span: Span, site: GuardSite) {
        match class {
            ValueClass::Inert(produced) if produced == op => {}
            ValueClass::Inert(produced) => {
                self.diagnostics.push(
                    Diagnostic::new(ErrorCode::DualityMismatch)
                        .with_message(format!(
                            "pattern expects a `{op}` handle, but the value was produced by \
                             `{produced}`"
                        ))
                        .with_label(span, format!("consumed as `{op}` here")),
                );
            }
            ValueClass::Plain => {
                self.diagnostics.push(
                    Diagnostic::new(ErrorCode::DualityMismatch)
                        .with_message(format!(
                            "pattern expects a `{op}` signal handle, but the value is plain"
                        ))
                        .with_label(span, format!("consumed as `{op}` here")),
                );
            }
            ValueClass::Unknown => {
                self.guards.push(GuardRequest { site, op, span });
            }
        }
    }

    /// A live binding without the `readwrite` capability has no setter;
    /// assigning through it is a compile error.
    fn reject_readonly_write(&mut self, target: ExprId, mode: vela_ir::SignalMode, span: Span) {
        let described = match self.hir.expr(target).kind {
            ExprKind::Ident(name) => format!("`{}`", self.interner.lookup(name)),
            _ => "the target".to_owned(),
        };
        self.diagnostics.push(
            Diagnostic::new(ErrorCode::DualityMismatch)
                .with_message(format!(
                    "cannot assign through {described}: the binding is {mode} and carries no \
                     setter"
                ))
                .with_label(span, "assigned here"),
        );
    }

    fn require_signal_value(&mut self, expr: ExprId, what: &str) {
        if let ValueClass::Inert(op) = self.classify(expr) {
            let span = self.hir.expr(expr).span;
            self.diagnostics.push(
                Diagnostic::new(ErrorCode::InertAssignedAsSignalValue)
                    .with_message(format!(
                        "a `{op}` handle cannot be {what}; rebind it with a `{op}` pattern first"
                    ))
                    .with_label(span, "inert handle here"),
            );
        }
    }

    /// Component instantiations: a value supplied for a `readwrite` prop
    /// must be a `readwrite` handle.
    fn check_instantiations(&mut self) {
        for index in 0..self.hir.template_count() {
            let id = TemplateId::new(index as u32);
            let template = *self.hir.template(id);
            let Some(component) = self.resolution.component_for_tag(template.tag) else {
                continue;
            };
            let specs: Vec<hir::PropSpec> = self
                .hir
                .prop_specs(self.hir.component(component).props)
                .to_vec();
            let attrs: Vec<hir::Attr> = self.hir.attrs(template.attrs).to_vec();

            for attr in attrs {
                let Some(spec) = specs.iter().find(|s| s.external_name() == attr.name) else {
                    continue;
                };
                if spec.mode != vela_ir::SignalMode::LiveReadwrite {
                    continue;
                }
                // A bare attribute supplies the plain value `true`.
                let class = if attr.value.is_valid() {
                    self.classify(attr.value)
                } else {
                    ValueClass::Plain
                };
                match class {
                    ValueClass::Inert(SignalOp::Readwrite) => {}
                    ValueClass::Unknown => {
                        self.guards.push(GuardRequest {
                            site: GuardSite::Attr {
                                template: id,
                                prop: attr.name,
                            },
                            op: SignalOp::Readwrite,
                            span: attr.span,
                        });
                    }
                    _ => {
                        self.diagnostics.push(
                            Diagnostic::new(ErrorCode::DualityMismatch)
                                .with_message(format!(
                                    "prop `{}` is declared `readwrite` and needs a `readwrite` \
                                     handle",
                                    self.interner.lookup(spec.name)
                                ))
                                .with_label(attr.span, "supplied here")
                                .with_secondary_label(spec.span, "prop declared here"),
                        );
                    }
                }
            }
        }
    }
}
