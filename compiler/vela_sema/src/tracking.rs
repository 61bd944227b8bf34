//! Tracking-context classification.
//!
//! Determines, per enhanced block, whether live signal reads inside it
//! register dependencies (tracked) or read silently (untracked), and
//! records the origin that justifies the verdict. The rules, in order:
//!
//! 1. Template `{}` interpolation containers are tracked.
//! 2. `effect`/`memo` bodies are tracked.
//! 3. Component bodies follow the configured [`TrackingPolicy`].
//! 4. Nested blocks (branch bodies, loop bodies, `do` blocks) inherit
//!    their enclosing block's status.
//! 5. Module top level and function bodies are untracked.
//!
//! Component-body statements whose status flips with the policy — direct
//! statements that read a live signal — raise the policy-ambiguity
//! warning so the choice is visible during development.

use vela_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use vela_ir::hir::{self, Child, ExprKind, Hir, HirModule, Item, StmtKind};
use vela_ir::{BlockId, ExprId, SignalMode, StmtId, TemplateId};
use vela_stack::ensure_sufficient_stack;

use crate::{Resolution, TrackingPolicy};

/// Why a block is tracked or untracked.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TrackingOrigin {
    ModuleTopLevel,
    /// Status decided by the configured policy.
    ComponentBody,
    FunctionBody,
    EffectBody,
    MemoBody,
    /// Template `{}` interpolation container.
    TemplateContainer,
    /// Inherited from the enclosing block.
    Inherited,
}

/// The tracking verdict for one enhanced block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TrackingInfo {
    pub tracked: bool,
    pub origin: TrackingOrigin,
}

/// Classify every enhanced block of one module.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn classify(
    hir: &Hir,
    module: &HirModule,
    resolution: &Resolution,
    policy: TrackingPolicy,
    diagnostics: &mut DiagnosticQueue,
) -> Vec<TrackingInfo> {
    let mut classifier = Classifier {
        hir,
        resolution,
        policy,
        diagnostics,
        info: vec![
            TrackingInfo {
                tracked: false,
                origin: TrackingOrigin::ModuleTopLevel,
            };
            hir.block_count()
        ],
    };
    classifier.run(module);
    classifier.info
}

struct Classifier<'a> {
    hir: &'a Hir,
    resolution: &'a Resolution,
    policy: TrackingPolicy,
    diagnostics: &'a mut DiagnosticQueue,
    info: Vec<TrackingInfo>,
}

impl Classifier<'_> {
    fn run(&mut self, module: &HirModule) {
        for item in &module.items {
            match *item {
                Item::Stmt(id) => self.stmt(id, false),
                Item::Component(id) => self.component(id),
                Item::Function(id) => {
                    let body = self.hir.function(id).body;
                    self.block(body, false, TrackingOrigin::FunctionBody);
                }
            }
        }
    }

    fn component(&mut self, id: vela_ir::ComponentId) {
        let component = self.hir.component(id);
        let body = component.body;
        let props = component.props;
        let tracked = self.policy == TrackingPolicy::ComponentBodyTracking;

        let defaults: Vec<ExprId> = self
            .hir
            .prop_specs(props)
            .iter()
            .map(|s| s.default)
            .filter(|d| d.is_valid())
            .collect();
        for default in defaults {
            self.expr(default, false);
        }

        self.block(body, tracked, TrackingOrigin::ComponentBody);
        self.warn_policy_dependent_stmts(body);
    }

    /// Direct component-body statements reading a live signal are tracked
    /// under one policy and silent under the other.
    fn warn_policy_dependent_stmts(&mut self, body: BlockId) {
        let stmts: Vec<StmtId> = self.hir.stmt_list(self.hir.block(body).stmts).to_vec();
        for id in stmts {
            if self.stmt_reads_live(id) {
                let span = self.hir.stmt(id).span;
                self.diagnostics.push(
                    Diagnostic::new(ErrorCode::AmbiguousTrackingContext)
                        .with_message(
                            "this statement reads a live signal; whether it re-runs on \
                             changes depends on the configured tracking policy",
                        )
                        .with_label(span, "live signal read in component body"),
                );
            }
        }
    }

    fn block(&mut self, id: BlockId, tracked: bool, origin: TrackingOrigin) {
        self.info[id.index()] = TrackingInfo { tracked, origin };
        let block = *self.hir.block(id);
        let stmts: Vec<StmtId> = self.hir.stmt_list(block.stmts).to_vec();
        for stmt in stmts {
            self.stmt(stmt, tracked);
        }
        self.resolver(block.resolver, tracked);
    }

    fn resolver(&mut self, resolver: hir::Resolver, tracked: bool) {
        match resolver {
            hir::Resolver::Empty => {}
            hir::Resolver::Expr(expr) => self.expr(expr, tracked),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond, tracked);
                self.block(then_block, tracked, TrackingOrigin::Inherited);
                if else_block.is_valid() {
                    self.block(else_block, tracked, TrackingOrigin::Inherited);
                }
            }
            hir::Resolver::For { iter, body, .. } => {
                self.expr(iter, tracked);
                self.block(body, tracked, TrackingOrigin::Inherited);
            }
        }
    }

    fn stmt(&mut self, id: StmtId, tracked: bool) {
        match self.hir.stmt(id).kind {
            StmtKind::State { init, .. } => self.expr(init, tracked),
            StmtKind::Decl { init, .. } => self.expr(init, tracked),
            StmtKind::Expr(expr) => self.expr(expr, tracked),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond, tracked);
                self.block(then_block, tracked, TrackingOrigin::Inherited);
                if else_block.is_valid() {
                    self.block(else_block, tracked, TrackingOrigin::Inherited);
                }
            }
            StmtKind::For { iter, body, .. } => {
                self.expr(iter, tracked);
                self.block(body, tracked, TrackingOrigin::Inherited);
            }
            StmtKind::Return { value } => {
                if value.is_valid() {
                    self.expr(value, tracked);
                }
            }
        }
    }

    fn expr(&mut self, id: ExprId, tracked: bool) {
        ensure_sufficient_stack(|| self.expr_inner(id, tracked));
    }

    fn expr_inner(&mut self, id: ExprId, tracked: bool) {
        match self.hir.expr(id).kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Undefined
            | ExprKind::Ident(_) => {}
            ExprKind::Member { object, .. } => self.expr(object, tracked),
            ExprKind::Call { callee, args } => {
                self.expr(callee, tracked);
                let args: Vec<ExprId> = self.hir.expr_list(args).to_vec();
                for arg in args {
                    self.expr(arg, tracked);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left, tracked);
                self.expr(right, tracked);
            }
            ExprKind::Unary { operand, .. } | ExprKind::Signal { operand, .. } => {
                self.expr(operand, tracked);
            }
            ExprKind::Assign { target, value, .. } => {
                self.expr(target, tracked);
                self.expr(value, tracked);
            }
            ExprKind::Object { props } => {
                let values: Vec<ExprId> = self
                    .hir
                    .obj_props(props)
                    .iter()
                    .map(|p| p.value)
                    .collect();
                for value in values {
                    self.expr(value, tracked);
                }
            }
            ExprKind::SignalCtor { init } => self.expr(init, tracked),
            ExprKind::Effect { body } => self.block(body, true, TrackingOrigin::EffectBody),
            ExprKind::Memo { body } => self.block(body, true, TrackingOrigin::MemoBody),
            ExprKind::Block(body) => self.block(body, tracked, TrackingOrigin::Inherited),
            ExprKind::Template(template) => self.template(template, tracked),
        }
    }

    fn template(&mut self, id: TemplateId, tracked: bool) {
        let template = *self.hir.template(id);
        let attr_values: Vec<ExprId> = self
            .hir
            .attrs(template.attrs)
            .iter()
            .map(|a| a.value)
            .filter(|v| v.is_valid())
            .collect();
        for value in attr_values {
            self.expr(value, tracked);
        }
        let children: Vec<Child> = self.hir.children(template.children).to_vec();
        for child in children {
            match child {
                Child::Text(_) => {}
                Child::Interp(block) => self.block(block, true, TrackingOrigin::TemplateContainer),
                Child::Element(element) => self.template(element, tracked),
            }
        }
    }

    // Policy-dependence scan: does this statement read a live signal,
    // excluding positions whose status is policy-independent (effect and
    // memo bodies, template containers)?

    fn stmt_reads_live(&self, id: StmtId) -> bool {
        match self.hir.stmt(id).kind {
            StmtKind::State { init, .. } | StmtKind::Decl { init, .. } => {
                self.expr_reads_live(init)
            }
            StmtKind::Expr(expr) => self.expr_reads_live(expr),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr_reads_live(cond)
                    || self.block_reads_live(then_block)
                    || (else_block.is_valid() && self.block_reads_live(else_block))
            }
            StmtKind::For { iter, body, .. } => {
                self.expr_reads_live(iter) || self.block_reads_live(body)
            }
            StmtKind::Return { value } => value.is_valid() && self.expr_reads_live(value),
        }
    }

    fn block_reads_live(&self, id: BlockId) -> bool {
        let block = *self.hir.block(id);
        if self
            .hir
            .stmt_list(block.stmts)
            .iter()
            .any(|&stmt| self.stmt_reads_live(stmt))
        {
            return true;
        }
        match block.resolver {
            hir::Resolver::Empty => false,
            hir::Resolver::Expr(expr) => self.expr_reads_live(expr),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr_reads_live(cond)
                    || self.block_reads_live(then_block)
                    || (else_block.is_valid() && self.block_reads_live(else_block))
            }
            hir::Resolver::For { iter, body, .. } => {
                self.expr_reads_live(iter) || self.block_reads_live(body)
            }
        }
    }

    fn expr_reads_live(&self, id: ExprId) -> bool {
        ensure_sufficient_stack(|| self.expr_reads_live_inner(id))
    }

    fn expr_reads_live_inner(&self, id: ExprId) -> bool {
        match self.hir.expr(id).kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Undefined => false,
            ExprKind::Ident(_) => self
                .resolution
                .mode_of_use(id)
                .is_some_and(SignalMode::is_live),
            ExprKind::Member { object, .. } => self.expr_reads_live(object),
            ExprKind::Call { callee, args } => {
                self.expr_reads_live(callee)
                    || self
                        .hir
                        .expr_list(args)
                        .iter()
                        .any(|&arg| self.expr_reads_live(arg))
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr_reads_live(left) || self.expr_reads_live(right)
            }
            ExprKind::Unary { operand, .. } => self.expr_reads_live(operand),
            // The operator takes the cell, not its value: not a read.
            ExprKind::Signal { .. } => false,
            // Compound assignment reads the target before writing it.
            ExprKind::Assign { target, op, value } => {
                (op.binary().is_some() && self.expr_reads_live(target))
                    || self.expr_reads_live(value)
            }
            ExprKind::Object { props } => self
                .hir
                .obj_props(props)
                .iter()
                .any(|p| self.expr_reads_live(p.value)),
            ExprKind::SignalCtor { init } => self.expr_reads_live(init),
            // Tracked regardless of policy: not policy-dependent.
            ExprKind::Effect { .. } | ExprKind::Memo { .. } => false,
            ExprKind::Block(body) => self.block_reads_live(body),
            // Template interpolations are tracked regardless of policy;
            // attribute expressions evaluate in the enclosing context.
            ExprKind::Template(template) => self
                .hir
                .attrs(self.hir.template(template).attrs)
                .iter()
                .any(|a| a.value.is_valid() && self.expr_reads_live(a.value)),
        }
    }
}
