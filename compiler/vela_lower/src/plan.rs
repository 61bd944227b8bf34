//! Consumer propagation and plan computation.

use vela_ir::hir::{self, Child, ExprKind, Hir, HirModule, Item, StmtKind};
use vela_ir::reactive::{BlockPlan, Consumer, LoweredModule, ValueShape, Wrapper};
use vela_ir::{BlockId, ExprId, StmtId, TemplateId};
use vela_sema::{SemaResult, TrackingOrigin};
use vela_stack::ensure_sufficient_stack;

/// Lower one module to per-block execution plans.
#[tracing::instrument(level = "debug", skip_all, fields(blocks = hir.block_count()))]
pub fn lower(hir: &Hir, module: &HirModule, sema: &SemaResult) -> LoweredModule {
    let mut lowerer = Lowerer {
        hir,
        sema,
        lowered: LoweredModule::with_block_count(hir.block_count()),
    };
    lowerer.run(module);

    #[cfg(debug_assertions)]
    validate(hir, &lowerer.lowered);

    lowerer.lowered
}

struct Lowerer<'a> {
    hir: &'a Hir,
    sema: &'a SemaResult,
    lowered: LoweredModule,
}

impl Lowerer<'_> {
    fn run(&mut self, module: &HirModule) {
        for item in &module.items {
            match *item {
                Item::Stmt(id) => self.stmt(id),
                Item::Component(id) => {
                    let component = self.hir.component(id);
                    let defaults: Vec<ExprId> = self
                        .hir
                        .prop_specs(component.props)
                        .iter()
                        .map(|s| s.default)
                        .filter(|d| d.is_valid())
                        .collect();
                    let body = component.body;
                    for default in defaults {
                        self.expr(default, Consumer::Scalar);
                    }
                    // The body's resolved value is the rendered result.
                    self.block(body, Consumer::Scalar);
                }
                Item::Function(id) => {
                    let body = self.hir.function(id).body;
                    self.block(body, Consumer::Scalar);
                }
            }
        }
    }

    fn block(&mut self, id: BlockId, consumer: Consumer) {
        let block = *self.hir.block(id);
        let info = self.sema.tracking[id.index()];

        // A block whose status is inherited executes within whatever
        // wrapper its ancestor chose; it never opens one of its own.
        let wrapper = if !info.tracked || info.origin == TrackingOrigin::Inherited {
            Wrapper::Inline
        } else if consumer == Consumer::Discarded {
            Wrapper::Effect
        } else {
            Wrapper::Memo
        };

        let shape = match block.resolver {
            hir::Resolver::For { .. } if consumer == Consumer::TemplateContent => {
                ValueShape::Fragments
            }
            _ => ValueShape::Scalar,
        };

        self.lowered.set_plan(
            id,
            BlockPlan {
                wrapper,
                shape,
                consumer,
                tracked: info.tracked,
            },
        );

        let stmts: Vec<StmtId> = self.hir.stmt_list(block.stmts).to_vec();
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.resolver(block.resolver, consumer);
    }

    /// Resolver-position blocks carry the enclosing consumer through:
    /// their value becomes the block's value.
    fn resolver(&mut self, resolver: hir::Resolver, consumer: Consumer) {
        match resolver {
            hir::Resolver::Empty => {}
            hir::Resolver::Expr(expr) => self.expr(expr, consumer),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond, Consumer::Scalar);
                self.block(then_block, consumer);
                if else_block.is_valid() {
                    self.block(else_block, consumer);
                }
            }
            hir::Resolver::For { iter, body, .. } => {
                self.expr(iter, Consumer::Scalar);
                self.block(body, consumer);
            }
        }
    }

    fn stmt(&mut self, id: StmtId) {
        match self.hir.stmt(id).kind {
            StmtKind::State { init, .. } | StmtKind::Decl { init, .. } => {
                self.expr(init, Consumer::Scalar);
            }
            // A non-trailing expression statement's value is discarded.
            StmtKind::Expr(expr) => self.expr(expr, Consumer::Discarded),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond, Consumer::Scalar);
                self.block(then_block, Consumer::Discarded);
                if else_block.is_valid() {
                    self.block(else_block, Consumer::Discarded);
                }
            }
            StmtKind::For { iter, body, .. } => {
                self.expr(iter, Consumer::Scalar);
                self.block(body, Consumer::Discarded);
            }
            StmtKind::Return { value } => {
                if value.is_valid() {
                    self.expr(value, Consumer::Scalar);
                }
            }
        }
    }

    /// `consumer` is who uses this expression's value, and flows into any
    /// block the expression itself is.
    fn expr(&mut self, id: ExprId, consumer: Consumer) {
        ensure_sufficient_stack(|| self.expr_inner(id, consumer));
    }

    fn expr_inner(&mut self, id: ExprId, consumer: Consumer) {
        match self.hir.expr(id).kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Undefined
            | ExprKind::Ident(_) => {}
            ExprKind::Member { object, .. } => self.expr(object, Consumer::Scalar),
            ExprKind::Call { callee, args } => {
                self.expr(callee, Consumer::Scalar);
                let args: Vec<ExprId> = self.hir.expr_list(args).to_vec();
                for arg in args {
                    self.expr(arg, Consumer::Scalar);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left, Consumer::Scalar);
                self.expr(right, Consumer::Scalar);
            }
            ExprKind::Unary { operand, .. } | ExprKind::Signal { operand, .. } => {
                self.expr(operand, Consumer::Scalar);
            }
            ExprKind::Assign { target, value, .. } => {
                self.expr(target, Consumer::Scalar);
                self.expr(value, Consumer::Scalar);
            }
            ExprKind::Object { props } => {
                let values: Vec<ExprId> = self
                    .hir
                    .obj_props(props)
                    .iter()
                    .map(|p| p.value)
                    .collect();
                for value in values {
                    self.expr(value, Consumer::Scalar);
                }
            }
            ExprKind::SignalCtor { init } => self.expr(init, Consumer::Scalar),
            // An effect runs for its side effects only.
            ExprKind::Effect { body } => self.block(body, Consumer::Discarded),
            ExprKind::Memo { body } => self.block(body, Consumer::Scalar),
            // A `do` block's value goes wherever the expression's does.
            ExprKind::Block(body) => self.block(body, consumer),
            ExprKind::Template(template) => self.template(template),
        }
    }

    fn template(&mut self, id: TemplateId) {
        let template = *self.hir.template(id);
        let attr_values: Vec<ExprId> = self
            .hir
            .attrs(template.attrs)
            .iter()
            .map(|a| a.value)
            .filter(|v| v.is_valid())
            .collect();
        for value in attr_values {
            self.expr(value, Consumer::Scalar);
        }
        let children: Vec<Child> = self.hir.children(template.children).to_vec();
        for child in children {
            match child {
                Child::Text(_) => {}
                Child::Interp(block) => self.block(block, Consumer::TemplateContent),
                Child::Element(element) => self.template(element),
            }
        }
    }
}

/// Internal consistency of the computed plans.
#[cfg(debug_assertions)]
fn validate(hir: &Hir, lowered: &LoweredModule) {
    for index in 0..hir.block_count() {
        let id = BlockId::new(index as u32);
        let plan = lowered.plan(id);
        debug_assert!(
            plan.shape != ValueShape::Fragments || plan.consumer == Consumer::TemplateContent,
            "fragments outside template content for {id:?}"
        );
        debug_assert!(
            plan.wrapper != Wrapper::Effect || plan.consumer == Consumer::Discarded,
            "effect wrapper with a consumed value for {id:?}"
        );
        debug_assert!(
            plan.wrapper == Wrapper::Inline || plan.tracked,
            "reactive wrapper on an untracked block for {id:?}"
        );
    }
}
