//! Binding resolution and signal-mode classification.
//!
//! A single top-down traversal. Every declaration creates a [`Binding`]
//! with a [`SignalMode`] that is fixed permanently at that point; every
//! identifier use-site is mapped to its binding. `state` declarations and
//! explicit signal constructors create [`SignalDescriptor`] rows — the
//! identity of the underlying reactive cell, referenced by bindings and
//! never copied.
//!
//! Names with no visible local declaration fall back to the read-only
//! cross-module export table; a miss there is an `UndeclaredBinding`
//! error, reported and skipped.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use vela_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use vela_ir::hir::{self, Hir, HirModule, Item, PropSpec, StmtKind};
use vela_ir::{
    BindingId, BlockId, ComponentId, ExprId, FunctionId, Name, PatternId, SignalId, SignalMode,
    Span, StmtId, StringInterner, TemplateId,
};
use vela_stack::ensure_sufficient_stack;

bitflags! {
    /// Context of the enclosing body during resolution.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    struct ScopeFlags: u8 {
        const COMPONENT_BODY = 1 << 0;
        const FUNCTION_BODY = 1 << 1;
    }
}

/// What kind of declaration produced a binding.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingKind {
    /// `const`/`let` declaration.
    Var,
    /// Component parameter.
    Param,
    /// `state` declaration.
    State,
    /// `for` loop variable.
    Loop,
    /// Plain function declaration.
    Function,
    /// Resolved through the cross-module export table.
    Import,
}

/// One resolved binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub name: Name,
    pub kind: BindingKind,
    /// Fixed at declaration; never reclassified.
    pub mode: SignalMode,
    pub span: Span,
    /// Underlying reactive cell; `SignalId::INVALID` when none.
    pub signal: SignalId,
}

/// Where a reactive cell came from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SignalOrigin {
    /// `state x = init`.
    StateDecl,
    /// Explicit `signal(init)` constructor expression.
    Constructor,
}

/// Identity row for one reactive cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalDescriptor {
    pub origin: SignalOrigin,
    /// Declaring name; `Name::EMPTY` for anonymous constructor cells.
    pub name: Name,
    pub span: Span,
}

/// Cross-module export table: exported name → resolved signal-mode.
///
/// Produced for every compiled module and consumed read-only by sibling
/// compilations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleExports {
    entries: FxHashMap<Name, SignalMode>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, mode: SignalMode) {
        self.entries.insert(name, mode);
    }

    pub fn get(&self, name: Name) -> Option<SignalMode> {
        self.entries.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, SignalMode)> + '_ {
        self.entries.iter().map(|(&name, &mode)| (name, mode))
    }
}

/// The output of binding resolution.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    bindings: Vec<Binding>,
    signals: Vec<SignalDescriptor>,
    /// Identifier use-site → binding.
    uses: FxHashMap<ExprId, BindingId>,
    /// Name-pattern → the binding it introduced.
    pattern_bindings: FxHashMap<PatternId, BindingId>,
    /// `state` statement → the binding it introduced.
    state_bindings: FxHashMap<StmtId, BindingId>,
    /// `for` body block → its loop binding.
    loop_bindings: FxHashMap<BlockId, BindingId>,
    /// Template tags that instantiate a component.
    components_by_tag: FxHashMap<Name, ComponentId>,
    functions_by_name: FxHashMap<Name, FunctionId>,
    /// This module's own exports.
    pub exports: ModuleExports,
}

impl Resolution {
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    pub fn signal(&self, id: SignalId) -> &SignalDescriptor {
        &self.signals[id.index()]
    }

    /// The binding an identifier use-site resolved to, if any.
    pub fn use_of(&self, expr: ExprId) -> Option<BindingId> {
        self.uses.get(&expr).copied()
    }

    /// Shortcut: the signal-mode behind an identifier use-site.
    pub fn mode_of_use(&self, expr: ExprId) -> Option<SignalMode> {
        self.use_of(expr).map(|id| self.binding(id).mode)
    }

    pub fn pattern_binding(&self, pattern: PatternId) -> Option<BindingId> {
        self.pattern_bindings.get(&pattern).copied()
    }

    pub fn state_binding(&self, stmt: StmtId) -> Option<BindingId> {
        self.state_bindings.get(&stmt).copied()
    }

    pub fn loop_binding(&self, body: BlockId) -> Option<BindingId> {
        self.loop_bindings.get(&body).copied()
    }

    /// The component a template tag instantiates, if the tag names one.
    pub fn component_for_tag(&self, tag: Name) -> Option<ComponentId> {
        self.components_by_tag.get(&tag).copied()
    }

    pub fn function_by_name(&self, name: Name) -> Option<FunctionId> {
        self.functions_by_name.get(&name).copied()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    fn push_binding(&mut self, binding: Binding) -> BindingId {
        let id = BindingId::new(self.bindings.len() as u32);
        self.bindings.push(binding);
        id
    }

    fn push_signal(&mut self, descriptor: SignalDescriptor) -> SignalId {
        let id = SignalId::new(self.signals.len() as u32);
        self.signals.push(descriptor);
        id
    }
}

/// Resolve one module.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn resolve(
    hir: &Hir,
    module: &HirModule,
    interner: &StringInterner,
    imports: &ModuleExports,
    diagnostics: &mut DiagnosticQueue,
) -> Resolution {
    let resolver = Resolver {
        hir,
        interner,
        imports,
        diagnostics,
        res: Resolution::default(),
        scopes: Vec::new(),
        flags: ScopeFlags::default(),
        import_cache: FxHashMap::default(),
    };
    resolver.run(module)
}

struct Resolver<'a> {
    hir: &'a Hir,
    interner: &'a StringInterner,
    imports: &'a ModuleExports,
    diagnostics: &'a mut DiagnosticQueue,
    res: Resolution,
    scopes: Vec<FxHashMap<Name, BindingId>>,
    flags: ScopeFlags,
    /// One import binding per imported name.
    import_cache: FxHashMap<Name, BindingId>,
}

impl Resolver<'_> {
    fn run(mut self, module: &HirModule) -> Resolution {
        // Component tags and function summaries are addressable by name
        // anywhere in the module; identifier resolution stays top-down.
        for item in &module.items {
            match *item {
                Item::Component(id) => {
                    let component = self.hir.component(id);
                    self.res.components_by_tag.insert(component.name, id);
                }
                Item::Function(id) => {
                    let function = self.hir.function(id);
                    self.res.functions_by_name.insert(function.name, id);
                }
                Item::Stmt(_) => {}
            }
        }

        self.scopes.push(FxHashMap::default());
        for item in &module.items {
            match *item {
                Item::Stmt(id) => self.stmt(id),
                Item::Component(id) => self.component(id),
                Item::Function(id) => self.function(id),
            }
        }

        // Module-scope bindings are this module's exports.
        let module_scope = self.scopes.pop().unwrap_or_default();
        for (name, id) in module_scope {
            let mode = self.res.bindings[id.index()].mode;
            self.res.exports.insert(name, mode);
        }

        self.res
    }

    fn define(&mut self, name: Name, binding: Binding) -> BindingId {
        let id = self.res.push_binding(binding);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, id);
        }
        id
    }

    fn lookup(&self, name: Name) -> Option<BindingId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    fn component(&mut self, id: ComponentId) {
        let component = self.hir.component(id);
        let body = component.body;
        let specs: Vec<PropSpec> = self.hir.prop_specs(component.props).to_vec();

        self.scopes.push(FxHashMap::default());
        let saved = self.flags;
        self.flags = ScopeFlags::COMPONENT_BODY;

        for spec in specs {
            if spec.default.is_valid() {
                self.expr(spec.default);
            }
            self.define(
                spec.name,
                Binding {
                    name: spec.name,
                    kind: BindingKind::Param,
                    mode: spec.mode,
                    span: spec.span,
                    signal: SignalId::INVALID,
                },
            );
        }
        self.block_in_place(body);

        self.flags = saved;
        self.scopes.pop();
    }

    fn function(&mut self, id: FunctionId) {
        let function = self.hir.function(id);
        let body = function.body;
        let name = function.name;
        let span = function.span;
        let params: Vec<Name> = function.params.to_vec();

        // The function name is a module-scope value binding.
        self.define(
            name,
            Binding {
                name,
                kind: BindingKind::Function,
                mode: SignalMode::Plain,
                span,
                signal: SignalId::INVALID,
            },
        );

        self.scopes.push(FxHashMap::default());
        let saved = self.flags;
        self.flags = ScopeFlags::FUNCTION_BODY;

        for param in params {
            self.define(
                param,
                Binding {
                    name: param,
                    kind: BindingKind::Param,
                    mode: SignalMode::Plain,
                    span,
                    signal: SignalId::INVALID,
                },
            );
        }
        self.block_in_place(body);

        self.flags = saved;
        self.scopes.pop();
    }

    fn block(&mut self, id: BlockId) {
        self.scopes.push(FxHashMap::default());
        self.block_in_place(id);
        self.scopes.pop();
    }

    /// Walk a block's contents in the current scope (used where the
    /// enclosing construct already pushed a scope holding its parameters).
    fn block_in_place(&mut self, id: BlockId) {
        let block = *self.hir.block(id);
        let stmts: Vec<StmtId> = self.hir.stmt_list(block.stmts).to_vec();
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.resolver(block.resolver);
    }

    fn resolver(&mut self, resolver: hir::Resolver) {
        match resolver {
            hir::Resolver::Empty => {}
            hir::Resolver::Expr(expr) => self.expr(expr),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond);
                self.block(then_block);
                if else_block.is_valid() {
                    self.block(else_block);
                }
            }
            hir::Resolver::For {
                binding,
                iter,
                body,
            } => self.for_body(binding, iter, body),
        }
    }

    fn for_body(&mut self, binding: Name, iter: ExprId, body: BlockId) {
        self.expr(iter);
        let span = self.hir.block(body).span;
        self.scopes.push(FxHashMap::default());
        let id = self.define(
            binding,
            Binding {
                name: binding,
                kind: BindingKind::Loop,
                mode: SignalMode::Plain,
                span,
                signal: SignalId::INVALID,
            },
        );
        self.res.loop_bindings.insert(body, id);
        self.block_in_place(body);
        self.scopes.pop();
    }

    fn stmt(&mut self, id: StmtId) {
        let stmt = *self.hir.stmt(id);
        match stmt.kind {
            StmtKind::State { name, init } => {
                self.expr(init);
                let signal = self.res.push_signal(SignalDescriptor {
                    origin: SignalOrigin::StateDecl,
                    name,
                    span: stmt.span,
                });
                let binding = self.define(
                    name,
                    Binding {
                        name,
                        kind: BindingKind::State,
                        mode: SignalMode::LiveReadwrite,
                        span: stmt.span,
                        signal,
                    },
                );
                self.res.state_bindings.insert(id, binding);
            }
            StmtKind::Decl { pattern, init, .. } => {
                self.expr(init);
                self.bind_pattern(pattern);
            }
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.expr(cond);
                self.block(then_block);
                if else_block.is_valid() {
                    self.block(else_block);
                }
            }
            StmtKind::For {
                binding,
                iter,
                body,
            } => self.for_body(binding, iter, body),
            StmtKind::Return { value } => {
                if self.flags.contains(ScopeFlags::COMPONENT_BODY) {
                    self.diagnostics.push(
                        Diagnostic::new(ErrorCode::ReturnInComponentBody)
                            .with_message(
                                "component bodies resolve to exactly one value and cannot \
                                 return early",
                            )
                            .with_label(stmt.span, "early return here"),
                    );
                }
                if value.is_valid() {
                    self.expr(value);
                }
            }
        }
    }

    fn bind_pattern(&mut self, id: PatternId) {
        let pattern = *self.hir.pattern(id);
        match pattern.kind {
            hir::PatternKind::Name { name, op } => {
                // A pattern operator rebinds an inert handle to a live
                // signal of the matching capability.
                let mode = op.map_or(SignalMode::Plain, SignalMode::live_for);
                let binding = self.define(
                    name,
                    Binding {
                        name,
                        kind: BindingKind::Var,
                        mode,
                        span: pattern.span,
                        signal: SignalId::INVALID,
                    },
                );
                self.res.pattern_bindings.insert(id, binding);
            }
            hir::PatternKind::Object { entries, rest } => {
                let entries: Vec<PatternId> = self
                    .hir
                    .pat_entries(entries)
                    .iter()
                    .map(|e| e.pattern)
                    .collect();
                for entry in entries {
                    self.bind_pattern(entry);
                }
                if rest.is_present() {
                    self.define(
                        rest,
                        Binding {
                            name: rest,
                            kind: BindingKind::Var,
                            mode: SignalMode::Plain,
                            span: pattern.span,
                            signal: SignalId::INVALID,
                        },
                    );
                }
            }
        }
    }

    fn expr(&mut self, id: ExprId) {
        ensure_sufficient_stack(|| self.expr_inner(id));
    }

    fn expr_inner(&mut self, id: ExprId) {
        use hir::ExprKind;

        let expr = *self.hir.expr(id);
        match expr.kind {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_)
            | ExprKind::Undefined => {}
            ExprKind::Ident(name) => self.ident(id, name, expr.span),
            ExprKind::Member { object, .. } => self.expr(object),
            ExprKind::Call { callee, args } => {
                self.expr(callee);
                let args: Vec<ExprId> = self.hir.expr_list(args).to_vec();
                for arg in args {
                    self.expr(arg);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Unary { operand, .. } | ExprKind::Signal { operand, .. } => {
                self.expr(operand);
            }
            ExprKind::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            ExprKind::Object { props } => {
                let values: Vec<ExprId> = self
                    .hir
                    .obj_props(props)
                    .iter()
                    .map(|p| p.value)
                    .collect();
                for value in values {
                    self.expr(value);
                }
            }
            ExprKind::SignalCtor { init } => {
                self.expr(init);
                // Anonymous cell: named only if a binding pattern captures
                // the resulting handle pair.
                self.res.push_signal(SignalDescriptor {
                    origin: SignalOrigin::Constructor,
                    name: Name::EMPTY,
                    span: expr.span,
                });
            }
            ExprKind::Effect { body } | ExprKind::Memo { body } | ExprKind::Block(body) => {
                self.block(body);
            }
            ExprKind::Template(template) => self.template(template),
        }
    }

    fn ident(&mut self, id: ExprId, name: Name, span: Span) {
        if let Some(binding) = self.lookup(name) {
            self.res.uses.insert(id, binding);
            return;
        }
        if let Some(&binding) = self.import_cache.get(&name) {
            self.res.uses.insert(id, binding);
            return;
        }
        if let Some(mode) = self.imports.get(name) {
            let binding = self.res.push_binding(Binding {
                name,
                kind: BindingKind::Import,
                mode,
                span,
                signal: SignalId::INVALID,
            });
            self.import_cache.insert(name, binding);
            self.res.uses.insert(id, binding);
            return;
        }
        self.diagnostics.push(
            Diagnostic::new(ErrorCode::UndeclaredBinding)
                .with_message(format!(
                    "`{}` is not declared in any visible scope",
                    self.interner.lookup(name)
                ))
                .with_label(span, "not found"),
        );
    }

    fn template(&mut self, id: TemplateId) {
        let template = *self.hir.template(id);
        let attr_values: Vec<ExprId> = self
            .hir
            .attrs(template.attrs)
            .iter()
            .map(|a| a.value)
            .collect();
        for value in attr_values {
            if value.is_valid() {
                self.expr(value);
            }
        }
        let children: Vec<hir::Child> = self.hir.children(template.children).to_vec();
        for child in children {
            match child {
                hir::Child::Text(_) => {}
                hir::Child::Interp(block) => self.block(block),
                hir::Child::Element(element) => self.template(element),
            }
        }
    }
}
