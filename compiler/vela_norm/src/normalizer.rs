//! Parse tree → normalized IR rebuild.

use smallvec::SmallVec;
use vela_ir::ast;
use vela_ir::hir::{
    self, Attr, Child, Component, Hir, HirModule, Item, ObjectProp, PatEntry, PropSpec, Resolver,
};
use vela_ir::{BlockId, ExprId, PatternId, SignalMode, StmtId};
use vela_stack::ensure_sufficient_stack;

/// Result of normalizing one module.
#[derive(Debug)]
pub struct NormResult {
    pub hir: Hir,
    pub module: HirModule,
}

/// How a block treats a trailing `return` statement.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum BlockCtx {
    /// Function outermost body: a trailing `return e` becomes the
    /// resolver `Expr(e)`.
    FunctionBody,
    /// Everything else: `return` stays a statement (the semantic stage
    /// owns the component-body diagnostic).
    Plain,
}

/// Normalize one parsed module into the arena IR.
#[tracing::instrument(level = "debug", skip_all, fields(items = module.items.len()))]
pub fn normalize(module: &ast::Module) -> NormResult {
    let mut n = Normalizer { hir: Hir::new() };
    let mut items = Vec::with_capacity(module.items.len());

    for item in &module.items {
        match &item.kind {
            ast::ItemKind::State(decl) => {
                items.push(Item::Stmt(n.state_stmt(decl)));
            }
            ast::ItemKind::Binding(decl) => {
                items.push(Item::Stmt(n.binding_stmt(decl)));
            }
            ast::ItemKind::Component(def) => {
                items.push(Item::Component(n.component(def)));
            }
            ast::ItemKind::Function(def) => {
                items.push(Item::Function(n.function(def)));
            }
            ast::ItemKind::Stmt(stmt) => {
                items.push(Item::Stmt(n.stmt(stmt)));
            }
        }
    }

    tracing::debug!(
        exprs = n.hir.expr_count(),
        blocks = n.hir.block_count(),
        "normalized module"
    );

    NormResult {
        hir: n.hir,
        module: HirModule {
            name: module.name,
            items,
        },
    }
}

pub(crate) struct Normalizer {
    hir: Hir,
}

impl Normalizer {
    fn state_stmt(&mut self, decl: &ast::StateDecl) -> StmtId {
        let init = self.expr(&decl.init);
        self.hir.push_stmt(
            hir::StmtKind::State {
                name: decl.name,
                init,
            },
            decl.span,
        )
    }

    fn binding_stmt(&mut self, decl: &ast::BindingDecl) -> StmtId {
        let init = self.expr(&decl.init);
        let pattern = self.pattern(&decl.pattern);
        self.hir.push_stmt(
            hir::StmtKind::Decl {
                pattern,
                init,
                mutable: decl.mutable,
            },
            decl.span,
        )
    }

    fn component(&mut self, def: &ast::ComponentDef) -> vela_ir::ComponentId {
        let mut specs = Vec::with_capacity(def.props.len());
        for prop in &def.props {
            let default = prop
                .default
                .as_ref()
                .map_or(ExprId::INVALID, |e| self.expr(e));
            // Parameters are addressable like read-tracked values by
            // default; a `readwrite` pattern upgrades them, a rest
            // parameter binds a plain collection.
            let mode = if prop.is_rest {
                SignalMode::Plain
            } else {
                match prop.op {
                    Some(op) => SignalMode::live_for(op),
                    None => SignalMode::LiveReadonly,
                }
            };
            specs.push(PropSpec {
                name: prop.name,
                alias: prop.alias,
                default,
                is_rest: prop.is_rest,
                mode,
                span: prop.span,
            });
        }
        let props = self.hir.alloc_prop_specs(specs);
        let body = self.block(&def.body, BlockCtx::Plain);
        self.hir.push_component(Component {
            name: def.name,
            type_params: SmallVec::from_slice(&def.type_params),
            props,
            body,
            span: def.span,
        })
    }

    fn function(&mut self, def: &ast::FunctionDef) -> vela_ir::FunctionId {
        let body = self.block(&def.body, BlockCtx::FunctionBody);
        self.hir.push_function(hir::Function {
            name: def.name,
            params: SmallVec::from_slice(&def.params),
            body,
            span: def.span,
        })
    }

    /// Wrap a statement list as an enhanced-expression node: the trailing
    /// statement becomes the resolver when it is value-producing.
    fn block(&mut self, block: &ast::Block, ctx: BlockCtx) -> BlockId {
        let mut resolver = Resolver::Empty;
        let mut stmt_ids = Vec::with_capacity(block.stmts.len());

        let (trailing, leading) = match block.stmts.split_last() {
            Some((t, rest)) => (Some(t), rest),
            None => (None, &block.stmts[..]),
        };

        for stmt in leading {
            let id = self.stmt(stmt);
            stmt_ids.push(id);
        }

        if let Some(stmt) = trailing {
            match &stmt.kind {
                ast::StmtKind::Expr(expr) => {
                    resolver = Resolver::Expr(self.expr(expr));
                }
                ast::StmtKind::If(if_stmt) => {
                    let cond = self.expr(&if_stmt.cond);
                    let then_block = self.block(&if_stmt.then_body, BlockCtx::Plain);
                    let else_block = if_stmt
                        .else_body
                        .as_ref()
                        .map_or(BlockId::INVALID, |b| self.block(b, BlockCtx::Plain));
                    resolver = Resolver::If {
                        cond,
                        then_block,
                        else_block,
                    };
                }
                ast::StmtKind::For(for_stmt) => {
                    let iter = self.expr(&for_stmt.iter);
                    let body = self.block(&for_stmt.body, BlockCtx::Plain);
                    resolver = Resolver::For {
                        binding: for_stmt.binding,
                        iter,
                        body,
                    };
                }
                ast::StmtKind::Return(value) if ctx == BlockCtx::FunctionBody => {
                    resolver = match value {
                        Some(expr) => Resolver::Expr(self.expr(expr)),
                        None => Resolver::Empty,
                    };
                }
                _ => {
                    // Non-resolving trailing statement: keep it, the
                    // block resolves to the implicit `undefined`.
                    let id = self.stmt(stmt);
                    stmt_ids.push(id);
                }
            }
        }

        let stmts = self.hir.alloc_stmt_list(stmt_ids);
        self.hir.push_block(hir::Block {
            stmts,
            resolver,
            span: block.span,
        })
    }

    fn stmt(&mut self, stmt: &ast::Stmt) -> StmtId {
        match &stmt.kind {
            ast::StmtKind::State(decl) => self.state_stmt(decl),
            ast::StmtKind::Binding(decl) => self.binding_stmt(decl),
            ast::StmtKind::Expr(expr) => {
                let id = self.expr(expr);
                self.hir.push_stmt(hir::StmtKind::Expr(id), stmt.span)
            }
            ast::StmtKind::If(if_stmt) => {
                let cond = self.expr(&if_stmt.cond);
                let then_block = self.block(&if_stmt.then_body, BlockCtx::Plain);
                let else_block = if_stmt
                    .else_body
                    .as_ref()
                    .map_or(BlockId::INVALID, |b| self.block(b, BlockCtx::Plain));
                self.hir.push_stmt(
                    hir::StmtKind::If {
                        cond,
                        then_block,
                        else_block,
                    },
                    stmt.span,
                )
            }
            ast::StmtKind::For(for_stmt) => {
                let iter = self.expr(&for_stmt.iter);
                let body = self.block(&for_stmt.body, BlockCtx::Plain);
                self.hir.push_stmt(
                    hir::StmtKind::For {
                        binding: for_stmt.binding,
                        iter,
                        body,
                    },
                    stmt.span,
                )
            }
            ast::StmtKind::Return(value) => {
                let value = value.as_ref().map_or(ExprId::INVALID, |e| self.expr(e));
                self.hir
                    .push_stmt(hir::StmtKind::Return { value }, stmt.span)
            }
        }
    }

    fn expr(&mut self, expr: &ast::Expr) -> ExprId {
        ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &ast::Expr) -> ExprId {
        let span = expr.span;
        match &expr.kind {
            ast::ExprKind::Int(v) => self.hir.push_expr(hir::ExprKind::Int(*v), span),
            ast::ExprKind::Float(bits) => self.hir.push_expr(hir::ExprKind::Float(*bits), span),
            ast::ExprKind::Bool(v) => self.hir.push_expr(hir::ExprKind::Bool(*v), span),
            ast::ExprKind::Str(name) => self.hir.push_expr(hir::ExprKind::Str(*name), span),
            ast::ExprKind::Undefined => self.hir.push_expr(hir::ExprKind::Undefined, span),
            ast::ExprKind::Ident(name) => self.hir.push_expr(hir::ExprKind::Ident(*name), span),
            ast::ExprKind::Member { object, property } => {
                let object = self.expr(object);
                self.hir.push_expr(
                    hir::ExprKind::Member {
                        object,
                        property: *property,
                    },
                    span,
                )
            }
            ast::ExprKind::Call { callee, args } => {
                let callee = self.expr(callee);
                let arg_ids: Vec<ExprId> = args.iter().map(|a| self.expr(a)).collect();
                let args = self.hir.alloc_expr_list(arg_ids);
                self.hir
                    .push_expr(hir::ExprKind::Call { callee, args }, span)
            }
            ast::ExprKind::Binary { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                self.hir.push_expr(
                    hir::ExprKind::Binary {
                        op: *op,
                        left,
                        right,
                    },
                    span,
                )
            }
            ast::ExprKind::Unary { op, operand } => {
                let operand = self.expr(operand);
                self.hir
                    .push_expr(hir::ExprKind::Unary { op: *op, operand }, span)
            }
            ast::ExprKind::Signal { op, operand } => {
                let operand = self.expr(operand);
                self.hir
                    .push_expr(hir::ExprKind::Signal { op: *op, operand }, span)
            }
            ast::ExprKind::Assign { target, op, value } => {
                let target = self.expr(target);
                let value = self.expr(value);
                self.hir.push_expr(
                    hir::ExprKind::Assign {
                        target,
                        op: *op,
                        value,
                    },
                    span,
                )
            }
            ast::ExprKind::Object { props } => {
                let mut normalized = Vec::with_capacity(props.len());
                for prop in props {
                    let value = self.object_prop_value(prop);
                    normalized.push(ObjectProp {
                        key: prop.key,
                        value,
                        span: prop.span,
                    });
                }
                let props = self.hir.alloc_obj_props(normalized);
                self.hir.push_expr(hir::ExprKind::Object { props }, span)
            }
            ast::ExprKind::SignalCtor { init } => {
                let init = self.expr(init);
                self.hir.push_expr(hir::ExprKind::SignalCtor { init }, span)
            }
            ast::ExprKind::Effect { body } => {
                let body = self.block(body, BlockCtx::Plain);
                self.hir.push_expr(hir::ExprKind::Effect { body }, span)
            }
            ast::ExprKind::Memo { body } => {
                let body = self.block(body, BlockCtx::Plain);
                self.hir.push_expr(hir::ExprKind::Memo { body }, span)
            }
            ast::ExprKind::Do { body } => {
                let body = self.block(body, BlockCtx::Plain);
                self.hir.push_expr(hir::ExprKind::Block(body), span)
            }
            ast::ExprKind::Template(template) => {
                let id = self.template(template);
                self.hir.push_expr(hir::ExprKind::Template(id), span)
            }
        }
    }

    /// Expand object-literal shorthand: `{ x }` → `{ x: x }`,
    /// `{ readonly x }` → `{ x: readonly x }`.
    fn object_prop_value(&mut self, prop: &ast::ObjectProp) -> ExprId {
        match &prop.value {
            Some(expr) => self.expr(expr),
            None => {
                let ident = self.hir.push_expr(hir::ExprKind::Ident(prop.key), prop.span);
                match prop.op {
                    Some(op) => self
                        .hir
                        .push_expr(hir::ExprKind::Signal { op, operand: ident }, prop.span),
                    None => ident,
                }
            }
        }
    }

    fn pattern(&mut self, pattern: &ast::Pattern) -> PatternId {
        let kind = match &pattern.kind {
            ast::PatternKind::Name { name, op } => hir::PatternKind::Name {
                name: *name,
                op: *op,
            },
            ast::PatternKind::Object { entries, rest } => {
                let mut normalized = Vec::with_capacity(entries.len());
                for entry in entries {
                    let sub = self.pattern_entry(entry);
                    normalized.push(PatEntry {
                        key: entry.key,
                        pattern: sub,
                        span: entry.span,
                    });
                }
                let entries = self.hir.alloc_pat_entries(normalized);
                hir::PatternKind::Object {
                    entries,
                    rest: *rest,
                }
            }
        };
        self.hir.push_pattern(hir::Pattern {
            kind,
            span: pattern.span,
        })
    }

    /// Expand pattern shorthand: `{ x }` → `{ x: x }`,
    /// `{ readonly x }` → `{ x: readonly x }`.
    fn pattern_entry(&mut self, entry: &ast::ObjectPatternEntry) -> PatternId {
        match &entry.pattern {
            Some(sub) => self.pattern(sub),
            None => self.hir.push_pattern(hir::Pattern {
                kind: hir::PatternKind::Name {
                    name: entry.key,
                    op: entry.op,
                },
                span: entry.span,
            }),
        }
    }

    fn template(&mut self, template: &ast::Template) -> vela_ir::TemplateId {
        let mut attrs = Vec::with_capacity(template.attrs.len());
        for attr in &template.attrs {
            let value = attr.value.as_ref().map_or(ExprId::INVALID, |e| self.expr(e));
            attrs.push(Attr {
                name: attr.name,
                value,
                span: attr.span,
            });
        }
        let attrs = self.hir.alloc_attrs(attrs);

        let mut children = Vec::with_capacity(template.children.len());
        for child in &template.children {
            children.push(match child {
                ast::TemplateChild::Text(text, _span) => Child::Text(*text),
                ast::TemplateChild::Interp(block) => {
                    Child::Interp(self.block(block, BlockCtx::Plain))
                }
                ast::TemplateChild::Element(element) => Child::Element(self.template(element)),
            });
        }
        let children = self.hir.alloc_children(children);

        self.hir.push_template(hir::Template {
            tag: template.tag,
            attrs,
            children,
            span: template.span,
        })
    }
}

#[cfg(test)]
pub(crate) fn normalizer_for_tests() -> Normalizer {
    Normalizer { hir: Hir::new() }
}

#[cfg(test)]
impl Normalizer {
    pub(crate) fn test_block(&mut self, block: &ast::Block) -> BlockId {
        self.block(block, BlockCtx::Plain)
    }

    pub(crate) fn test_function_block(&mut self, block: &ast::Block) -> BlockId {
        self.block(block, BlockCtx::FunctionBody)
    }

    pub(crate) fn test_expr(&mut self, expr: &ast::Expr) -> ExprId {
        self.expr(expr)
    }

    pub(crate) fn hir(&self) -> &Hir {
        &self.hir
    }
}
