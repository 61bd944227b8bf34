//! Module emission.
//!
//! Top-level items (declarations, components, functions) emit multi-line
//! through the [`CodeWriter`]; everything nested inside a body emits as
//! single-line statement strings, so block structure stays local to one
//! line of output.

use rustc_hash::FxHashMap;

use vela_ir::ast::{AssignOp, BinaryOp, UnaryOp};
use vela_ir::hir::{self, Child, ExprKind, Hir, HirModule, Item, PatternKind, StmtKind};
use vela_ir::reactive::{LoweredModule, ValueShape, Wrapper};
use vela_ir::{
    BlockId, ComponentId, ExprId, FunctionId, Name, PatternId, SignalMode, SignalOp, StmtId,
    StringInterner, TemplateId,
};
use vela_sema::{GuardSite, SemaResult};
use vela_stack::ensure_sufficient_stack;

use crate::writer::CodeWriter;
use crate::CodegenOptions;

/// Dev-build helper that validates a handle's shape and passes it through.
const GUARD_HELPER: &str = "$checkHandle";

pub(crate) fn emit_module(
    hir: &Hir,
    module: &HirModule,
    interner: &StringInterner,
    sema: &SemaResult,
    lowered: &LoweredModule,
    options: &CodegenOptions,
) -> String {
    let mut pattern_guards = FxHashMap::default();
    let mut attr_guards = FxHashMap::default();
    if !options.production {
        for guard in &sema.guards {
            match guard.site {
                GuardSite::Pattern(pattern) => {
                    pattern_guards.insert(pattern, guard.op);
                }
                GuardSite::Attr { template, prop } => {
                    attr_guards.insert((template, prop), guard.op);
                }
            }
        }
    }

    let mut emitter = Emitter {
        hir,
        interner,
        sema,
        lowered,
        options,
        pattern_guards,
        attr_guards,
        w: CodeWriter::new(),
        temp: 0,
    };
    emitter.module(module);
    emitter.w.finish()
}

struct Emitter<'a> {
    hir: &'a Hir,
    interner: &'a StringInterner,
    sema: &'a SemaResult,
    lowered: &'a LoweredModule,
    options: &'a CodegenOptions,
    pattern_guards: FxHashMap<PatternId, SignalOp>,
    attr_guards: FxHashMap<(TemplateId, Name), SignalOp>,
    w: CodeWriter,
    /// Counter for destructuring temporaries.
    temp: u32,
}

impl Emitter<'_> {
    fn module(&mut self, module: &HirModule) {
        if !self.pattern_guards.is_empty() || !self.attr_guards.is_empty() {
            self.guard_helper();
        }

        let mut first = true;
        for item in &module.items {
            match *item {
                Item::Stmt(id) => {
                    for line in self.stmt_lines(id) {
                        self.w.line(line);
                    }
                }
                Item::Component(id) => {
                    if !first {
                        self.w.blank();
                    }
                    self.component(id);
                }
                Item::Function(id) => {
                    if !first {
                        self.w.blank();
                    }
                    self.function(id);
                }
            }
            first = false;
        }
    }

    fn guard_helper(&mut self) {
        self.w
            .open(format!("function {GUARD_HELPER}(value, kind, name) {{"));
        self.w.line(
            "const ok = kind === \"readwrite\" ? Array.isArray(value) && value.length === 2 \
             : typeof value === \"function\";",
        );
        self.w
            .line("if (!ok) console.warn(`[vela] expected a ${kind} handle for '${name}'`);");
        self.w.line("return value;");
        self.w.close("}");
        self.w.blank();
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn setter(&self, name: Name) -> String {
        format!("set${}", self.name(name))
    }

    fn fresh_temp(&mut self) -> String {
        let id = self.temp;
        self.temp += 1;
        format!("$d{id}")
    }

    // Items

    fn component(&mut self, id: ComponentId) {
        let component = self.hir.component(id);
        let name = component.name;
        let body = component.body;
        let specs: Vec<hir::PropSpec> = self.hir.prop_specs(component.props).to_vec();

        self.w
            .open(format!("function {}(props) {{", self.name(name)));

        let has_rest = specs.iter().any(|s| s.is_rest);
        if has_rest {
            // One destructure collects the rest; named props go through
            // temporaries so live rebinding stays per-prop.
            let mut parts = Vec::new();
            for spec in specs.iter().filter(|s| !s.is_rest) {
                parts.push(format!(
                    "{}: $p_{}",
                    self.name(spec.external_name()),
                    self.name(spec.name)
                ));
            }
            let rest = specs.iter().find(|s| s.is_rest).map(|s| s.name);
            if let Some(rest) = rest {
                parts.push(format!("...{}", self.name(rest)));
            }
            self.w
                .line(format!("const {{ {} }} = props;", parts.join(", ")));
        }
        for spec in specs.iter().filter(|s| !s.is_rest) {
            let source = if has_rest {
                format!("$p_{}", self.name(spec.name))
            } else {
                format!("props.{}", self.name(spec.external_name()))
            };
            let line = self.prop_line(spec, &source);
            self.w.line(line);
        }

        let plan = self.lowered.plan(body);
        match plan.wrapper {
            Wrapper::Memo => {
                let arrow = self.block_arrow_value(body);
                let memo = self.options.runtime.create_memo.clone();
                self.w.line(format!("return {memo}({arrow});"));
            }
            _ => {
                for line in self.block_stmt_lines(body) {
                    self.w.line(line);
                }
                if !matches!(self.hir.block(body).resolver, hir::Resolver::Empty) {
                    let value = self.resolver_value(body);
                    self.w.line(format!("return {value};"));
                }
            }
        }

        self.w.close("}");
    }

    fn prop_line(&mut self, spec: &hir::PropSpec, source: &str) -> String {
        let name = self.name(spec.name);
        let default = if spec.default.is_valid() {
            Some(self.expr(spec.default))
        } else {
            None
        };
        match spec.mode {
            SignalMode::LiveReadwrite => {
                let setter = self.setter(spec.name);
                match default {
                    Some(default) => {
                        format!("const [{name}, {setter}] = {source} ?? {default};")
                    }
                    None => format!("const [{name}, {setter}] = {source};"),
                }
            }
            SignalMode::LiveReadonly => match default {
                // A plain default is lifted to a constant getter.
                Some(default) => format!("const {name} = {source} ?? (() => ({default}));"),
                None => format!("const {name} = {source};"),
            },
            _ => match default {
                Some(default) => format!("const {name} = {source} ?? ({default});"),
                None => format!("const {name} = {source};"),
            },
        }
    }

    fn function(&mut self, id: FunctionId) {
        let function = self.hir.function(id);
        let name = function.name;
        let body = function.body;
        let params: Vec<&str> = function.params.iter().map(|&p| self.name(p)).collect();

        self.w.open(format!(
            "function {}({}) {{",
            self.name(name),
            params.join(", ")
        ));
        for line in self.block_stmt_lines(body) {
            self.w.line(line);
        }
        if !matches!(self.hir.block(body).resolver, hir::Resolver::Empty) {
            let value = self.resolver_value(body);
            self.w.line(format!("return {value};"));
        }
        self.w.close("}");
    }

    // Statements

    fn stmt_lines(&mut self, id: StmtId) -> Vec<String> {
        let stmt = *self.hir.stmt(id);
        match stmt.kind {
            StmtKind::State { name, init } => {
                let init = self.expr(init);
                let getter = self.name(name);
                let setter = self.setter(name);
                let signal = &self.options.runtime.create_signal;
                vec![format!(
                    "const [{getter}, {setter}] = {signal}({init});"
                )]
            }
            StmtKind::Decl { pattern, init, .. } => {
                let init = self.expr(init);
                self.pattern_lines(pattern, &init)
            }
            StmtKind::Expr(expr) => vec![format!("{};", self.expr(expr))],
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.expr(cond);
                let then = self.block_discarded_inline(then_block);
                if else_block.is_valid() {
                    let alt = self.block_discarded_inline(else_block);
                    vec![format!("if ({cond}) {then} else {alt}")]
                } else {
                    vec![format!("if ({cond}) {then}")]
                }
            }
            StmtKind::For {
                binding,
                iter,
                body,
            } => {
                let iter = self.expr(iter);
                let block = self.block_discarded_inline(body);
                vec![format!(
                    "for (const {} of ({iter})) {block}",
                    self.name(binding)
                )]
            }
            StmtKind::Return { value } => {
                if value.is_valid() {
                    vec![format!("return {};", self.expr(value))]
                } else {
                    vec!["return;".to_owned()]
                }
            }
        }
    }

    /// Binding-pattern emission; may expand to several statements.
    fn pattern_lines(&mut self, id: PatternId, source: &str) -> Vec<String> {
        let pattern = *self.hir.pattern(id);
        match pattern.kind {
            PatternKind::Name { name, op } => {
                let source = self.guarded(id, source);
                let text = self.name(name);
                match op {
                    None | Some(SignalOp::Readonly) => {
                        // The readonly handle *is* the getter.
                        vec![format!("const {text} = {source};")]
                    }
                    Some(SignalOp::Readwrite) => {
                        let setter = self.setter(name);
                        vec![format!("const [{text}, {setter}] = {source};")]
                    }
                }
            }
            PatternKind::Object { entries, rest } => {
                let entries: Vec<hir::PatEntry> = self.hir.pat_entries(entries).to_vec();
                let plain_only = !rest.is_present()
                    && entries.iter().all(|entry| {
                        matches!(
                            self.hir.pattern(entry.pattern).kind,
                            PatternKind::Name { op: None, .. }
                        )
                    });
                if plain_only {
                    let parts: Vec<String> = entries
                        .iter()
                        .map(|entry| self.entry_key(entry))
                        .collect();
                    return vec![format!("const {{ {} }} = {source};", parts.join(", "))];
                }

                let temp = self.fresh_temp();
                let mut lines = vec![format!("const {temp} = {source};")];
                let mut parts = Vec::new();
                for entry in &entries {
                    let key = self.name(entry.key);
                    match self.hir.pattern(entry.pattern).kind {
                        PatternKind::Name { op: None, .. } => parts.push(self.entry_key(entry)),
                        _ => {
                            if rest.is_present() {
                                // A rest binding excludes only the keys the
                                // destructure lists, so handle entries get a
                                // throwaway alias there.
                                parts.push(format!("{key}: $_{key}"));
                            }
                            let prop = format!("{temp}.{key}");
                            lines.extend(self.pattern_lines(entry.pattern, &prop));
                        }
                    }
                }
                if rest.is_present() {
                    parts.push(format!("...{}", self.name(rest)));
                }
                if !parts.is_empty() {
                    lines.push(format!("const {{ {} }} = {temp};", parts.join(", ")));
                }
                lines
            }
        }
    }

    fn entry_key(&self, entry: &hir::PatEntry) -> String {
        let key = self.name(entry.key);
        match self.hir.pattern(entry.pattern).kind {
            PatternKind::Name { name, .. } if name != entry.key => {
                format!("{key}: {}", self.name(name))
            }
            _ => key.to_owned(),
        }
    }

    /// Wrap a source expression in the dev shape check when one was
    /// requested for this pattern.
    fn guarded(&self, id: PatternId, source: &str) -> String {
        match self.pattern_guards.get(&id) {
            Some(op) => {
                let name = match self.hir.pattern(id).kind {
                    PatternKind::Name { name, .. } => self.name(name),
                    PatternKind::Object { .. } => "",
                };
                format!("{GUARD_HELPER}({source}, \"{op}\", \"{name}\")")
            }
            None => source.to_owned(),
        }
    }

    // Blocks

    fn block_stmt_lines(&mut self, id: BlockId) -> Vec<String> {
        let stmts: Vec<StmtId> = self.hir.stmt_list(self.hir.block(id).stmts).to_vec();
        let mut lines = Vec::new();
        for stmt in stmts {
            lines.extend(self.stmt_lines(stmt));
        }
        lines
    }

    /// `{ ... }` with every value discarded, for statement position.
    fn block_discarded_inline(&mut self, id: BlockId) -> String {
        let mut lines = self.block_stmt_lines(id);
        match self.hir.block(id).resolver {
            hir::Resolver::Empty => {}
            hir::Resolver::Expr(expr) => lines.push(format!("{};", self.expr(expr))),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.expr(cond);
                let then = self.block_discarded_inline(then_block);
                if else_block.is_valid() {
                    let alt = self.block_discarded_inline(else_block);
                    lines.push(format!("if ({cond}) {then} else {alt}"));
                } else {
                    lines.push(format!("if ({cond}) {then}"));
                }
            }
            hir::Resolver::For {
                binding,
                iter,
                body,
            } => {
                let iter = self.expr(iter);
                let block = self.block_discarded_inline(body);
                lines.push(format!(
                    "for (const {} of ({iter})) {block}",
                    self.name(binding)
                ));
            }
        }
        if lines.is_empty() {
            "{}".to_owned()
        } else {
            format!("{{ {} }}", lines.join(" "))
        }
    }

    /// The value the block's resolver produces, as an expression.
    fn resolver_value(&mut self, id: BlockId) -> String {
        let plan = self.lowered.plan(id);
        match self.hir.block(id).resolver {
            hir::Resolver::Empty => "undefined".to_owned(),
            hir::Resolver::Expr(expr) => self.expr(expr),
            hir::Resolver::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.expr(cond);
                let then = self.block_value(then_block);
                let alt = if else_block.is_valid() {
                    self.block_value(else_block)
                } else {
                    "undefined".to_owned()
                };
                format!("(({cond}) ? {then} : {alt})")
            }
            hir::Resolver::For {
                binding,
                iter,
                body,
            } => {
                let iter = self.expr(iter);
                let binding = self.name(binding);
                if plan.shape == ValueShape::Fragments {
                    let value = self.block_value(body);
                    format!("({iter}).map(({binding}) => {value})")
                } else {
                    // Scalar position: the last iteration's value, or
                    // `undefined` for zero iterations.
                    let value = self.block_value(body);
                    format!(
                        "(() => {{ let $last; for (const {binding} of ({iter})) \
                         {{ $last = {value}; }} return $last; }})()"
                    )
                }
            }
        }
    }

    /// A block as an expression, honoring its plan's wrapper.
    fn block_value(&mut self, id: BlockId) -> String {
        ensure_sufficient_stack(|| self.block_value_inner(id))
    }

    fn block_value_inner(&mut self, id: BlockId) -> String {
        match self.lowered.plan(id).wrapper {
            Wrapper::Memo => {
                let arrow = self.block_arrow_value(id);
                format!("{}({arrow})", self.options.runtime.create_memo)
            }
            Wrapper::Effect => {
                let arrow = self.block_arrow_discard(id);
                format!("{}({arrow})", self.options.runtime.create_effect)
            }
            Wrapper::Inline => self.block_inline_value(id),
        }
    }

    fn block_inline_value(&mut self, id: BlockId) -> String {
        let lines = self.block_stmt_lines(id);
        let block = *self.hir.block(id);
        if lines.is_empty() {
            if matches!(block.resolver, hir::Resolver::Empty) {
                return "undefined".to_owned();
            }
            return self.resolver_value(id);
        }
        let value = self.resolver_value(id);
        format!("(() => {{ {} return {value}; }})()", lines.join(" "))
    }

    /// `() => value` arrow for memo wrapping.
    fn block_arrow_value(&mut self, id: BlockId) -> String {
        let lines = self.block_stmt_lines(id);
        let value = self.resolver_value(id);
        if lines.is_empty() {
            format!("() => ({value})")
        } else {
            format!("() => {{ {} return {value}; }}", lines.join(" "))
        }
    }

    /// `() => { ... }` arrow for effect wrapping (value discarded).
    fn block_arrow_discard(&mut self, id: BlockId) -> String {
        let body = self.block_discarded_inline(id);
        format!("() => {body}")
    }

    // Expressions

    fn expr(&mut self, id: ExprId) -> String {
        ensure_sufficient_stack(|| self.expr_inner(id))
    }

    fn expr_inner(&mut self, id: ExprId) -> String {
        let expr = *self.hir.expr(id);
        match expr.kind {
            ExprKind::Int(v) => v.to_string(),
            ExprKind::Float(bits) => f64::from_bits(bits).to_string(),
            ExprKind::Bool(v) => v.to_string(),
            ExprKind::Str(name) => escape_string(self.name(name)),
            ExprKind::Undefined => "undefined".to_owned(),
            ExprKind::Ident(name) => {
                let text = self.name(name);
                // A live read is a getter call at every use site.
                if self
                    .sema
                    .resolution
                    .mode_of_use(id)
                    .is_some_and(SignalMode::is_live)
                {
                    format!("{text}()")
                } else {
                    text.to_owned()
                }
            }
            ExprKind::Member { object, property } => {
                format!("{}.{}", self.expr(object), self.name(property))
            }
            ExprKind::Call { callee, args } => {
                let callee = self.expr(callee);
                let args: Vec<ExprId> = self.hir.expr_list(args).to_vec();
                let args: Vec<String> = args.into_iter().map(|arg| self.expr(arg)).collect();
                format!("{callee}({})", args.join(", "))
            }
            ExprKind::Binary { op, left, right } => {
                format!(
                    "({} {} {})",
                    self.expr(left),
                    binary_op(op),
                    self.expr(right)
                )
            }
            ExprKind::Unary { op, operand } => {
                let op = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                };
                format!("({op}{})", self.expr(operand))
            }
            ExprKind::Signal { op, operand } => self.signal_handle(op, operand),
            ExprKind::Assign { target, op, value } => self.assign(target, op, value),
            ExprKind::Object { props } => {
                let props: Vec<hir::ObjectProp> = self.hir.obj_props(props).to_vec();
                let parts: Vec<String> = props
                    .into_iter()
                    .map(|prop| {
                        let value = self.expr(prop.value);
                        format!("{}: {value}", self.name(prop.key))
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            ExprKind::SignalCtor { init } => {
                format!(
                    "{}({})",
                    self.options.runtime.create_signal,
                    self.expr(init)
                )
            }
            ExprKind::Effect { body } | ExprKind::Memo { body } | ExprKind::Block(body) => {
                self.block_value(body)
            }
            ExprKind::Template(template) => self.template(template),
        }
    }

    /// `readonly x` / `readwrite x`: the underlying getter, or the
    /// `[getter, setter]` pair. Handles are never re-wrapped, so applying
    /// the operator to an inert binding narrows or passes it through.
    fn signal_handle(&mut self, op: SignalOp, operand: ExprId) -> String {
        if let ExprKind::Ident(name) = self.hir.expr(operand).kind {
            let text = self.name(name);
            let mode = self
                .sema
                .resolution
                .mode_of_use(operand)
                .unwrap_or(SignalMode::Plain);
            return match (mode, op) {
                (SignalMode::InertReadwrite, SignalOp::Readonly) => format!("{text}[0]"),
                (mode, _) if mode.is_inert() => text.to_owned(),
                (_, SignalOp::Readonly) => text.to_owned(),
                (_, SignalOp::Readwrite) => format!("[{text}, {}]", self.setter(name)),
            };
        }
        // Non-binding targets are compile errors; emission never reaches
        // them with errors present.
        self.expr(operand)
    }

    fn assign(&mut self, target: ExprId, op: AssignOp, value: ExprId) -> String {
        // Only a readwrite live binding carries a setter; readonly live
        // writes are rejected before emission.
        let writes_signal = self
            .sema
            .resolution
            .mode_of_use(target)
            .is_some_and(SignalMode::is_writable);
        if writes_signal {
            let ExprKind::Ident(name) = self.hir.expr(target).kind else {
                return self.plain_assign(target, op, value);
            };
            let setter = self.setter(name);
            let value = self.expr(value);
            return match op.binary() {
                // Compound assignment reads the current value, then writes.
                Some(binary) => {
                    let getter = self.name(name);
                    format!("{setter}({getter}() {} ({value}))", binary_op(binary))
                }
                None => format!("{setter}({value})"),
            };
        }
        self.plain_assign(target, op, value)
    }

    fn plain_assign(&mut self, target: ExprId, op: AssignOp, value: ExprId) -> String {
        let target = self.lvalue(target);
        let value = self.expr(value);
        let op = match op {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        };
        format!("{target} {op} {value}")
    }

    /// Assignment target position: identifiers stay bare (no getter call).
    fn lvalue(&mut self, id: ExprId) -> String {
        match self.hir.expr(id).kind {
            ExprKind::Ident(name) => self.name(name).to_owned(),
            ExprKind::Member { object, property } => {
                format!("{}.{}", self.expr(object), self.name(property))
            }
            _ => self.expr(id),
        }
    }

    fn template(&mut self, id: TemplateId) -> String {
        let template = *self.hir.template(id);
        let component = self.sema.resolution.component_for_tag(template.tag);
        let tag = match component {
            // Component instantiation references the component function.
            Some(_) => self.name(template.tag).to_owned(),
            None => escape_string(self.name(template.tag)),
        };

        let attrs: Vec<hir::Attr> = self.hir.attrs(template.attrs).to_vec();
        let props = if attrs.is_empty() {
            "null".to_owned()
        } else {
            let parts: Vec<String> = attrs
                .iter()
                .map(|attr| {
                    let key = self.name(attr.name);
                    let value = if attr.value.is_valid() {
                        self.expr(attr.value)
                    } else {
                        "true".to_owned()
                    };
                    match self.attr_guards.get(&(id, attr.name)) {
                        Some(op) => {
                            format!("{key}: {GUARD_HELPER}({value}, \"{op}\", \"{key}\")")
                        }
                        None => format!("{key}: {value}"),
                    }
                })
                .collect();
            format!("{{ {} }}", parts.join(", "))
        };

        let mut parts = vec![tag, props];
        let children: Vec<Child> = self.hir.children(template.children).to_vec();
        for child in children {
            parts.push(match child {
                Child::Text(text) => escape_string(self.name(text)),
                Child::Interp(block) => self.block_value(block),
                Child::Element(element) => self.template(element),
            });
        }
        format!("{}({})", self.options.runtime.hyperscript, parts.join(", "))
    }
}

fn binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "===",
        BinaryOp::Ne => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// JavaScript string literal with the common escapes.
fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
