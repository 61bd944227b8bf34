use pretty_assertions::assert_eq;

use vela_ir::{ast, Name, SignalMode, SignalOp, Span, StringInterner};
use vela_lower::lower;
use vela_norm::normalize;
use vela_sema::{analyze, ModuleExports, SemaOptions};

use crate::{emit, CodegenOptions};

fn emit_with(
    interner: &StringInterner,
    items: Vec<ast::Item>,
    sema_options: &SemaOptions,
    options: &CodegenOptions,
) -> Option<String> {
    let module = ast::Module {
        name: interner.intern("test"),
        items,
    };
    let norm = normalize(&module);
    let sema = analyze(&norm.hir, &norm.module, interner, sema_options);
    let lowered = lower(&norm.hir, &norm.module, &sema);
    emit(&norm.hir, &norm.module, interner, &sema, &lowered, options)
}

fn emit_source(interner: &StringInterner, items: Vec<ast::Item>) -> String {
    emit_with(
        interner,
        items,
        &SemaOptions::default(),
        &CodegenOptions::default(),
    )
    .unwrap()
}

// AST builders

fn int(v: i64) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Int(v), Span::DUMMY)
}

fn ident(name: Name) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Ident(name), Span::DUMMY)
}

fn signal_op(op: SignalOp, operand: ast::Expr) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Signal {
            op,
            operand: Box::new(operand),
        },
        Span::DUMMY,
    )
}

fn call(callee: ast::Expr, args: Vec<ast::Expr>) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Call {
            callee: Box::new(callee),
            args,
        },
        Span::DUMMY,
    )
}

fn binary(op: ast::BinaryOp, left: ast::Expr, right: ast::Expr) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        Span::DUMMY,
    )
}

fn assign(target: ast::Expr, op: ast::AssignOp, value: ast::Expr) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Assign {
            target: Box::new(target),
            op,
            value: Box::new(value),
        },
        Span::DUMMY,
    )
}

fn expr_stmt(expr: ast::Expr) -> ast::Stmt {
    ast::Stmt {
        kind: ast::StmtKind::Expr(expr),
        span: Span::DUMMY,
    }
}

fn state(name: Name, init: ast::Expr) -> ast::Stmt {
    ast::Stmt {
        kind: ast::StmtKind::State(ast::StateDecl {
            name,
            init,
            span: Span::DUMMY,
        }),
        span: Span::DUMMY,
    }
}

fn decl(pattern: ast::Pattern, init: ast::Expr) -> ast::Stmt {
    ast::Stmt {
        kind: ast::StmtKind::Binding(ast::BindingDecl {
            pattern,
            init,
            mutable: false,
            span: Span::DUMMY,
        }),
        span: Span::DUMMY,
    }
}

fn name_pattern(name: Name, op: Option<SignalOp>) -> ast::Pattern {
    ast::Pattern {
        kind: ast::PatternKind::Name { name, op },
        span: Span::DUMMY,
    }
}

fn stmt_item(stmt: ast::Stmt) -> ast::Item {
    ast::Item {
        kind: ast::ItemKind::Stmt(stmt),
        span: Span::DUMMY,
    }
}

fn block(stmts: Vec<ast::Stmt>) -> ast::Block {
    ast::Block {
        stmts,
        span: Span::DUMMY,
    }
}

fn component(name: Name, props: Vec<ast::PropDecl>, stmts: Vec<ast::Stmt>) -> ast::Item {
    ast::Item {
        kind: ast::ItemKind::Component(ast::ComponentDef {
            name,
            type_params: vec![],
            props,
            body: block(stmts),
            span: Span::DUMMY,
        }),
        span: Span::DUMMY,
    }
}

fn prop(name: Name, op: Option<SignalOp>) -> ast::PropDecl {
    ast::PropDecl {
        name,
        alias: Name::EMPTY,
        default: None,
        is_rest: false,
        op,
        span: Span::DUMMY,
    }
}

fn template(
    tag: Name,
    attrs: Vec<ast::TemplateAttr>,
    children: Vec<ast::TemplateChild>,
) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Template(ast::Template {
            tag,
            attrs,
            children,
            span: Span::DUMMY,
        }),
        Span::DUMMY,
    )
}

fn attr(name: Name, value: ast::Expr) -> ast::TemplateAttr {
    ast::TemplateAttr {
        name,
        value: Some(value),
        span: Span::DUMMY,
    }
}

// Tests

#[test]
fn state_and_writes_emit_signal_pair_and_setter_calls() {
    let interner = StringInterner::new();
    let count = interner.intern("count");

    let out = emit_source(
        &interner,
        vec![
            stmt_item(state(count, int(0))),
            stmt_item(expr_stmt(assign(
                ident(count),
                ast::AssignOp::AddAssign,
                int(1),
            ))),
        ],
    );

    assert_eq!(
        out,
        "const [count, set$count] = createSignal(0);\n\
         set$count(count() + (1));\n"
    );
}

#[test]
fn live_reads_are_getter_calls_at_every_site() {
    let interner = StringInterner::new();
    let count = interner.intern("count");
    let total = interner.intern("total");

    let out = emit_source(
        &interner,
        vec![
            stmt_item(state(count, int(0))),
            stmt_item(decl(
                name_pattern(total, None),
                binary(ast::BinaryOp::Add, ident(count), ident(count)),
            )),
        ],
    );

    assert!(out.contains("const total = (count() + count());"), "{out}");
}

#[test]
fn plain_assignment_to_live_signal_uses_setter() {
    let interner = StringInterner::new();
    let count = interner.intern("count");

    let out = emit_source(
        &interner,
        vec![
            stmt_item(state(count, int(0))),
            stmt_item(expr_stmt(assign(ident(count), ast::AssignOp::Assign, int(5)))),
        ],
    );

    assert!(out.contains("set$count(5);"), "{out}");
}

#[test]
fn inert_handles_pass_through_without_wrapping() {
    let interner = StringInterner::new();
    let count = interner.intern("count");
    let view = interner.intern("view");
    let pair = interner.intern("pair");

    let out = emit_source(
        &interner,
        vec![
            stmt_item(state(count, int(0))),
            stmt_item(decl(
                name_pattern(view, Some(SignalOp::Readonly)),
                signal_op(SignalOp::Readonly, ident(count)),
            )),
            stmt_item(decl(
                name_pattern(pair, Some(SignalOp::Readwrite)),
                signal_op(SignalOp::Readwrite, ident(count)),
            )),
        ],
    );

    // The readonly handle is the getter itself; readwrite is the pair.
    assert!(out.contains("const view = count;"), "{out}");
    assert!(
        out.contains("const [pair, set$pair] = [count, set$count];"),
        "{out}"
    );
}

#[test]
fn tracked_interpolation_wraps_in_memo_inside_hyperscript() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let count = interner.intern("count");
    let div = interner.intern("div");
    let text = interner.intern("Count: ");

    let out = emit_source(
        &interner,
        vec![component(
            app,
            vec![],
            vec![
                state(count, int(0)),
                expr_stmt(template(
                    div,
                    vec![],
                    vec![
                        ast::TemplateChild::Text(text, Span::DUMMY),
                        ast::TemplateChild::Interp(block(vec![expr_stmt(ident(count))])),
                    ],
                )),
            ],
        )],
    );

    assert!(out.contains("function App(props) {"), "{out}");
    assert!(
        out.contains("return h(\"div\", null, \"Count: \", createMemo(() => (count())));"),
        "{out}"
    );
}

#[test]
fn effect_body_wraps_in_create_effect() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let count = interner.intern("count");

    let effect = ast::Expr::new(
        ast::ExprKind::Effect {
            body: block(vec![expr_stmt(ident(count))]),
        },
        Span::DUMMY,
    );
    let out = emit_source(
        &interner,
        vec![component(
            app,
            vec![],
            vec![state(count, int(0)), expr_stmt(effect), expr_stmt(int(0))],
        )],
    );

    assert!(out.contains("createEffect(() => { count(); });"), "{out}");
}

#[test]
fn for_resolver_in_template_content_emits_map() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let items = interner.intern("items");
    let it = interner.intern("it");
    let ul = interner.intern("ul");

    let loop_interp = ast::TemplateChild::Interp(block(vec![ast::Stmt {
        kind: ast::StmtKind::For(ast::ForStmt {
            binding: it,
            iter: ident(items),
            body: block(vec![expr_stmt(ident(it))]),
        }),
        span: Span::DUMMY,
    }]));

    let out = emit_source(
        &interner,
        vec![component(
            app,
            vec![],
            vec![
                state(items, int(0)),
                expr_stmt(template(ul, vec![], vec![loop_interp])),
            ],
        )],
    );

    assert!(out.contains("(items()).map((it) => it)"), "{out}");
    assert!(out.contains("createMemo("), "{out}");
}

#[test]
fn component_props_bind_per_mode() {
    let interner = StringInterner::new();
    let counter = interner.intern("Counter");
    let label = interner.intern("label");
    let value = interner.intern("value");

    let out = emit_source(
        &interner,
        vec![component(
            counter,
            vec![
                prop(label, None),
                prop(value, Some(SignalOp::Readwrite)),
            ],
            vec![expr_stmt(ident(value))],
        )],
    );

    assert!(out.contains("const label = props.label;"), "{out}");
    assert!(
        out.contains("const [value, set$value] = props.value;"),
        "{out}"
    );
    assert!(out.contains("return value();"), "{out}");
}

#[test]
fn component_instantiation_passes_handles_as_props() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let counter = interner.intern("Counter");
    let value = interner.intern("value");
    let count = interner.intern("count");

    let out = emit_source(
        &interner,
        vec![
            component(
                counter,
                vec![prop(value, Some(SignalOp::Readwrite))],
                vec![expr_stmt(ident(value))],
            ),
            component(
                app,
                vec![],
                vec![
                    state(count, int(0)),
                    expr_stmt(template(
                        counter,
                        vec![attr(value, signal_op(SignalOp::Readwrite, ident(count)))],
                        vec![],
                    )),
                ],
            ),
        ],
    );

    // Component tags reference the function; HTML tags are quoted.
    assert!(
        out.contains("h(Counter, { value: [count, set$count] })"),
        "{out}"
    );
}

#[test]
fn undecidable_rebind_guards_in_dev_and_compiles_out_in_production() {
    let interner = StringInterner::new();
    let make = interner.intern("makeCounter");
    let counter = interner.intern("counter");

    let mut imports = ModuleExports::new();
    imports.insert(make, SignalMode::Plain);
    let sema_options = SemaOptions {
        imports,
        ..SemaOptions::default()
    };
    let items = || {
        vec![stmt_item(decl(
            name_pattern(counter, Some(SignalOp::Readonly)),
            call(ident(make), vec![]),
        ))]
    };

    let dev = emit_with(
        &interner,
        items(),
        &sema_options,
        &CodegenOptions::default(),
    )
    .unwrap();
    assert!(dev.contains("function $checkHandle(value, kind, name) {"), "{dev}");
    assert!(
        dev.contains("const counter = $checkHandle(makeCounter(), \"readonly\", \"counter\");"),
        "{dev}"
    );

    let prod = emit_with(
        &interner,
        items(),
        &sema_options,
        &CodegenOptions {
            production: true,
            ..CodegenOptions::default()
        },
    )
    .unwrap();
    assert!(!prod.contains("$checkHandle"), "{prod}");
    assert!(prod.contains("const counter = makeCounter();"), "{prod}");
}

#[test]
fn emission_is_refused_when_the_module_has_errors() {
    let interner = StringInterner::new();
    let missing = interner.intern("missing");

    let out = emit_with(
        &interner,
        vec![stmt_item(expr_stmt(ident(missing)))],
        &SemaOptions::default(),
        &CodegenOptions::default(),
    );
    assert_eq!(out, None);
}

#[test]
fn functions_emit_with_trailing_return() {
    let interner = StringInterner::new();
    let add = interner.intern("add");
    let a = interner.intern("a");
    let b = interner.intern("b");

    let out = emit_source(
        &interner,
        vec![ast::Item {
            kind: ast::ItemKind::Function(ast::FunctionDef {
                name: add,
                params: vec![a, b],
                body: block(vec![expr_stmt(binary(
                    ast::BinaryOp::Add,
                    ident(a),
                    ident(b),
                ))]),
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        }],
    );

    assert!(out.contains("function add(a, b) {"), "{out}");
    assert!(out.contains("return (a + b);"), "{out}");
}
