use pretty_assertions::assert_eq;

use vela_diagnostic::{ErrorCode, Severity};
use vela_ir::{ast, Name, SignalOp, Span, StringInterner};

use crate::{compile_module, CompileOptions};

fn compile(
    interner: &StringInterner,
    items: Vec<ast::Item>,
    options: &CompileOptions,
) -> crate::CompileOutput {
    let module = ast::Module {
        name: interner.intern("test"),
        items,
    };
    compile_module(&module, interner, options)
}

fn codes(output: &crate::CompileOutput) -> Vec<ErrorCode> {
    output.diagnostics.iter().map(|d| d.code).collect()
}

// AST builders

fn int(v: i64) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Int(v), Span::DUMMY)
}

fn boolean(v: bool) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Bool(v), Span::DUMMY)
}

fn string(interner: &StringInterner, s: &str) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Str(interner.intern(s)), Span::DUMMY)
}

fn ident(name: Name) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Ident(name), Span::DUMMY)
}

fn member(object: ast::Expr, property: Name) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Member {
            object: Box::new(object),
            property,
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

fn signal_op(op: SignalOp, operand: ast::Expr) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Signal {
            op,
            operand: Box::new(operand),
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

fn object(props: Vec<(Name, ast::Expr)>) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Object {
            props: props
                .into_iter()
                .map(|(key, value)| ast::ObjectProp {
                    key,
                    value: Some(value),
                    op: None,
                    span: Span::DUMMY,
                })
                .collect(),
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

fn function(name: Name, stmts: Vec<ast::Stmt>) -> ast::Item {
    ast::Item {
        kind: ast::ItemKind::Function(ast::FunctionDef {
            name,
            params: vec![],
            body: block(stmts),
            span: Span::DUMMY,
        }),
        span: Span::DUMMY,
    }
}

fn template(tag: Name, children: Vec<ast::TemplateChild>) -> ast::Expr {
    ast::Expr::new(
        ast::ExprKind::Template(ast::Template {
            tag,
            attrs: vec![],
            children,
            span: Span::DUMMY,
        }),
        Span::DUMMY,
    )
}

// Scenario: a counter incremented inside a tracked effect.

#[test]
fn counter_increment_in_effect_calls_setter_with_getter_sum() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let count = interner.intern("count");

    let effect = ast::Expr::new(
        ast::ExprKind::Effect {
            body: block(vec![expr_stmt(assign(
                ident(count),
                ast::AssignOp::AddAssign,
                int(1),
            ))]),
        },
        Span::DUMMY,
    );
    let output = compile(
        &interner,
        vec![component(
            app,
            vec![],
            vec![state(count, int(0)), expr_stmt(effect), expr_stmt(int(0))],
        )],
        &CompileOptions::default(),
    );

    assert!(output.success, "diagnostics: {:?}", output.diagnostics);
    let code = output.code.unwrap();
    assert!(
        code.contains("const [count, set$count] = createSignal(0);"),
        "{code}"
    );
    assert!(
        code.contains("createEffect(() => { set$count(count() + (1)); });"),
        "{code}"
    );
}

// Scenario: a factory's readwrite handle consumed by a readonly pattern.

#[test]
fn factory_destructuring_with_mismatched_operator_blocks_emission() {
    let interner = StringInterner::new();
    let create_counter = interner.intern("createCounter");
    let count = interner.intern("count");

    let factory = function(
        create_counter,
        vec![
            state(count, int(0)),
            ast::Stmt {
                kind: ast::StmtKind::Return(Some(object(vec![(
                    count,
                    signal_op(SignalOp::Readwrite, ident(count)),
                )]))),
                span: Span::DUMMY,
            },
        ],
    );
    let destructure = stmt_item(decl(
        ast::Pattern {
            kind: ast::PatternKind::Object {
                entries: vec![ast::ObjectPatternEntry {
                    key: count,
                    pattern: Some(name_pattern(count, Some(SignalOp::Readonly))),
                    op: None,
                    span: Span::DUMMY,
                }],
                rest: Name::EMPTY,
            },
            span: Span::DUMMY,
        },
        call(ident(create_counter), vec![]),
    ));

    let output = compile(
        &interner,
        vec![factory, destructure],
        &CompileOptions::default(),
    );

    assert!(!output.success);
    assert_eq!(output.code, None);
    assert!(codes(&output).contains(&ErrorCode::DualityMismatch));
}

// Scenario: an inert handle used as a state initializer.

#[test]
fn state_initialized_from_inert_handle_is_rejected() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");

    let output = compile(
        &interner,
        vec![
            stmt_item(state(a, string(&interner, "x"))),
            stmt_item(state(b, signal_op(SignalOp::Readwrite, ident(a)))),
        ],
        &CompileOptions::default(),
    );

    assert!(!output.success);
    assert_eq!(output.code, None);
    assert!(codes(&output).contains(&ErrorCode::InertAssignedAsSignalValue));
}

// Scenario: a member read in template content memoizes; a direct body
// statement stays setup-only under the default policy.

#[test]
fn member_interpolation_memoizes_while_body_statement_runs_inline() {
    let interner = StringInterner::new();
    let profile = interner.intern("Profile");
    let user = interner.intern("user");
    let name = interner.intern("name");
    let log = interner.intern("log");
    let div = interner.intern("div");

    let mut imports = vela_sema::ModuleExports::new();
    imports.insert(log, vela_ir::SignalMode::Plain);
    let options = CompileOptions {
        imports,
        ..CompileOptions::default()
    };

    let output = compile(
        &interner,
        vec![component(
            profile,
            vec![ast::PropDecl {
                name: user,
                alias: Name::EMPTY,
                default: None,
                is_rest: false,
                op: None,
                span: Span::DUMMY,
            }],
            vec![
                expr_stmt(call(ident(log), vec![ident(user)])),
                expr_stmt(template(
                    div,
                    vec![ast::TemplateChild::Interp(block(vec![expr_stmt(member(
                        ident(user),
                        name,
                    ))]))],
                )),
            ],
        )],
        &options,
    );

    assert!(output.success, "diagnostics: {:?}", output.diagnostics);
    // The direct statement's policy dependence is surfaced as a
    // dev-runtime warning.
    assert_eq!(
        codes(&output),
        vec![ErrorCode::AmbiguousTrackingContext],
        "diagnostics: {:?}",
        output.diagnostics
    );
    assert_eq!(output.diagnostics[0].severity, Severity::DevRuntimeWarning);
    let code = output.code.unwrap();
    // The interpolation re-reads through the getter under a memo.
    assert!(code.contains("createMemo(() => (user().name))"), "{code}");
    // The direct statement is emitted unwrapped: it runs once at setup.
    assert!(code.contains("\n  log(user());\n"), "{code}");

    // Production keeps the code and drops the warning.
    let prod = compile(
        &interner,
        vec![component(
            profile,
            vec![ast::PropDecl {
                name: user,
                alias: Name::EMPTY,
                default: None,
                is_rest: false,
                op: None,
                span: Span::DUMMY,
            }],
            vec![
                expr_stmt(call(ident(log), vec![ident(user)])),
                expr_stmt(template(
                    div,
                    vec![ast::TemplateChild::Interp(block(vec![expr_stmt(member(
                        ident(user),
                        name,
                    ))]))],
                )),
            ],
        )],
        &CompileOptions {
            production: true,
            ..options
        },
    );
    assert!(prod.success);
    assert!(prod.diagnostics.is_empty(), "{:?}", prod.diagnostics);
}

// Duality matrix: every producing/consuming operator pair.

#[test]
fn duality_diagnostic_raised_exactly_when_operators_differ() {
    for produce in [SignalOp::Readonly, SignalOp::Readwrite] {
        for consume in [SignalOp::Readonly, SignalOp::Readwrite] {
            let interner = StringInterner::new();
            let source = interner.intern("source");
            let handle = interner.intern("handle");

            let output = compile(
                &interner,
                vec![
                    stmt_item(state(source, int(0))),
                    stmt_item(decl(
                        name_pattern(handle, Some(consume)),
                        signal_op(produce, ident(source)),
                    )),
                ],
                &CompileOptions::default(),
            );

            if produce == consume {
                assert!(
                    output.success,
                    "{produce:?}/{consume:?}: {:?}",
                    output.diagnostics
                );
                assert!(output.diagnostics.is_empty());
            } else {
                assert!(!output.success, "{produce:?}/{consume:?} should mismatch");
                assert_eq!(codes(&output), vec![ErrorCode::DualityMismatch]);
            }
        }
    }
}

#[test]
fn inert_handle_as_own_write_value_is_rejected() {
    let interner = StringInterner::new();
    let x = interner.intern("x");

    let output = compile(
        &interner,
        vec![
            stmt_item(state(x, int(0))),
            stmt_item(expr_stmt(assign(
                ident(x),
                ast::AssignOp::Assign,
                signal_op(SignalOp::Readwrite, ident(x)),
            ))),
        ],
        &CompileOptions::default(),
    );

    assert!(!output.success);
    assert!(codes(&output).contains(&ErrorCode::InertAssignedAsSignalValue));
}

#[test]
fn empty_component_body_resolves_to_undefined() {
    let interner = StringInterner::new();
    let empty = interner.intern("Empty");

    let output = compile(
        &interner,
        vec![component(empty, vec![], vec![])],
        &CompileOptions::default(),
    );

    assert!(output.success, "diagnostics: {:?}", output.diagnostics);
    let code = output.code.unwrap();
    assert!(code.contains("function Empty(props) {"), "{code}");
    // No resolver, no return: the body falls through to `undefined`.
    assert!(!code.contains("return"), "{code}");
}

#[test]
fn trailing_if_without_else_resolves_to_undefined_branch() {
    let interner = StringInterner::new();
    let gate = interner.intern("Gate");
    let flag = interner.intern("flag");

    let trailing_if = ast::Stmt {
        kind: ast::StmtKind::If(ast::IfStmt {
            cond: ident(flag),
            then_body: block(vec![expr_stmt(int(1))]),
            else_body: None,
        }),
        span: Span::DUMMY,
    };
    let output = compile(
        &interner,
        vec![component(
            gate,
            vec![],
            vec![state(flag, boolean(false)), trailing_if],
        )],
        &CompileOptions::default(),
    );

    assert!(output.success, "diagnostics: {:?}", output.diagnostics);
    let code = output.code.unwrap();
    assert!(code.contains("return ((flag()) ? 1 : undefined);"), "{code}");
}

#[test]
fn module_exports_feed_a_dependent_module() {
    let interner = StringInterner::new();
    let count = interner.intern("count");

    let producer = compile(
        &interner,
        vec![stmt_item(state(count, int(0)))],
        &CompileOptions::default(),
    );
    assert!(producer.success);
    assert_eq!(
        producer.exports.get(count),
        Some(vela_ir::SignalMode::LiveReadwrite)
    );

    let consumer = compile(
        &interner,
        vec![stmt_item(expr_stmt(assign(
            ident(count),
            ast::AssignOp::AddAssign,
            int(1),
        )))],
        &CompileOptions {
            imports: producer.exports,
            ..CompileOptions::default()
        },
    );
    assert!(consumer.success, "diagnostics: {:?}", consumer.diagnostics);
    let code = consumer.code.unwrap();
    assert!(code.contains("set$count(count() + (1));"), "{code}");
}

#[test]
fn write_to_default_mode_prop_blocks_emission() {
    let interner = StringInterner::new();
    let app = interner.intern("App");
    let user = interner.intern("user");

    // Props default to a readonly getter; no setter exists to emit.
    let output = compile(
        &interner,
        vec![component(
            app,
            vec![ast::PropDecl {
                name: user,
                alias: Name::EMPTY,
                default: None,
                is_rest: false,
                op: None,
                span: Span::DUMMY,
            }],
            vec![expr_stmt(assign(ident(user), ast::AssignOp::Assign, int(5)))],
        )],
        &CompileOptions::default(),
    );

    assert!(!output.success);
    assert_eq!(output.code, None);
    assert_eq!(codes(&output), vec![ErrorCode::DualityMismatch]);
}

#[test]
fn undeclared_binding_blocks_emission_but_not_other_checks() {
    let interner = StringInterner::new();
    let missing = interner.intern("missing");
    let a = interner.intern("a");
    let b = interner.intern("b");

    // Both violations surface from the same run.
    let output = compile(
        &interner,
        vec![
            stmt_item(expr_stmt(ident(missing))),
            stmt_item(state(a, int(0))),
            stmt_item(state(b, signal_op(SignalOp::Readwrite, ident(a)))),
        ],
        &CompileOptions::default(),
    );

    assert!(!output.success);
    assert_eq!(output.code, None);
    let codes = codes(&output);
    assert!(codes.contains(&ErrorCode::UndeclaredBinding), "{codes:?}");
    assert!(
        codes.contains(&ErrorCode::InertAssignedAsSignalValue),
        "{codes:?}"
    );
}
