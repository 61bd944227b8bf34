use pretty_assertions::assert_eq;

use vela_ir::ast;
use vela_ir::hir::{self, Child, Item, Resolver};
use vela_ir::{BlockId, ExprId, Name, SignalMode, SignalOp, Span};

use crate::normalize;
use crate::normalizer::normalizer_for_tests;

fn n(raw: u32) -> Name {
    Name::from_raw(raw)
}

fn int(v: i64) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Int(v), Span::DUMMY)
}

fn ident(name: Name) -> ast::Expr {
    ast::Expr::new(ast::ExprKind::Ident(name), Span::DUMMY)
}

fn expr_stmt(expr: ast::Expr) -> ast::Stmt {
    ast::Stmt {
        kind: ast::StmtKind::Expr(expr),
        span: Span::DUMMY,
    }
}

fn block(stmts: Vec<ast::Stmt>) -> ast::Block {
    ast::Block {
        stmts,
        span: Span::DUMMY,
    }
}

#[test]
fn empty_block_resolves_to_undefined() {
    let mut norm = normalizer_for_tests();
    let id = norm.test_block(&ast::Block::empty(Span::DUMMY));
    let b = norm.hir().block(id);
    assert_eq!(b.resolver, Resolver::Empty);
    assert!(b.stmts.is_empty());
}

#[test]
fn trailing_expression_becomes_resolver() {
    let mut norm = normalizer_for_tests();
    let id = norm.test_block(&block(vec![
        expr_stmt(int(1)),
        expr_stmt(int(2)),
    ]));
    let b = *norm.hir().block(id);

    // Only the leading statement stays in the statement range.
    assert_eq!(norm.hir().stmt_list(b.stmts).len(), 1);
    let Resolver::Expr(value) = b.resolver else {
        panic!("expected Expr resolver, got {:?}", b.resolver);
    };
    assert_eq!(norm.hir().expr(value).kind, hir::ExprKind::Int(2));
}

#[test]
fn trailing_if_becomes_resolver() {
    let mut norm = normalizer_for_tests();
    let if_stmt = ast::Stmt {
        kind: ast::StmtKind::If(ast::IfStmt {
            cond: ast::Expr::new(ast::ExprKind::Bool(true), Span::DUMMY),
            then_body: block(vec![expr_stmt(int(1))]),
            else_body: None,
        }),
        span: Span::DUMMY,
    };
    let id = norm.test_block(&block(vec![if_stmt]));
    let b = *norm.hir().block(id);

    assert!(norm.hir().stmt_list(b.stmts).is_empty());
    let Resolver::If {
        then_block,
        else_block,
        ..
    } = b.resolver
    else {
        panic!("expected If resolver, got {:?}", b.resolver);
    };
    // Missing else branch resolves to undefined.
    assert_eq!(else_block, BlockId::INVALID);
    let Resolver::Expr(value) = norm.hir().block(then_block).resolver else {
        panic!("then branch should resolve to its trailing expression");
    };
    assert_eq!(norm.hir().expr(value).kind, hir::ExprKind::Int(1));
}

#[test]
fn trailing_for_becomes_resolver() {
    let mut norm = normalizer_for_tests();
    let for_stmt = ast::Stmt {
        kind: ast::StmtKind::For(ast::ForStmt {
            binding: n(1),
            iter: ident(n(2)),
            body: block(vec![expr_stmt(ident(n(1)))]),
        }),
        span: Span::DUMMY,
    };
    let id = norm.test_block(&block(vec![for_stmt]));

    let Resolver::For { binding, .. } = norm.hir().block(id).resolver else {
        panic!("expected For resolver");
    };
    assert_eq!(binding, n(1));
}

#[test]
fn non_trailing_control_flow_stays_a_statement() {
    let mut norm = normalizer_for_tests();
    let if_stmt = ast::Stmt {
        kind: ast::StmtKind::If(ast::IfStmt {
            cond: ast::Expr::new(ast::ExprKind::Bool(true), Span::DUMMY),
            then_body: block(vec![]),
            else_body: None,
        }),
        span: Span::DUMMY,
    };
    let id = norm.test_block(&block(vec![if_stmt, expr_stmt(int(3))]));
    let b = *norm.hir().block(id);

    let stmts = norm.hir().stmt_list(b.stmts);
    assert_eq!(stmts.len(), 1);
    assert!(matches!(
        norm.hir().stmt(stmts[0]).kind,
        hir::StmtKind::If { .. }
    ));
    assert!(matches!(b.resolver, Resolver::Expr(_)));
}

#[test]
fn trailing_return_in_function_body_becomes_resolver() {
    let mut norm = normalizer_for_tests();
    let ret = ast::Stmt {
        kind: ast::StmtKind::Return(Some(int(7))),
        span: Span::DUMMY,
    };
    let id = norm.test_function_block(&block(vec![ret]));
    let b = *norm.hir().block(id);

    assert!(norm.hir().stmt_list(b.stmts).is_empty());
    let Resolver::Expr(value) = b.resolver else {
        panic!("expected Expr resolver, got {:?}", b.resolver);
    };
    assert_eq!(norm.hir().expr(value).kind, hir::ExprKind::Int(7));
}

#[test]
fn bare_trailing_return_in_function_body_resolves_empty() {
    let mut norm = normalizer_for_tests();
    let ret = ast::Stmt {
        kind: ast::StmtKind::Return(None),
        span: Span::DUMMY,
    };
    let id = norm.test_function_block(&block(vec![ret]));
    assert_eq!(norm.hir().block(id).resolver, Resolver::Empty);
}

#[test]
fn trailing_return_outside_function_body_stays_a_statement() {
    let mut norm = normalizer_for_tests();
    let ret = ast::Stmt {
        kind: ast::StmtKind::Return(Some(int(7))),
        span: Span::DUMMY,
    };
    let id = norm.test_block(&block(vec![ret]));
    let b = *norm.hir().block(id);

    assert_eq!(b.resolver, Resolver::Empty);
    let stmts = norm.hir().stmt_list(b.stmts);
    assert_eq!(stmts.len(), 1);
    assert!(matches!(
        norm.hir().stmt(stmts[0]).kind,
        hir::StmtKind::Return { .. }
    ));
}

#[test]
fn object_shorthand_expands_to_ident() {
    let mut norm = normalizer_for_tests();
    let obj = ast::Expr::new(
        ast::ExprKind::Object {
            props: vec![ast::ObjectProp {
                key: n(1),
                value: None,
                op: None,
                span: Span::DUMMY,
            }],
        },
        Span::DUMMY,
    );
    let id = norm.test_expr(&obj);

    let hir::ExprKind::Object { props } = norm.hir().expr(id).kind else {
        panic!("expected Object");
    };
    let props = norm.hir().obj_props(props);
    assert_eq!(props.len(), 1);
    assert_eq!(props[0].key, n(1));
    assert_eq!(
        norm.hir().expr(props[0].value).kind,
        hir::ExprKind::Ident(n(1))
    );
}

#[test]
fn object_operator_shorthand_expands_to_signal_expr() {
    let mut norm = normalizer_for_tests();
    let obj = ast::Expr::new(
        ast::ExprKind::Object {
            props: vec![ast::ObjectProp {
                key: n(1),
                value: None,
                op: Some(SignalOp::Readonly),
                span: Span::DUMMY,
            }],
        },
        Span::DUMMY,
    );
    let id = norm.test_expr(&obj);

    let hir::ExprKind::Object { props } = norm.hir().expr(id).kind else {
        panic!("expected Object");
    };
    let value = norm.hir().obj_props(props)[0].value;
    let hir::ExprKind::Signal { op, operand } = norm.hir().expr(value).kind else {
        panic!("expected Signal wrapper on the shorthand value");
    };
    assert_eq!(op, SignalOp::Readonly);
    assert_eq!(norm.hir().expr(operand).kind, hir::ExprKind::Ident(n(1)));
}

#[test]
fn pattern_shorthand_expands_with_operator() {
    let mut norm = normalizer_for_tests();
    let decl = ast::BindingDecl {
        pattern: ast::Pattern {
            kind: ast::PatternKind::Object {
                entries: vec![
                    ast::ObjectPatternEntry {
                        key: n(1),
                        pattern: None,
                        op: Some(SignalOp::Readwrite),
                        span: Span::DUMMY,
                    },
                    ast::ObjectPatternEntry {
                        key: n(2),
                        pattern: None,
                        op: None,
                        span: Span::DUMMY,
                    },
                ],
                rest: n(3),
            },
            span: Span::DUMMY,
        },
        init: ident(n(4)),
        mutable: false,
        span: Span::DUMMY,
    };
    let stmt = ast::Stmt {
        kind: ast::StmtKind::Binding(decl),
        span: Span::DUMMY,
    };
    let id = norm.test_block(&block(vec![stmt, expr_stmt(int(0))]));
    let b = *norm.hir().block(id);

    let stmts = norm.hir().stmt_list(b.stmts);
    let hir::StmtKind::Decl { pattern, .. } = norm.hir().stmt(stmts[0]).kind else {
        panic!("expected Decl");
    };
    let hir::PatternKind::Object { entries, rest } = norm.hir().pattern(pattern).kind else {
        panic!("expected Object pattern");
    };
    assert_eq!(rest, n(3));

    let entries = norm.hir().pat_entries(entries);
    assert_eq!(entries.len(), 2);
    assert_eq!(
        norm.hir().pattern(entries[0].pattern).kind,
        hir::PatternKind::Name {
            name: n(1),
            op: Some(SignalOp::Readwrite),
        }
    );
    assert_eq!(
        norm.hir().pattern(entries[1].pattern).kind,
        hir::PatternKind::Name {
            name: n(2),
            op: None,
        }
    );
}

#[test]
fn template_interpolation_wraps_as_enhanced_block() {
    let mut norm = normalizer_for_tests();
    let template = ast::Expr::new(
        ast::ExprKind::Template(ast::Template {
            tag: n(1),
            attrs: vec![ast::TemplateAttr {
                name: n(2),
                value: None,
                span: Span::DUMMY,
            }],
            children: vec![
                ast::TemplateChild::Text(n(3), Span::DUMMY),
                ast::TemplateChild::Interp(block(vec![expr_stmt(ident(n(4)))])),
            ],
            span: Span::DUMMY,
        }),
        Span::DUMMY,
    );
    let id = norm.test_expr(&template);

    let hir::ExprKind::Template(tid) = norm.hir().expr(id).kind else {
        panic!("expected Template");
    };
    let t = *norm.hir().template(tid);

    // Bare attribute carries no value expression.
    let attrs = norm.hir().attrs(t.attrs);
    assert_eq!(attrs[0].value, ExprId::INVALID);

    let children = norm.hir().children(t.children);
    assert_eq!(children[0], Child::Text(n(3)));
    let Child::Interp(bid) = children[1] else {
        panic!("expected Interp child");
    };
    let Resolver::Expr(value) = norm.hir().block(bid).resolver else {
        panic!("interpolation should resolve to its trailing expression");
    };
    assert_eq!(norm.hir().expr(value).kind, hir::ExprKind::Ident(n(4)));
}

#[test]
fn normalize_module_items_and_prop_modes() {
    let module = ast::Module {
        name: n(1),
        items: vec![
            ast::Item {
                kind: ast::ItemKind::State(ast::StateDecl {
                    name: n(2),
                    init: int(0),
                    span: Span::DUMMY,
                }),
                span: Span::DUMMY,
            },
            ast::Item {
                kind: ast::ItemKind::Component(ast::ComponentDef {
                    name: n(3),
                    type_params: vec![],
                    props: vec![
                        ast::PropDecl {
                            name: n(4),
                            alias: Name::EMPTY,
                            default: None,
                            is_rest: false,
                            op: None,
                            span: Span::DUMMY,
                        },
                        ast::PropDecl {
                            name: n(5),
                            alias: Name::EMPTY,
                            default: Some(int(1)),
                            is_rest: false,
                            op: Some(SignalOp::Readwrite),
                            span: Span::DUMMY,
                        },
                        ast::PropDecl {
                            name: n(6),
                            alias: Name::EMPTY,
                            default: None,
                            is_rest: true,
                            op: None,
                            span: Span::DUMMY,
                        },
                    ],
                    body: ast::Block::empty(Span::DUMMY),
                    span: Span::DUMMY,
                }),
                span: Span::DUMMY,
            },
        ],
    };

    let result = normalize(&module);
    assert_eq!(result.module.name, n(1));
    assert_eq!(result.module.items.len(), 2);

    let Item::Stmt(state) = result.module.items[0] else {
        panic!("expected Stmt item");
    };
    assert!(matches!(
        result.hir.stmt(state).kind,
        hir::StmtKind::State { name, .. } if name == n(2)
    ));

    let Item::Component(cid) = result.module.items[1] else {
        panic!("expected Component item");
    };
    let component = result.hir.component(cid);
    let specs = result.hir.prop_specs(component.props);
    assert_eq!(specs[0].mode, SignalMode::LiveReadonly);
    assert_eq!(specs[1].mode, SignalMode::LiveReadwrite);
    assert_eq!(specs[2].mode, SignalMode::Plain);
    assert!(specs[2].is_rest);
}
