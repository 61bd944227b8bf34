//! External parse-tree schema.
//!
//! This is the fixed input contract: an external parser for the extended
//! surface syntax produces one [`Module`] per compilation unit. The shapes
//! here are deliberately permissive — shorthand forms are still collapsed,
//! block bodies are plain statement lists, and malformed constructs (a
//! `return` inside a component body, an operator on a non-binding) are
//! representable. The normalizer and semantic stages own all validation.
//!
//! Unlike the internal arenas, this tree is boxed and recursive: it crosses
//! the parser boundary and is consumed exactly once.

use crate::{Name, SignalOp, Span};

/// One parsed module.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Module name (diagnostic/reporting identity, not resolved here).
    pub name: Name,
    pub items: Vec<Item>,
}

/// A top-level item.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    /// `state x = expr`
    State(StateDecl),
    /// `const`/`let` declaration with an arbitrary binding pattern.
    Binding(BindingDecl),
    /// `component Name(props) { ... }`
    Component(ComponentDef),
    /// `fn name(params) { ... }` — a plain (non-reactive) function.
    Function(FunctionDef),
    /// A bare top-level statement.
    Stmt(Stmt),
}

/// `state x = expr` — sugar for `const readwrite x = signal(expr)`.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDecl {
    pub name: Name,
    pub init: Expr,
    pub span: Span,
}

/// `const pattern = expr` / `let pattern = expr`.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingDecl {
    pub pattern: Pattern,
    pub init: Expr,
    pub mutable: bool,
    pub span: Span,
}

/// A component definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDef {
    pub name: Name,
    pub type_params: Vec<Name>,
    pub props: Vec<PropDecl>,
    pub body: Block,
    pub span: Span,
}

/// One declared component parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct PropDecl {
    pub name: Name,
    /// External alias; `Name::EMPTY` = none.
    pub alias: Name,
    /// Default value expression, usually a signal constructor for
    /// `readwrite` props.
    pub default: Option<Expr>,
    pub is_rest: bool,
    /// `Some(Readwrite)` for a `readwrite value` parameter pattern;
    /// `None` for the plain (readonly-live) default.
    pub op: Option<SignalOp>,
    pub span: Span,
}

/// A plain function definition (non-component).
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub body: Block,
    pub span: Span,
}

/// A block-like body: an ordered statement list.
///
/// The normalizer turns this into an enhanced-expression node with an
/// explicit trailing resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    /// An empty block (resolves to `undefined` after normalization).
    pub fn empty(span: Span) -> Self {
        Block {
            stmts: Vec::new(),
            span,
        }
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    State(StateDecl),
    Binding(BindingDecl),
    Expr(Expr),
    If(IfStmt),
    For(ForStmt),
    /// `return expr?` — only ever legal as a function body's trailing
    /// statement; inside component bodies it is a compile error owned by
    /// the semantic stage.
    Return(Option<Expr>),
}

/// `if cond { ... } else { ... }` — `else if` chains arrive as a nested
/// `If` as the sole statement of the else block.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_body: Block,
    pub else_body: Option<Block>,
}

/// `for x in iter { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub binding: Name,
    pub iter: Expr,
    pub body: Block,
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal (stored as bits for Eq/Hash friendliness downstream).
    Float(u64),
    Bool(bool),
    /// String literal (interned).
    Str(Name),
    /// The `undefined` literal.
    Undefined,
    /// Variable reference.
    Ident(Name),
    /// Property access: `object.property`.
    Member { object: Box<Expr>, property: Name },
    /// Call: `callee(args...)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation (`!`, `-`).
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `readonly expr` / `readwrite expr` — produces an inert handle.
    Signal { op: SignalOp, operand: Box<Expr> },
    /// Assignment: `target = value`, `target += value`, ...
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// Object literal. Shorthand entries (`{ x }`, `{ readonly x }`) are
    /// represented with `value: None` and expanded by the normalizer.
    Object { props: Vec<ObjectProp> },
    /// Explicit signal constructor: `signal(init)`.
    SignalCtor { init: Box<Expr> },
    /// Explicit effect construct: `effect { ... }`.
    Effect { body: Block },
    /// Explicit memo construct: `memo { ... }`.
    Memo { body: Block },
    /// Enhanced expression used in expression position: `do { ... }`.
    Do { body: Block },
    /// Template (JSX-like) element.
    Template(Template),
}

/// One object-literal property.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectProp {
    pub key: Name,
    /// `None` = shorthand (`{ x }` or `{ readonly x }`).
    pub value: Option<Expr>,
    /// Operator on the shorthand form (`{ readonly x }`); `None` for plain
    /// shorthand and explicit entries (explicit entries carry the operator
    /// inside `value` as `ExprKind::Signal`).
    pub op: Option<SignalOp>,
    pub span: Span,
}

/// A template element: `<tag attr={...}>children</tag>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    /// Tag name. A tag matching a component definition instantiates it.
    pub tag: Name,
    pub attrs: Vec<TemplateAttr>,
    pub children: Vec<TemplateChild>,
    pub span: Span,
}

/// One template attribute. `value: None` is a bare boolean attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateAttr {
    pub name: Name,
    pub value: Option<Expr>,
    pub span: Span,
}

/// One template child.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateChild {
    /// Literal text run.
    Text(Name, Span),
    /// A `{ ... }` interpolation container. The parser supplies the raw
    /// statement list; the normalizer wraps it as an enhanced block.
    Interp(Block),
    /// A nested element.
    Element(Template),
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators (the signal operators are `ExprKind::Signal`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Assignment operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    /// The compound binary operation, if any (`+=` → `Add`).
    pub const fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
        }
    }
}

/// A binding pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// `x`, `readonly x`, `readwrite x`.
    Name { name: Name, op: Option<SignalOp> },
    /// `{ key: pattern, ..., ...rest }`. Shorthand entries have
    /// `pattern: None` (with an optional operator) and are expanded by
    /// the normalizer.
    Object {
        entries: Vec<ObjectPatternEntry>,
        /// Rest binding name; `Name::EMPTY` = none.
        rest: Name,
    },
}

/// One entry of an object binding pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPatternEntry {
    pub key: Name,
    /// `None` = shorthand (`{ x }` / `{ readonly x }`).
    pub pattern: Option<Pattern>,
    /// Operator on the shorthand form.
    pub op: Option<SignalOp>,
    pub span: Span,
}
