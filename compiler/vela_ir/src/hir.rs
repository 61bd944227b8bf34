//! Normalized IR.
//!
//! The AST normalizer rebuilds the external parse tree into this flat,
//! arena-allocated form. By construction it is shorthand-free and every
//! block-like body is an enhanced-expression node ([`Block`]): an ordered
//! statement range plus exactly one trailing [`Resolver`].
//!
//! Children are u32 indices, not boxes; node lists are ranges into
//! flattened side lists (same layout discipline as the expression arena
//! the parser side uses).

use smallvec::SmallVec;

use crate::ast::{AssignOp, BinaryOp, UnaryOp};
use crate::{
    AttrRange, BlockId, ChildRange, ComponentId, ExprId, ExprRange, FunctionId, Name,
    PatEntryRange, PatternId, PropRange, PropSpecRange, SignalMode, SignalOp, Span, StmtId,
    StmtRange, TemplateId,
};

/// A normalized module: ordered top-level items referencing the [`Hir`] arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HirModule {
    pub name: Name,
    pub items: Vec<Item>,
}

/// One top-level item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Item {
    Stmt(StmtId),
    Component(ComponentId),
    Function(FunctionId),
}

/// Normalized expression node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Normalized expression variants. All children are arena indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Int(i64),
    /// Float bits (kept as bits for Eq/Hash).
    Float(u64),
    Bool(bool),
    Str(Name),
    Undefined,
    Ident(Name),
    Member {
        object: ExprId,
        property: Name,
    },
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    /// `readonly e` / `readwrite e`.
    Signal {
        op: SignalOp,
        operand: ExprId,
    },
    Assign {
        target: ExprId,
        op: AssignOp,
        value: ExprId,
    },
    /// Object literal; shorthand already expanded to explicit entries.
    Object {
        props: PropRange,
    },
    /// Explicit signal constructor.
    SignalCtor {
        init: ExprId,
    },
    Effect {
        body: BlockId,
    },
    Memo {
        body: BlockId,
    },
    /// `do { ... }` enhanced expression in expression position.
    Block(BlockId),
    Template(TemplateId),
}

/// Normalized statement node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StmtKind {
    /// `state x = init`.
    State { name: Name, init: ExprId },
    /// `const`/`let` declaration.
    Decl {
        pattern: PatternId,
        init: ExprId,
        mutable: bool,
    },
    Expr(ExprId),
    /// Non-trailing `if` (value discarded).
    If {
        cond: ExprId,
        then_block: BlockId,
        /// `BlockId::INVALID` = no else branch.
        else_block: BlockId,
    },
    /// Non-trailing `for` (value discarded).
    For {
        binding: Name,
        iter: ExprId,
        body: BlockId,
    },
    /// Carried through for the semantic stage to diagnose inside
    /// component bodies. `ExprId::INVALID` = bare `return`.
    Return { value: ExprId },
}

/// An enhanced-expression node: statements plus one trailing resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub stmts: StmtRange,
    pub resolver: Resolver,
    pub span: Span,
}

/// The value-producing trailing construct of an enhanced block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolver {
    /// Implicit `undefined` (empty block, or trailing non-resolving
    /// statement).
    Empty,
    Expr(ExprId),
    If {
        cond: ExprId,
        then_block: BlockId,
        /// `BlockId::INVALID` = no else branch (resolves to `undefined`
        /// when the condition is false).
        else_block: BlockId,
    },
    For {
        binding: Name,
        iter: ExprId,
        body: BlockId,
    },
}

/// Normalized binding pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Name {
        name: Name,
        op: Option<SignalOp>,
    },
    Object {
        entries: PatEntryRange,
        /// `Name::EMPTY` = no rest binding.
        rest: Name,
    },
}

/// One object-pattern entry (shorthand already expanded).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatEntry {
    pub key: Name,
    pub pattern: PatternId,
    pub span: Span,
}

/// One object-literal property (shorthand already expanded; a shorthand
/// operator becomes a `Signal` expression in `value`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectProp {
    pub key: Name,
    pub value: ExprId,
    pub span: Span,
}

/// A template element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Template {
    pub tag: Name,
    pub attrs: AttrRange,
    pub children: ChildRange,
    pub span: Span,
}

/// One template attribute. `ExprId::INVALID` = bare boolean attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attr {
    pub name: Name,
    pub value: ExprId,
    pub span: Span,
}

/// One template child.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Child {
    Text(Name),
    /// `{ ... }` interpolation container, wrapped as an enhanced block.
    Interp(BlockId),
    Element(TemplateId),
}

/// A resolved component definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    pub name: Name,
    pub type_params: SmallVec<[Name; 2]>,
    pub props: PropSpecRange,
    pub body: BlockId,
    pub span: Span,
}

/// One component parameter spec.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropSpec {
    pub name: Name,
    /// External alias; `Name::EMPTY` = none.
    pub alias: Name,
    /// Default value expression; `ExprId::INVALID` = none.
    pub default: ExprId,
    pub is_rest: bool,
    /// Expected signal-mode of the binding inside the component body.
    pub mode: SignalMode,
    pub span: Span,
}

impl PropSpec {
    /// The name callers use for this prop (alias when present).
    pub fn external_name(&self) -> Name {
        if self.alias.is_present() {
            self.alias
        } else {
            self.name
        }
    }
}

/// A plain function definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: Name,
    pub params: SmallVec<[Name; 4]>,
    pub body: BlockId,
    pub span: Span,
}

/// The normalized-IR arena for one module.
///
/// All node families live in contiguous vectors; lists are flattened into
/// side vectors addressed by ranges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hir {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    blocks: Vec<Block>,
    patterns: Vec<Pattern>,
    templates: Vec<Template>,
    components: Vec<Component>,
    functions: Vec<Function>,

    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    obj_props: Vec<ObjectProp>,
    pat_entries: Vec<PatEntry>,
    attrs: Vec<Attr>,
    children: Vec<Child>,
    prop_specs: Vec<PropSpec>,
}

fn range_len(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("{what} list exceeds {} entries", u16::MAX))
}

impl Hir {
    pub fn new() -> Self {
        Self::default()
    }

    // Node allocation

    pub fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, span });
        id
    }

    pub fn push_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        id
    }

    pub fn push_block(&mut self, block: Block) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    pub fn push_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId::new(self.patterns.len() as u32);
        self.patterns.push(pattern);
        id
    }

    pub fn push_template(&mut self, template: Template) -> TemplateId {
        let id = TemplateId::new(self.templates.len() as u32);
        self.templates.push(template);
        id
    }

    pub fn push_component(&mut self, component: Component) -> ComponentId {
        let id = ComponentId::new(self.components.len() as u32);
        self.components.push(component);
        id
    }

    pub fn push_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::new(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    // List allocation

    pub fn alloc_expr_list(&mut self, items: Vec<ExprId>) -> ExprRange {
        let start = self.expr_lists.len() as u32;
        let len = range_len(items.len(), "expression");
        self.expr_lists.extend(items);
        ExprRange::new(start, len)
    }

    pub fn alloc_stmt_list(&mut self, items: Vec<StmtId>) -> StmtRange {
        let start = self.stmt_lists.len() as u32;
        let len = range_len(items.len(), "statement");
        self.stmt_lists.extend(items);
        StmtRange::new(start, len)
    }

    pub fn alloc_obj_props(&mut self, items: Vec<ObjectProp>) -> PropRange {
        let start = self.obj_props.len() as u32;
        let len = range_len(items.len(), "object property");
        self.obj_props.extend(items);
        PropRange::new(start, len)
    }

    pub fn alloc_pat_entries(&mut self, items: Vec<PatEntry>) -> PatEntryRange {
        let start = self.pat_entries.len() as u32;
        let len = range_len(items.len(), "pattern entry");
        self.pat_entries.extend(items);
        PatEntryRange::new(start, len)
    }

    pub fn alloc_attrs(&mut self, items: Vec<Attr>) -> AttrRange {
        let start = self.attrs.len() as u32;
        let len = range_len(items.len(), "attribute");
        self.attrs.extend(items);
        AttrRange::new(start, len)
    }

    pub fn alloc_children(&mut self, items: Vec<Child>) -> ChildRange {
        let start = self.children.len() as u32;
        let len = range_len(items.len(), "template child");
        self.children.extend(items);
        ChildRange::new(start, len)
    }

    pub fn alloc_prop_specs(&mut self, items: Vec<PropSpec>) -> PropSpecRange {
        let start = self.prop_specs.len() as u32;
        let len = range_len(items.len(), "prop spec");
        self.prop_specs.extend(items);
        PropSpecRange::new(start, len)
    }

    // Accessors

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn template(&self, id: TemplateId) -> &Template {
        &self.templates[id.index()]
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.index()]
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start as usize..range.start as usize + range.len()]
    }

    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.start as usize..range.start as usize + range.len()]
    }

    pub fn obj_props(&self, range: PropRange) -> &[ObjectProp] {
        &self.obj_props[range.start as usize..range.start as usize + range.len()]
    }

    pub fn pat_entries(&self, range: PatEntryRange) -> &[PatEntry] {
        &self.pat_entries[range.start as usize..range.start as usize + range.len()]
    }

    pub fn attrs(&self, range: AttrRange) -> &[Attr] {
        &self.attrs[range.start as usize..range.start as usize + range.len()]
    }

    pub fn children(&self, range: ChildRange) -> &[Child] {
        &self.children[range.start as usize..range.start as usize + range.len()]
    }

    pub fn prop_specs(&self, range: PropSpecRange) -> &[PropSpec] {
        &self.prop_specs[range.start as usize..range.start as usize + range.len()]
    }

    // Counts (used for pre-sizing sema side tables).

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Iterate all component ids.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> {
        (0..self.components.len() as u32).map(ComponentId::new)
    }

    /// Iterate all function ids.
    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> {
        (0..self.functions.len() as u32).map(FunctionId::new)
    }
}
