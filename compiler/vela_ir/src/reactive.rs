//! Lowered reactive execution plans.
//!
//! Enhanced-expression lowering attaches one [`BlockPlan`] to every
//! enhanced block: how the block is wrapped for the reactive runtime, what
//! shape of value it produces, and who consumes that value. The code
//! generator reads these plans plus the normalized tree; it never
//! re-derives tracking or consumer facts.

use crate::BlockId;

/// How a block's computation is wrapped at runtime.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Wrapper {
    /// Tracked and value-consumed: wrapped in `createMemo`.
    Memo,
    /// Tracked, side effects only: wrapped in `createEffect`.
    Effect,
    /// Untracked (or executed within an enclosing wrapper): direct inline
    /// evaluation, exactly once at construction time.
    Inline,
}

/// What kind of value a block resolves to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueShape {
    /// One scalar value (the trailing resolver's value, or `undefined`).
    Scalar,
    /// An ordered sequence of template child content, produced by a
    /// `for`-resolver in template-content position (lazy, finite,
    /// restartable).
    Fragments,
}

/// Who consumes a block's resolved value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Consumer {
    /// The value becomes template child content.
    TemplateContent,
    /// The value flows into a scalar-expecting position (declaration
    /// initializer, resolver of an enclosing block, function result).
    Scalar,
    /// The value is discarded; the block runs for side effects only.
    Discarded,
}

/// The lowering verdict for one enhanced block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockPlan {
    pub wrapper: Wrapper,
    pub shape: ValueShape,
    pub consumer: Consumer,
    /// Tracking fact carried over from the classifier (justifies the
    /// wrapper choice).
    pub tracked: bool,
}

impl BlockPlan {
    /// Plan for a block that has not been classified yet.
    pub const UNPLANNED: BlockPlan = BlockPlan {
        wrapper: Wrapper::Inline,
        shape: ValueShape::Scalar,
        consumer: Consumer::Scalar,
        tracked: false,
    };
}

/// Lowered form of one module: plans for every enhanced block, indexed by
/// [`BlockId`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoweredModule {
    plans: Vec<BlockPlan>,
}

impl LoweredModule {
    /// Create with capacity for `block_count` plans, all unplanned.
    pub fn with_block_count(block_count: usize) -> Self {
        LoweredModule {
            plans: vec![BlockPlan::UNPLANNED; block_count],
        }
    }

    /// The plan for a block.
    pub fn plan(&self, id: BlockId) -> BlockPlan {
        self.plans[id.index()]
    }

    /// Record the plan for a block.
    pub fn set_plan(&mut self, id: BlockId, plan: BlockPlan) {
        self.plans[id.index()] = plan;
    }

    /// Number of planned blocks.
    pub fn block_count(&self) -> usize {
        self.plans.len()
    }
}
