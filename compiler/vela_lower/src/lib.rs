//! Enhanced-expression lowering.
//!
//! Stage 5 of the pipeline: computes one [`BlockPlan`] per enhanced block
//! by propagating *consumers* top-down — who uses each block's resolved
//! value — and combining that with the tracking facts from semantic
//! analysis:
//!
//! - tracked + value consumed ⇒ [`Wrapper::Memo`]
//! - tracked + value discarded ⇒ [`Wrapper::Effect`]
//! - untracked, or executing inside an enclosing wrapper ⇒
//!   [`Wrapper::Inline`] (evaluated exactly once at construction)
//!
//! A `for`-resolver whose block feeds template content produces
//! [`ValueShape::Fragments`] — an ordered sequence of child content — while
//! the same resolver in any scalar position produces the last iteration's
//! value ([`ValueShape::Scalar`], `undefined` for zero iterations).
//!
//! Nested non-trailing blocks lower with their values discarded; only the
//! trailing resolver position carries the enclosing consumer through.

mod plan;


pub use plan::lower;
