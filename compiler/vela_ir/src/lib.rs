//! Vela IR — core data model for the Vela compiler.
//!
//! This crate contains the shared data structures for the whole pipeline:
//!
//! - [`Span`] source ranges and interned [`Name`] identifiers
//! - The external parse-tree schema ([`ast`]) — the fixed input contract
//!   filled in by an external parser
//! - The normalized arena IR ([`hir`]) — shorthand-free, with every
//!   block-like body wrapped as an enhanced-expression node
//! - Signal classification ([`SignalOp`], [`SignalMode`])
//! - Lowered reactive execution plans ([`reactive`])
//!
//! # Design
//!
//! - **Intern everything**: strings become `Name(u32)`.
//! - **Flatten everything**: internal trees use u32 indices into arenas,
//!   never `Box`; node lists are `(start, len)` ranges into side lists.
//! - Binding classification is a compile-time tag ([`SignalMode`]),
//!   resolved once and never revisited — no runtime type inspection.

pub mod ast;
pub mod hir;
mod ids;
mod interner;
mod name;
pub mod reactive;
mod signal;
mod span;

pub use ids::{
    AttrRange, BindingId, BlockId, ChildRange, ComponentId, ExprId, ExprRange, FunctionId,
    PatEntryRange, PatternId, PropRange, PropSpecRange, SignalId, StmtId, StmtRange, TemplateId,
};
pub use interner::StringInterner;
pub use name::Name;
pub use signal::{SignalMode, SignalOp};
pub use span::Span;
