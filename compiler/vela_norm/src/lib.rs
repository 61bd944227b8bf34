//! AST normalization for the Vela compiler.
//!
//! Stage 1 of the pipeline: converts the externally-parsed tree
//! (`vela_ir::ast`) into the normalized arena IR (`vela_ir::hir`).
//!
//! # What happens during normalization
//!
//! 1. **Shorthand expansion**: object-literal and binding-pattern
//!    shorthand (`{ readonly x }`) becomes explicit key/value pairs with
//!    the operator attached to the value/sub-pattern.
//! 2. **Enhanced-block wrapping**: every block-like body (component and
//!    function bodies, `if`/loop bodies, `do` blocks, template `{}`
//!    containers) becomes an enhanced-expression node — an ordered
//!    statement range plus exactly one trailing resolver, defaulting to an
//!    implicit `undefined` resolver when the block ends in a
//!    non-resolving statement.
//!
//! No semantic validation occurs here; malformed shapes (a `return`
//! inside a component body, an operator on a call result) are carried
//! through for the semantic stages to diagnose.

mod normalizer;

pub use normalizer::{normalize, NormResult};

#[cfg(test)]
mod tests;
