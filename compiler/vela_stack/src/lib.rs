//! Stack safety utilities for deep recursion.
//!
//! The normalizer, semantic passes, and lowering all recurse over
//! expression trees; deeply nested input (machine-generated modules,
//! pathological templates) would otherwise overflow the thread stack.
//! Wrap each recursive step in [`ensure_sufficient_stack`].
//!
//! On WASM targets this is a no-op passthrough (WASM manages its own
//! stack).

/// Minimum stack space to keep available (100KB red zone).
#[cfg(not(target_family = "wasm"))]
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
#[cfg(not(target_family = "wasm"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, additional
/// stack is allocated before calling `f`.
#[cfg(not(target_family = "wasm"))]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM passthrough.
#[cfg(target_family = "wasm")]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
