//! Signal operators and binding classification.
//!
//! The live/inert distinction is a compile-time tagged variant, never a
//! runtime wrapper: a binding's [`SignalMode`] is resolved once by the
//! binding resolver and consulted (immutably) by every later stage.

use std::fmt;

/// The surface `readonly` / `readwrite` operator.
///
/// Applied to a Live binding it produces an Inert handle of the matching
/// capability; used in a binding pattern it rebinds an Inert handle back
/// to a Live signal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalOp {
    Readonly,
    Readwrite,
}

impl fmt::Display for SignalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalOp::Readonly => write!(f, "readonly"),
            SignalOp::Readwrite => write!(f, "readwrite"),
        }
    }
}

/// Resolved classification of a binding.
///
/// Fixed permanently once the binding resolver assigns it; bindings are
/// never reclassified.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalMode {
    /// An ordinary value with no reactive cell behind it.
    Plain,
    /// Reads the cell's current value by mention; cannot be written.
    LiveReadonly,
    /// Reads and writes the cell's current value by mention.
    LiveReadwrite,
    /// Opaque read-only handle; must be rebound before its value is read.
    InertReadonly,
    /// Opaque read-write handle; must be rebound before use.
    InertReadwrite,
}

impl SignalMode {
    /// Whether this binding reads/writes a cell directly by mention.
    #[inline]
    pub const fn is_live(self) -> bool {
        matches!(self, SignalMode::LiveReadonly | SignalMode::LiveReadwrite)
    }

    /// Whether this binding is an opaque signal handle.
    #[inline]
    pub const fn is_inert(self) -> bool {
        matches!(self, SignalMode::InertReadonly | SignalMode::InertReadwrite)
    }

    /// Whether a live write through this binding is permitted.
    #[inline]
    pub const fn is_writable(self) -> bool {
        matches!(self, SignalMode::LiveReadwrite)
    }

    /// The capability operator this mode carries, if any.
    #[inline]
    pub const fn op(self) -> Option<SignalOp> {
        match self {
            SignalMode::Plain => None,
            SignalMode::LiveReadonly | SignalMode::InertReadonly => Some(SignalOp::Readonly),
            SignalMode::LiveReadwrite | SignalMode::InertReadwrite => Some(SignalOp::Readwrite),
        }
    }

    /// The live mode for a binding pattern using `op`.
    #[inline]
    pub const fn live_for(op: SignalOp) -> SignalMode {
        match op {
            SignalOp::Readonly => SignalMode::LiveReadonly,
            SignalOp::Readwrite => SignalMode::LiveReadwrite,
        }
    }

    /// The inert mode for a value produced by `op`.
    #[inline]
    pub const fn inert_for(op: SignalOp) -> SignalMode {
        match op {
            SignalOp::Readonly => SignalMode::InertReadonly,
            SignalOp::Readwrite => SignalMode::InertReadwrite,
        }
    }
}

impl fmt::Display for SignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalMode::Plain => write!(f, "plain"),
            SignalMode::LiveReadonly => write!(f, "live readonly"),
            SignalMode::LiveReadwrite => write!(f, "live readwrite"),
            SignalMode::InertReadonly => write!(f, "inert readonly"),
            SignalMode::InertReadwrite => write!(f, "inert readwrite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_predicates() {
        assert!(SignalMode::LiveReadwrite.is_live());
        assert!(SignalMode::LiveReadwrite.is_writable());
        assert!(!SignalMode::LiveReadonly.is_writable());
        assert!(SignalMode::InertReadonly.is_inert());
        assert!(!SignalMode::Plain.is_live());
        assert!(!SignalMode::Plain.is_inert());
    }

    #[test]
    fn mode_op_round_trip() {
        for op in [SignalOp::Readonly, SignalOp::Readwrite] {
            assert_eq!(SignalMode::live_for(op).op(), Some(op));
            assert_eq!(SignalMode::inert_for(op).op(), Some(op));
        }
        assert_eq!(SignalMode::Plain.op(), None);
    }
}
