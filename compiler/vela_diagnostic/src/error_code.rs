//! Error codes for all compiler diagnostics.
//!
//! Each kind carries a stable `E####` code; the first digit indicates the
//! owning phase:
//!
//! - E1xxx: binding resolution
//! - E2xxx: duality checking
//! - E3xxx: tracking classification
//! - E4xxx: enhanced-expression structure

use std::fmt;

use crate::Severity;

/// The diagnostic taxonomy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// A name is referenced before any visible declaration in scope.
    UndeclaredBinding,
    /// `readonly`/`readwrite` applied to a non-Live binding.
    InvalidOperatorTarget,
    /// Binding-pattern operator does not match the operator that produced
    /// the consumed inert value.
    DualityMismatch,
    /// An inert value used as a `state` initializer, a signal-constructor
    /// argument, or the right-hand side of a live-signal write.
    InertAssignedAsSignalValue,
    /// An early-return construct appears inside a component body.
    ReturnInComponentBody,
    /// A construct's tracked/untracked status depends on the configured
    /// tracking policy.
    AmbiguousTrackingContext,
}

impl ErrorCode {
    /// Stable `E####` code string.
    pub const fn code(self) -> &'static str {
        match self {
            ErrorCode::UndeclaredBinding => "E1001",
            ErrorCode::InvalidOperatorTarget => "E2001",
            ErrorCode::DualityMismatch => "E2002",
            ErrorCode::InertAssignedAsSignalValue => "E2003",
            ErrorCode::ReturnInComponentBody => "E4001",
            ErrorCode::AmbiguousTrackingContext => "E3001",
        }
    }

    /// The severity this kind is reported at.
    ///
    /// Statically provable violations are compile errors; policy-dependent
    /// tracking facts are development-build warnings.
    pub const fn default_severity(self) -> Severity {
        match self {
            ErrorCode::UndeclaredBinding
            | ErrorCode::InvalidOperatorTarget
            | ErrorCode::DualityMismatch
            | ErrorCode::InertAssignedAsSignalValue
            | ErrorCode::ReturnInComponentBody => Severity::CompileError,
            ErrorCode::AmbiguousTrackingContext => Severity::DevRuntimeWarning,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
