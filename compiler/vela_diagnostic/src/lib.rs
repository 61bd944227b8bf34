//! Diagnostic system for the Vela compiler.
//!
//! - Error codes for searchability ([`ErrorCode`])
//! - Structured records with source ranges and offending binding
//!   identities ([`Diagnostic`])
//! - Three-way severity: compile error / development-runtime warning /
//!   production-silent ([`Severity`])
//! - Ordered, append-only collection per compilation unit
//!   ([`DiagnosticQueue`])
//!
//! Statically provable violations are `CompileError` and block code
//! generation for the containing module only. Violations that static
//! information cannot decide are downgraded: the code generator emits a
//! development-build runtime guard (`DevRuntimeWarning`) that is compiled
//! out entirely in production builds (`ProdSilent`).

mod diagnostic;
mod error_code;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::DiagnosticQueue;
