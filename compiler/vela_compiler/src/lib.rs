//! Portable Vela compiler driver.
//!
//! Provides an IO-free compilation pipeline for one module at a time,
//! suitable for embedding in build tooling, test harnesses, and other
//! hosts that feed parsed modules in and take generated code out.
//!
//! # Usage
//!
//! ```ignore
//! use vela_compiler::{compile_module, CompileOptions};
//!
//! let output = compile_module(&module, &interner, &CompileOptions::default());
//! assert!(output.success);
//! ```
//!
//! # Architecture
//!
//! This crate sits on top of the stage crates and below any consumer:
//!
//! ```text
//! vela_ir, vela_norm, vela_sema, vela_lower, vela_codegen
//!                         ↓
//!                   vela_compiler  ← this crate
//! ```
//!
//! Compilation is synchronous and deterministic: one pass per stage, no
//! shared mutable state between modules. Cross-module information flows
//! only through the read-only import table going in and the
//! [`vela_sema::ModuleExports`] coming out.

mod output;
mod pipeline;

#[cfg(test)]
mod tests;

pub use output::CompileOutput;
pub use pipeline::{compile_module, CompileOptions};
