//! Splice: a compile-time macro-expansion engine.
//!
//! Splice scans a compilation unit for function definitions whose names
//! carry a marker (default `$macro$`) and replaces every call to such a
//! definition with an inline, immediately-invoked closure, resolving the
//! macro's type parameters to the concrete types in effect at each call
//! site. Nested macro calls expand recursively, carrying the type bindings
//! accumulated by enclosing expansions. The definitions themselves are
//! erased from the output.
//!
//! The engine ([`expand`]) consumes symbol resolution and type inference
//! through the [`semantic::SemanticOracle`] trait; this crate ships a
//! reference oracle over its own small typed language ([`syntax`],
//! [`semantic`]), which is what the [`cli`] and the test suite drive.

pub use crate::diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticSink, EngineError, Severity,
};
pub use crate::engine::{expand_source, ExpansionOutcome, ExpansionPipeline};
pub use crate::expand::Config;

pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod expand;
pub mod semantic;
pub mod syntax;
