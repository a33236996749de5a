//! Two-tier failure model for the expansion engine.
//!
//! The engine distinguishes, strictly and everywhere:
//!
//! - **Diagnostics** ([`Diagnostic`]): non-fatal findings about the *input*
//!   (an unresolvable macro name, a type-argument mismatch). They are
//!   appended to a [`DiagnosticSink`] and processing continues; a run that
//!   produced only diagnostics still yields transformed output. The engine
//!   never formats or prints them; rendering is the host's job.
//! - **Engine errors** ([`EngineError`]): fatal failures. Either the
//!   surrounding tooling failed (parse, io) or the engine broke one of its
//!   own structural invariants, which signals a defect in the engine itself,
//!   never malformed input. These abort translation of the unit.
//!
//! Never convert one tier into the other.

use std::cell::RefCell;

use miette::{NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

use crate::syntax::ast::Span;

// ============================================================================
// NON-FATAL DIAGNOSTICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Stable identity of every diagnostic the engine can produce.
///
/// Numeric codes are part of the public surface and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticCode {
    DefinitionWithNoSymbol,
    DefinitionInsideMacro,
    DefinitionInsideGenericFunction,
    CallTypeArgumentMismatch,
    TypeParameterWithNoSymbol,
}

impl DiagnosticCode {
    pub fn number(self) -> u32 {
        match self {
            DiagnosticCode::DefinitionWithNoSymbol => 24000,
            DiagnosticCode::DefinitionInsideMacro => 24001,
            DiagnosticCode::DefinitionInsideGenericFunction => 24002,
            DiagnosticCode::CallTypeArgumentMismatch => 24010,
            DiagnosticCode::TypeParameterWithNoSymbol => 24011,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            DiagnosticCode::DefinitionWithNoSymbol => {
                "macro definition with no resolvable name symbol"
            }
            DiagnosticCode::DefinitionInsideMacro => {
                "macros cannot be defined inside another macro definition"
            }
            DiagnosticCode::DefinitionInsideGenericFunction => {
                "macros cannot be defined inside a generic function definition"
            }
            DiagnosticCode::CallTypeArgumentMismatch => {
                "macro call type arguments do not match the declared type parameters"
            }
            DiagnosticCode::TypeParameterWithNoSymbol => {
                "macro type parameter with no resolvable symbol"
            }
        }
    }

    pub fn severity(self) -> Severity {
        Severity::Error
    }
}

/// One non-fatal finding, tied to a source span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, span: Span) -> Self {
        Diagnostic {
            code,
            severity: code.severity(),
            message: code.message().to_string(),
            span,
        }
    }
}

/// Append-only collector for a whole expansion run.
///
/// Interior mutability lets the immutable `ExpansionContext` carry it; order
/// of entries is production order.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn report(&self, code: DiagnosticCode, span: Span) {
        self.push(Diagnostic::new(code, span));
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of the collected diagnostics, in production order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries.into_inner()
    }
}

// ============================================================================
// FATAL ERRORS
// ============================================================================

/// Fatal failures: tooling errors and broken engine invariants.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EngineError {
    #[error("parse error: {message}")]
    #[diagnostic(code(splice::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("{operation} failed for {path}: {reason}")]
    #[diagnostic(code(splice::io))]
    Io {
        operation: &'static str,
        path: String,
        reason: String,
    },

    #[error("macro expansion exceeded the recursion limit of {limit}")]
    #[diagnostic(
        code(splice::recursion_limit),
        help("a macro chain is expanding itself without bound; break the cycle in its definitions")
    )]
    RecursionLimit { limit: usize },

    #[error("broken expansion invariant: {message}")]
    #[diagnostic(
        code(splice::invariant),
        help("this is a defect in the expansion engine, not in the input")
    )]
    Invariant { message: String },
}

/// Convert an AST span into a miette label span.
pub fn to_source_span(span: Span) -> SourceSpan {
    let len = if span.end > span.start {
        span.end - span.start
    } else {
        1
    };
    SourceSpan::new(span.start.into(), len)
}

/// Asserts a structural invariant of the engine itself; on failure, returns
/// the fatal [`EngineError::Invariant`] from the enclosing function.
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::diagnostics::EngineError::Invariant {
                message: format!($($arg)+),
            });
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_preserves_production_order() {
        let sink = DiagnosticSink::new();
        sink.report(DiagnosticCode::DefinitionWithNoSymbol, Span::new(0, 4));
        sink.report(DiagnosticCode::CallTypeArgumentMismatch, Span::new(10, 12));
        let entries = sink.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].code, DiagnosticCode::DefinitionWithNoSymbol);
        assert_eq!(entries[1].code, DiagnosticCode::CallTypeArgumentMismatch);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DiagnosticCode::DefinitionWithNoSymbol.number(), 24000);
        assert_eq!(DiagnosticCode::DefinitionInsideMacro.number(), 24001);
        assert_eq!(DiagnosticCode::DefinitionInsideGenericFunction.number(), 24002);
        assert_eq!(DiagnosticCode::CallTypeArgumentMismatch.number(), 24010);
        assert_eq!(DiagnosticCode::TypeParameterWithNoSymbol.number(), 24011);
    }
}
