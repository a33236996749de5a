//! Shared helpers for the integration suite.

#![allow(dead_code)]

use difference::Changeset;
use splice::{expand_source, Config, Diagnostic};
use splice::syntax::{parser, printer};

/// Run the whole pipeline over a source string with default configuration.
pub fn expand(source: &str) -> (String, Vec<Diagnostic>) {
    expand_source(source, "test.spl", Config::default()).expect("expansion succeeds")
}

/// Expand and require a diagnostic-free run.
pub fn expand_clean(source: &str) -> String {
    let (output, diagnostics) = expand(source);
    assert!(
        diagnostics.is_empty(),
        "expected no diagnostics, got: {:?}",
        diagnostics
    );
    output
}

/// Normalize a source string through parse + print, so expected outputs can
/// be written in any formatting.
pub fn reprint(source: &str) -> String {
    let unit = parser::parse(source, "expected.spl").expect("expected source parses");
    printer::print_unit(&unit)
}

/// Line-based comparison with a readable diff on mismatch.
pub fn assert_same(actual: &str, expected: &str) {
    if actual != expected {
        let changeset = Changeset::new(expected, actual, "\n");
        panic!("output mismatch (expected vs actual):\n{}", changeset);
    }
}
