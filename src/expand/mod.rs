//! The two-pass macro-expansion engine.
//!
//! Pass one ([`search`]) walks the unit, consumes every function definition
//! recognized as a macro, and registers it in a [`registry::MacroRegistry`]
//! keyed by canonical symbol. Pass two ([`splice`]) matches call sites
//! against the sealed registry and replaces each with an immediately-invoked
//! closure, resolving the macro's type parameters to the concrete types in
//! effect at that site ([`bindings`], [`materialize`]) and recursing into
//! nested macro calls with the composed binding map.
//!
//! Everything an operation needs travels in one immutable
//! [`ExpansionContext`] passed by parameter — configuration, the semantic
//! oracle, and the diagnostic sink. Nothing is ambient.

pub mod bindings;
pub mod comments;
pub mod definition;
pub mod materialize;
pub mod registry;
pub mod search;
pub mod splice;

pub use bindings::{resolve_bindings, BindingResolution, TypeBindings};
pub use definition::MacroDefinition;
pub use registry::MacroRegistry;

use serde::Deserialize;

use crate::diagnostics::DiagnosticSink;
use crate::semantic::SemanticOracle;

/// Sentinel carried by macro-definition names.
pub const DEFAULT_MACRO_MARKER: &str = "$macro$";

/// Expansion configuration. The recognition marker is the only externally
/// configurable behavior of the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// A function definition whose name ends with this marker is a macro.
    pub macro_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            macro_marker: DEFAULT_MACRO_MARKER.to_string(),
        }
    }
}

impl Config {
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Config {
            macro_marker: marker.into(),
        }
    }

    /// The recognition predicate on names.
    pub fn is_macro_name(&self, name: &str) -> bool {
        !self.macro_marker.is_empty() && name.ends_with(&self.macro_marker)
    }
}

/// Everything the engine's operations need, bundled explicitly and passed
/// by parameter. Immutable for the whole run; the sink appends internally.
pub struct ExpansionContext<'a> {
    pub config: &'a Config,
    pub oracle: &'a dyn SemanticOracle,
    pub sink: &'a DiagnosticSink,
}

impl<'a> ExpansionContext<'a> {
    pub fn new(
        config: &'a Config,
        oracle: &'a dyn SemanticOracle,
        sink: &'a DiagnosticSink,
    ) -> Self {
        ExpansionContext {
            config,
            oracle,
            sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_marker_recognition() {
        let config = Config::default();
        assert!(config.is_macro_name("array$macro$"));
        assert!(!config.is_macro_name("array"));
        // the marker must be a suffix, not merely a substring
        assert!(!config.is_macro_name("array$macro$_helper"));
    }

    #[test]
    fn custom_marker() {
        let config = Config::with_marker("_inline");
        assert!(config.is_macro_name("sum_inline"));
        assert!(!config.is_macro_name("sum$macro$"));
    }
}
