//! The expansion pipeline: search, seal, expand.
//!
//! The two passes of the engine run in a fixed order against one semantic
//! oracle. The registry is created fresh per run, sealed between the
//! passes, and discarded with the run; the diagnostic sink is the only
//! run-wide state and is returned to the caller unrendered.

use crate::diagnostics::{Diagnostic, DiagnosticSink, EngineError};
use crate::expand::{search, splice, Config, ExpansionContext, MacroRegistry};
use crate::semantic::{bind_unit, SemanticOracle};
use crate::syntax::ast::Unit;
use crate::syntax::{parser, printer};

/// Result of one run: the transformed unit plus everything the engine had
/// to say about the input. A run with only non-fatal diagnostics still
/// yields output, degraded at the offending call sites.
#[derive(Debug)]
pub struct ExpansionOutcome {
    pub unit: Unit,
    pub diagnostics: Vec<Diagnostic>,
}

/// The ordered pair of tree-to-tree stages.
#[derive(Debug, Clone, Default)]
pub struct ExpansionPipeline {
    config: Config,
}

impl ExpansionPipeline {
    pub fn new(config: Config) -> Self {
        ExpansionPipeline { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run both stages over a unit against the given oracle.
    pub fn run(
        &self,
        unit: Unit,
        oracle: &dyn SemanticOracle,
    ) -> Result<ExpansionOutcome, EngineError> {
        let sink = DiagnosticSink::new();
        let ctx = ExpansionContext::new(&self.config, oracle, &sink);

        let mut registry = MacroRegistry::new();
        let unit = search::collect_definitions(unit, &mut registry, &ctx)?;
        registry.seal();
        let unit = splice::expand_unit(unit, &registry, &ctx)?;

        Ok(ExpansionOutcome {
            unit,
            diagnostics: sink.into_entries(),
        })
    }
}

/// Parse, bind, expand and print in one step: the whole pipeline over a
/// single source string, using the reference oracle. `name` labels parse
/// diagnostics.
pub fn expand_source(
    source: &str,
    name: &str,
    config: Config,
) -> Result<(String, Vec<Diagnostic>), EngineError> {
    let unit = parser::parse(source, name)?;
    let analysis = bind_unit(&unit);
    let outcome = ExpansionPipeline::new(config).run(unit, &analysis)?;
    Ok((printer::print_unit(&outcome.unit), outcome.diagnostics))
}
