//! Macro registry: canonical symbol → definition.
//!
//! Built by the search pass, sealed before the expansion pass starts, and
//! discarded with the run. Sealing is the handoff that enforces stage
//! order: the splicer refuses to run against an unsealed registry.

use std::collections::HashMap;

use crate::expand::definition::MacroDefinition;
use crate::semantic::SymbolId;

#[derive(Debug, Default)]
pub struct MacroRegistry {
    macros: HashMap<SymbolId, MacroDefinition>,
    sealed: bool,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its canonical symbol.
    ///
    /// Returns the previously registered definition when the symbol was
    /// already taken (cannot happen for symbols from a single binder run,
    /// since each declaration interns a fresh symbol).
    pub fn register(&mut self, definition: MacroDefinition) -> Option<MacroDefinition> {
        debug_assert!(!self.sealed, "registering into a sealed registry");
        self.macros.insert(definition.symbol, definition)
    }

    /// Freeze the registry; expansion only runs against a sealed registry.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn lookup(&self, symbol: SymbolId) -> Option<&MacroDefinition> {
        self.macros.get(&symbol)
    }

    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.macros.contains_key(&symbol)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Names of the registered macros, in no particular order; registry
    /// contents are never enumerated into output syntax.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.values().map(|def| def.name.as_str())
    }
}
