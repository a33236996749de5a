//! Semantic layer: the oracle the expansion engine consumes.
//!
//! The engine never performs symbol resolution or type inference itself; it
//! asks a [`SemanticOracle`]. This crate ships a reference oracle — the
//! [`Analysis`] produced by [`bind_unit`] — built from a hoisting binder
//! over the front-end AST, but any host that can answer the four oracle
//! questions can drive the engine.

pub mod binder;
pub mod infer;
pub mod symbols;
pub mod types;

pub use binder::{bind_unit, Analysis, Builtins};
pub use symbols::{
    BuiltinType, FunctionSig, Symbol, SymbolId, SymbolKind, SymbolTable, TypeAliasInfo,
    VariableInfo,
};
pub use types::{Prim, Property, Type};

use crate::syntax::ast::{CallExpr, Ident, TypeExpr};

/// The semantic questions the expansion engine asks of its host.
pub trait SemanticOracle {
    /// The symbol an identifier occurrence binds to, if any.
    fn symbol_at(&self, ident: &Ident) -> Option<SymbolId>;

    /// Unwrap alias/re-export indirection to the declaration a symbol
    /// ultimately denotes. Must terminate on cyclic chains.
    fn root_symbol(&self, symbol: SymbolId) -> SymbolId;

    /// The resolved type arguments of a call: explicit ones when written,
    /// inferred ones otherwise. `None` when the call's signature cannot be
    /// resolved or inference fails.
    fn call_type_args(&self, call: &CallExpr) -> Option<Vec<Type>>;

    /// Canonical type-to-syntax conversion at full fidelity, with no
    /// substitution applied.
    fn type_to_syntax(&self, ty: &Type) -> TypeExpr;
}

/// Canonical symbol of an identifier occurrence: resolve, then unwrap
/// aliasing to its fixed point.
pub fn resolve_canonical(oracle: &dyn SemanticOracle, ident: &Ident) -> Option<SymbolId> {
    oracle.symbol_at(ident).map(|s| oracle.root_symbol(s))
}

impl SemanticOracle for Analysis {
    fn symbol_at(&self, ident: &Ident) -> Option<SymbolId> {
        self.lookup_ident(ident)
    }

    fn root_symbol(&self, symbol: SymbolId) -> SymbolId {
        self.table().root(symbol)
    }

    fn call_type_args(&self, call: &CallExpr) -> Option<Vec<Type>> {
        self.infer_call_type_args(call, 0)
    }

    fn type_to_syntax(&self, ty: &Type) -> TypeExpr {
        self.type_to_syntax_value(ty)
    }
}
