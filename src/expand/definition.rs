//! Macro definitions: recognition and the registered form.

use crate::diagnostics::EngineError;
use crate::expand::Config;
use crate::semantic::SymbolId;
use crate::syntax::ast::{Block, FnDecl, Param, Span, TypeExpr, TypeParam};

/// A function definition is a macro iff its name carries the configured
/// marker and it is not a body-less forward declaration.
pub fn is_macro_definition(decl: &FnDecl, config: &Config) -> bool {
    config.is_macro_name(&decl.name.name) && !decl.is_declare && decl.body.is_some()
}

/// A registered macro: the parts of its source definition that expansion
/// needs, owned by the registry and never mutated. Only the modifiers
/// relevant to the call form survive (`async`, the generator marker);
/// definition-site-only modifiers are not carried.
#[derive(Debug, Clone)]
pub struct MacroDefinition {
    pub name: String,
    pub symbol: SymbolId,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Block,
    pub span: Span,
}

impl MacroDefinition {
    /// Consume a recognized definition node. The recognition predicate
    /// guarantees a body; a body-less node reaching this point is an engine
    /// defect, not bad input.
    pub fn from_decl(decl: FnDecl, symbol: SymbolId) -> Result<Self, EngineError> {
        let Some(body) = decl.body else {
            return Err(EngineError::Invariant {
                message: format!(
                    "registered macro definition '{}' has no body",
                    decl.name.name
                ),
            });
        };
        Ok(MacroDefinition {
            name: decl.name.name,
            symbol,
            is_async: decl.is_async,
            is_generator: decl.is_generator,
            type_params: decl.type_params,
            params: decl.params,
            return_type: decl.return_type,
            body,
            span: decl.span,
        })
    }
}
