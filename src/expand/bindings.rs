//! Type-binding resolution for a matched macro call.
//!
//! The binding map is persistent (`im::HashMap`): each nested expansion
//! derives a child map as the union of the inherited map and its own
//! call-site bindings, the call's own entries winning on collision, and a
//! published map is never mutated again. Maps are only ever queried by
//! symbol; their contents are never enumerated into syntax.

use im::HashMap as ImHashMap;

use crate::diagnostics::DiagnosticCode;
use crate::expand::definition::MacroDefinition;
use crate::expand::materialize::materialize_type;
use crate::expand::ExpansionContext;
use crate::semantic::{resolve_canonical, SymbolId};
use crate::syntax::ast::{CallExpr, Span, TypeExpr};

/// Persistent map: type-parameter symbol → bound type expression.
pub type TypeBindings = ImHashMap<SymbolId, TypeExpr>;

/// Outcome of binding resolution at one call site.
///
/// `substituted` distinguishes a full resolution (the spliced closure drops
/// its type-parameter list) from a degraded one (a diagnostic was emitted,
/// the map is the inherited one unchanged, and the closure keeps its
/// declared type parameters, its types spliced as originally written).
#[derive(Debug, Clone)]
pub struct BindingResolution {
    pub map: TypeBindings,
    pub substituted: bool,
}

impl BindingResolution {
    fn resolved(map: TypeBindings) -> Self {
        BindingResolution {
            map,
            substituted: true,
        }
    }

    fn degraded(inherited: &TypeBindings) -> Self {
        BindingResolution {
            map: inherited.clone(),
            substituted: false,
        }
    }
}

/// Derive the binding map for a matched call site.
///
/// The inherited map is the one in effect where the call textually occurs:
/// empty at the outermost call, the enclosing expansion's composed map for
/// calls inside a macro body. Each concrete type argument is rewritten
/// through the *inherited* map before being bound, so an argument that
/// itself references an outer type parameter is fully resolved first.
pub fn resolve_bindings(
    call: &CallExpr,
    call_span: Span,
    definition: &MacroDefinition,
    inherited: &TypeBindings,
    ctx: &ExpansionContext,
) -> BindingResolution {
    if definition.type_params.is_empty() {
        return BindingResolution::resolved(inherited.clone());
    }

    let Some(type_args) = ctx.oracle.call_type_args(call) else {
        ctx.sink
            .report(DiagnosticCode::CallTypeArgumentMismatch, call_span);
        return BindingResolution::degraded(inherited);
    };
    if type_args.len() != definition.type_params.len() {
        ctx.sink
            .report(DiagnosticCode::CallTypeArgumentMismatch, call_span);
        return BindingResolution::degraded(inherited);
    }

    let param_symbols: Option<Vec<SymbolId>> = definition
        .type_params
        .iter()
        .map(|tp| resolve_canonical(ctx.oracle, &tp.name))
        .collect();
    let Some(param_symbols) = param_symbols else {
        ctx.sink
            .report(DiagnosticCode::TypeParameterWithNoSymbol, call_span);
        return BindingResolution::degraded(inherited);
    };

    let rewritten: Vec<TypeExpr> = type_args
        .iter()
        .map(|arg| materialize_type(arg, inherited, ctx))
        .collect();

    let mut map = inherited.clone();
    for (symbol, replacement) in param_symbols.into_iter().zip(rewritten) {
        map.insert(symbol, replacement);
    }
    BindingResolution::resolved(map)
}
