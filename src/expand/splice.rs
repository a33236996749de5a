//! Expansion pass (pass two): call-site matching and splicing.
//!
//! Walks the unit a second time, independently of the search pass. A call
//! whose callee resolves to a registered canonical symbol is replaced by an
//! immediately-invoked anonymous closure built from the definition:
//!
//! 1. the binding map for the site is derived (inherited map composed with
//!    the call's own bindings);
//! 2. the definition's body is recursively expanded *first*, with the
//!    composed map as the new parent context, so nested macro calls resolve
//!    against already-composed bindings;
//! 3. definition-site comments are stripped from the expanded body;
//! 4. the closure keeps only the call-relevant modifiers (`async`, the
//!    generator marker), its parameter list and return type rewritten under
//!    the map; on a full resolution the type-parameter list is dropped;
//! 5. the invocation applies the original call's argument expressions,
//!    themselves expansion-visited under the *parent* map (they occur
//!    textually at the call site) but never type-substituted.
//!
//! The depth cap is the defensive backstop against unbounded self-recursive
//! macro chains; hitting it is a fatal error, not a diagnostic.

use crate::diagnostics::EngineError;
use crate::expand::bindings::{resolve_bindings, TypeBindings};
use crate::expand::comments::strip_block;
use crate::expand::definition::MacroDefinition;
use crate::expand::materialize::{rewrite_block_types, rewrite_param, rewrite_type_expr};
use crate::expand::registry::MacroRegistry;
use crate::expand::ExpansionContext;
use crate::invariant;
use crate::semantic::resolve_canonical;
use crate::syntax::ast::{
    Block, CallExpr, ClosureExpr, Expr, ExprKind, Span, Stmt, StmtKind, Unit,
};

/// Cap on macro-expansion nesting depth.
pub const MAX_EXPANSION_DEPTH: usize = 128;

/// Run the expansion pass over a unit. The registry must be sealed: the
/// search pass runs first, always.
pub fn expand_unit(
    unit: Unit,
    registry: &MacroRegistry,
    ctx: &ExpansionContext,
) -> Result<Unit, EngineError> {
    invariant!(
        registry.is_sealed(),
        "expansion started against an unsealed registry; the search pass must run first"
    );
    let expander = Expander { registry, ctx };
    let stmts = expander.expand_stmts(unit.stmts, &TypeBindings::new(), 0)?;
    Ok(Unit {
        stmts,
        span: unit.span,
    })
}

struct Expander<'a> {
    registry: &'a MacroRegistry,
    ctx: &'a ExpansionContext<'a>,
}

impl Expander<'_> {
    fn expand_stmts(
        &self,
        stmts: Vec<Stmt>,
        bindings: &TypeBindings,
        depth: usize,
    ) -> Result<Vec<Stmt>, EngineError> {
        stmts
            .into_iter()
            .map(|s| self.expand_stmt(s, bindings, depth))
            .collect()
    }

    fn expand_stmt(
        &self,
        stmt: Stmt,
        bindings: &TypeBindings,
        depth: usize,
    ) -> Result<Stmt, EngineError> {
        let Stmt {
            kind,
            leading_comments,
            span,
        } = stmt;
        let kind = match kind {
            StmtKind::Function(mut decl) => {
                decl.body = decl
                    .body
                    .map(|b| self.expand_block(b, bindings, depth))
                    .transpose()?;
                StmtKind::Function(decl)
            }
            StmtKind::Let(mut decl) => {
                decl.init = decl
                    .init
                    .map(|e| self.expand_expr(e, bindings, depth))
                    .transpose()?;
                StmtKind::Let(decl)
            }
            StmtKind::Return(value) => StmtKind::Return(
                value
                    .map(|e| self.expand_expr(e, bindings, depth))
                    .transpose()?,
            ),
            StmtKind::Expr(expr) => StmtKind::Expr(self.expand_expr(expr, bindings, depth)?),
            other @ (StmtKind::TypeAlias(_) | StmtKind::Alias(_)) => other,
        };
        Ok(Stmt {
            kind,
            leading_comments,
            span,
        })
    }

    fn expand_block(
        &self,
        block: Block,
        bindings: &TypeBindings,
        depth: usize,
    ) -> Result<Block, EngineError> {
        Ok(Block {
            stmts: self.expand_stmts(block.stmts, bindings, depth)?,
            span: block.span,
        })
    }

    fn expand_expr(
        &self,
        expr: Expr,
        bindings: &TypeBindings,
        depth: usize,
    ) -> Result<Expr, EngineError> {
        let Expr { kind, span } = expr;
        let kind = match kind {
            ExprKind::Call(call) => {
                if let Some(definition) = self.match_call(&call) {
                    return self.splice(call, span, definition, bindings, depth);
                }
                let mut call = call;
                call.callee = Box::new(self.expand_expr(*call.callee, bindings, depth)?);
                call.args = call
                    .args
                    .into_iter()
                    .map(|a| self.expand_expr(a, bindings, depth))
                    .collect::<Result<_, _>>()?;
                ExprKind::Call(call)
            }
            ExprKind::Array(items) => ExprKind::Array(
                items
                    .into_iter()
                    .map(|e| self.expand_expr(e, bindings, depth))
                    .collect::<Result<_, _>>()?,
            ),
            ExprKind::Member { object, property } => ExprKind::Member {
                object: Box::new(self.expand_expr(*object, bindings, depth)?),
                property,
            },
            ExprKind::Closure(mut closure) => {
                closure.body = self.expand_block(closure.body, bindings, depth)?;
                ExprKind::Closure(closure)
            }
            ExprKind::Paren(inner) => {
                ExprKind::Paren(Box::new(self.expand_expr(*inner, bindings, depth)?))
            }
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: Box::new(self.expand_expr(*lhs, bindings, depth)?),
                rhs: Box::new(self.expand_expr(*rhs, bindings, depth)?),
            },
            other @ (ExprKind::Ident(_)
            | ExprKind::Number(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)) => other,
        };
        Ok(Expr { kind, span })
    }

    /// Call-site matcher: resolve the callee to its canonical symbol and
    /// look it up in the registry. Pure lookup, no mutation.
    fn match_call(&self, call: &CallExpr) -> Option<&MacroDefinition> {
        let ExprKind::Ident(callee) = &call.callee.kind else {
            return None;
        };
        let symbol = resolve_canonical(self.ctx.oracle, callee)?;
        self.registry.lookup(symbol)
    }

    /// Build the replacement for a matched call site.
    fn splice(
        &self,
        call: CallExpr,
        call_span: Span,
        definition: &MacroDefinition,
        inherited: &TypeBindings,
        depth: usize,
    ) -> Result<Expr, EngineError> {
        if depth >= MAX_EXPANSION_DEPTH {
            return Err(EngineError::RecursionLimit {
                limit: MAX_EXPANSION_DEPTH,
            });
        }

        let resolution = resolve_bindings(&call, call_span, definition, inherited, self.ctx);

        // the definition's own body first, under the composed map
        let body = self.expand_block(definition.body.clone(), &resolution.map, depth + 1)?;
        let body = strip_block(body);

        let (params, return_type, body) = if resolution.map.is_empty() {
            (definition.params.clone(), definition.return_type.clone(), body)
        } else {
            (
                definition
                    .params
                    .iter()
                    .map(|p| rewrite_param(p, &resolution.map, self.ctx))
                    .collect(),
                definition
                    .return_type
                    .as_ref()
                    .map(|t| rewrite_type_expr(t, &resolution.map, self.ctx)),
                rewrite_block_types(&body, &resolution.map, self.ctx),
            )
        };

        // a degraded splice keeps the declared type parameters; a full
        // resolution expands them away
        let type_params = if resolution.substituted {
            Vec::new()
        } else {
            definition.type_params.clone()
        };

        let closure = ClosureExpr {
            is_async: definition.is_async,
            is_generator: definition.is_generator,
            type_params,
            params,
            return_type,
            body,
        };

        // arguments occur textually at the call site: parent map
        let args = call
            .args
            .into_iter()
            .map(|a| self.expand_expr(a, inherited, depth))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expr {
            kind: ExprKind::Call(CallExpr {
                callee: Box::new(Expr {
                    kind: ExprKind::Paren(Box::new(Expr {
                        kind: ExprKind::Closure(Box::new(closure)),
                        span: call_span,
                    })),
                    span: call_span,
                }),
                type_args: None,
                args,
            }),
            span: call_span,
        })
    }
}
