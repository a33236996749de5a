//! Definition-search pass (pass one).
//!
//! Walks the whole unit once. Every recognized macro definition is consumed:
//! resolved to its canonical symbol, registered, and removed from the tree
//! so it can never surface in output. Malformed definitions are diagnosed
//! and dropped without registration, so calls to them stay un-rewritten.
//! Non-macro nodes are traversed structurally without modification.

use crate::diagnostics::{DiagnosticCode, EngineError};
use crate::expand::definition::{is_macro_definition, MacroDefinition};
use crate::expand::registry::MacroRegistry;
use crate::expand::ExpansionContext;
use crate::semantic::resolve_canonical;
use crate::syntax::ast::{
    Block, Expr, ExprKind, FnDecl, Stmt, StmtKind, Unit,
};

/// Run the search pass over a unit, populating `registry` and returning the
/// tree with all recognized definitions erased.
pub fn collect_definitions(
    unit: Unit,
    registry: &mut MacroRegistry,
    ctx: &ExpansionContext,
) -> Result<Unit, EngineError> {
    let mut search = Search { registry, ctx };
    let stmts = search.search_stmts(unit.stmts, Enclosing::default())?;
    Ok(Unit {
        stmts,
        span: unit.span,
    })
}

/// Lexical context a definition is found in; both flags make a definition
/// invalid (codes 24001 and 24002).
#[derive(Debug, Clone, Copy, Default)]
struct Enclosing {
    in_macro: bool,
    in_generic_function: bool,
}

struct Search<'a> {
    registry: &'a mut MacroRegistry,
    ctx: &'a ExpansionContext<'a>,
}

impl Search<'_> {
    fn search_stmts(
        &mut self,
        stmts: Vec<Stmt>,
        enclosing: Enclosing,
    ) -> Result<Vec<Stmt>, EngineError> {
        let mut kept = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            if let Some(stmt) = self.search_stmt(stmt, enclosing)? {
                kept.push(stmt);
            }
        }
        Ok(kept)
    }

    /// Returns `None` when the statement was a macro definition and has
    /// been consumed (registered or diagnosed away).
    fn search_stmt(
        &mut self,
        stmt: Stmt,
        enclosing: Enclosing,
    ) -> Result<Option<Stmt>, EngineError> {
        let Stmt {
            kind,
            leading_comments,
            span,
        } = stmt;

        let kind = match kind {
            StmtKind::Function(decl) if is_macro_definition(&decl, self.ctx.config) => {
                self.consume_macro_definition(decl, enclosing)?;
                return Ok(None);
            }
            StmtKind::Function(decl) => {
                StmtKind::Function(self.search_fn_decl(decl, enclosing)?)
            }
            StmtKind::Let(mut decl) => {
                decl.init = decl
                    .init
                    .map(|e| self.search_expr(e, enclosing))
                    .transpose()?;
                StmtKind::Let(decl)
            }
            StmtKind::Return(value) => StmtKind::Return(
                value.map(|e| self.search_expr(e, enclosing)).transpose()?,
            ),
            StmtKind::Expr(expr) => StmtKind::Expr(self.search_expr(expr, enclosing)?),
            other @ (StmtKind::TypeAlias(_) | StmtKind::Alias(_)) => other,
        };

        Ok(Some(Stmt {
            kind,
            leading_comments,
            span,
        }))
    }

    fn consume_macro_definition(
        &mut self,
        mut decl: FnDecl,
        enclosing: Enclosing,
    ) -> Result<(), EngineError> {
        if enclosing.in_macro {
            self.ctx
                .sink
                .report(DiagnosticCode::DefinitionInsideMacro, decl.span);
            return Ok(());
        }
        if enclosing.in_generic_function {
            self.ctx
                .sink
                .report(DiagnosticCode::DefinitionInsideGenericFunction, decl.span);
            return Ok(());
        }
        let Some(symbol) = resolve_canonical(self.ctx.oracle, &decl.name) else {
            self.ctx
                .sink
                .report(DiagnosticCode::DefinitionWithNoSymbol, decl.span);
            return Ok(());
        };

        // search the body before registering: definitions nested inside a
        // macro are diagnosed (24001) and erased from the registered body
        let nested = Enclosing {
            in_macro: true,
            in_generic_function: enclosing.in_generic_function
                || !decl.type_params.is_empty(),
        };
        decl.body = decl
            .body
            .map(|b| self.search_block(b, nested))
            .transpose()?;

        let definition = MacroDefinition::from_decl(decl, symbol)?;
        self.registry.register(definition);
        Ok(())
    }

    fn search_fn_decl(
        &mut self,
        mut decl: FnDecl,
        enclosing: Enclosing,
    ) -> Result<FnDecl, EngineError> {
        let nested = Enclosing {
            in_macro: enclosing.in_macro,
            in_generic_function: enclosing.in_generic_function
                || !decl.type_params.is_empty(),
        };
        decl.body = decl
            .body
            .map(|b| self.search_block(b, nested))
            .transpose()?;
        Ok(decl)
    }

    fn search_block(
        &mut self,
        block: Block,
        enclosing: Enclosing,
    ) -> Result<Block, EngineError> {
        Ok(Block {
            stmts: self.search_stmts(block.stmts, enclosing)?,
            span: block.span,
        })
    }

    fn search_expr(&mut self, expr: Expr, enclosing: Enclosing) -> Result<Expr, EngineError> {
        let Expr { kind, span } = expr;
        let kind = match kind {
            ExprKind::Array(items) => ExprKind::Array(
                items
                    .into_iter()
                    .map(|e| self.search_expr(e, enclosing))
                    .collect::<Result<_, _>>()?,
            ),
            ExprKind::Member { object, property } => ExprKind::Member {
                object: Box::new(self.search_expr(*object, enclosing)?),
                property,
            },
            ExprKind::Call(mut call) => {
                call.callee = Box::new(self.search_expr(*call.callee, enclosing)?);
                call.args = call
                    .args
                    .into_iter()
                    .map(|e| self.search_expr(e, enclosing))
                    .collect::<Result<_, _>>()?;
                ExprKind::Call(call)
            }
            ExprKind::Closure(mut closure) => {
                let nested = Enclosing {
                    in_macro: enclosing.in_macro,
                    in_generic_function: enclosing.in_generic_function
                        || !closure.type_params.is_empty(),
                };
                closure.body = self.search_block(closure.body, nested)?;
                ExprKind::Closure(closure)
            }
            ExprKind::Paren(inner) => {
                ExprKind::Paren(Box::new(self.search_expr(*inner, enclosing)?))
            }
            ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
                op,
                lhs: Box::new(self.search_expr(*lhs, enclosing)?),
                rhs: Box::new(self.search_expr(*rhs, enclosing)?),
            },
            other @ (ExprKind::Ident(_)
            | ExprKind::Number(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)) => other,
        };
        Ok(Expr { kind, span })
    }
}
