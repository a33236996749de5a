//! Structural type materializer.
//!
//! Two faces of the same substitution:
//!
//! - [`materialize_type`] rewrites a *semantic* type value into syntax,
//!   replacing bound type parameters while preserving structure through
//!   alias applications, named references, array shapes, anonymous object
//!   shapes, unions and intersections. Anything else falls back to the
//!   oracle's canonical type-to-syntax conversion at full fidelity.
//! - [`rewrite_type_expr`] (and the block/expression walkers built on it)
//!   rewrites *written* type annotations: a reference whose canonical
//!   symbol is bound in the map is replaced wholesale by the bound
//!   expression; every other node is rebuilt with its children visited.
//!
//! Bound replacements are spliced terminally — the rewriter never re-scans
//! a replacement it just inserted — so a self-referential binding cannot
//! cause the walk to loop.

use crate::expand::bindings::TypeBindings;
use crate::expand::ExpansionContext;
use crate::semantic::{resolve_canonical, Type};
use crate::syntax::ast::{
    Block, Expr, ExprKind, FnDecl, ObjectMember, Param, Stmt, StmtKind, TypeExpr, TypeExprKind,
};

// ============================================================================
// SEMANTIC TYPE -> SYNTAX
// ============================================================================

/// Rewrite a semantic type into a type expression with all bound type
/// parameters replaced.
pub fn materialize_type(ty: &Type, bindings: &TypeBindings, ctx: &ExpansionContext) -> TypeExpr {
    if let Type::Param { symbol, .. } = ty {
        if let Some(replacement) = bindings.get(symbol) {
            return replacement.clone();
        }
    }
    match ty {
        Type::Alias { name, args, .. } if !args.is_empty() => TypeExpr::reference(
            name.clone(),
            args.iter()
                .map(|a| materialize_type(a, bindings, ctx))
                .collect(),
        ),
        Type::Reference { name, args, .. } if !args.is_empty() => {
            if name == "Array" && args.len() == 1 {
                TypeExpr::synthetic(TypeExprKind::Array(Box::new(materialize_type(
                    &args[0], bindings, ctx,
                ))))
            } else {
                TypeExpr::reference(
                    name.clone(),
                    args.iter()
                        .map(|a| materialize_type(a, bindings, ctx))
                        .collect(),
                )
            }
        }
        Type::Object(props) => TypeExpr::synthetic(TypeExprKind::Object(
            props
                .iter()
                .map(|p| ObjectMember {
                    name: p.name.clone(),
                    optional: p.optional,
                    ty: materialize_type(&p.ty, bindings, ctx),
                })
                .collect(),
        )),
        Type::Union(members) => TypeExpr::synthetic(TypeExprKind::Union(
            members
                .iter()
                .map(|m| materialize_type(m, bindings, ctx))
                .collect(),
        )),
        Type::Intersection(members) => TypeExpr::synthetic(TypeExprKind::Intersection(
            members
                .iter()
                .map(|m| materialize_type(m, bindings, ctx))
                .collect(),
        )),
        // unbound parameters, plain aliases/references, primitives: the
        // oracle's canonical conversion, no further substitution
        _ => ctx.oracle.type_to_syntax(ty),
    }
}

// ============================================================================
// SYNTAX -> SYNTAX
// ============================================================================

/// Rewrite a written type expression under the binding map.
pub fn rewrite_type_expr(
    ty: &TypeExpr,
    bindings: &TypeBindings,
    ctx: &ExpansionContext,
) -> TypeExpr {
    if let TypeExprKind::Ref { name, .. } = &ty.kind {
        if let Some(symbol) = resolve_canonical(ctx.oracle, name) {
            if let Some(replacement) = bindings.get(&symbol) {
                return replacement.clone();
            }
        }
    }

    let kind = match &ty.kind {
        TypeExprKind::Ref { name, args } => TypeExprKind::Ref {
            name: name.clone(),
            args: args
                .iter()
                .map(|a| rewrite_type_expr(a, bindings, ctx))
                .collect(),
        },
        TypeExprKind::Array(inner) => {
            TypeExprKind::Array(Box::new(rewrite_type_expr(inner, bindings, ctx)))
        }
        TypeExprKind::Object(members) => TypeExprKind::Object(
            members
                .iter()
                .map(|m| ObjectMember {
                    name: m.name.clone(),
                    optional: m.optional,
                    ty: rewrite_type_expr(&m.ty, bindings, ctx),
                })
                .collect(),
        ),
        TypeExprKind::Union(members) => TypeExprKind::Union(
            members
                .iter()
                .map(|m| rewrite_type_expr(m, bindings, ctx))
                .collect(),
        ),
        TypeExprKind::Intersection(members) => TypeExprKind::Intersection(
            members
                .iter()
                .map(|m| rewrite_type_expr(m, bindings, ctx))
                .collect(),
        ),
        TypeExprKind::Paren(inner) => {
            TypeExprKind::Paren(Box::new(rewrite_type_expr(inner, bindings, ctx)))
        }
    };
    TypeExpr {
        kind,
        span: ty.span,
    }
}

/// Rewrite a parameter's annotation.
pub fn rewrite_param(param: &Param, bindings: &TypeBindings, ctx: &ExpansionContext) -> Param {
    Param {
        name: param.name.clone(),
        ty: param
            .ty
            .as_ref()
            .map(|t| rewrite_type_expr(t, bindings, ctx)),
        span: param.span,
    }
}

/// Rewrite every type annotation embedded in a statement block (closure
/// signatures, call type arguments, binding annotations, nested function
/// declarations).
pub fn rewrite_block_types(
    block: &Block,
    bindings: &TypeBindings,
    ctx: &ExpansionContext,
) -> Block {
    Block {
        stmts: block
            .stmts
            .iter()
            .map(|s| rewrite_stmt_types(s, bindings, ctx))
            .collect(),
        span: block.span,
    }
}

fn rewrite_stmt_types(stmt: &Stmt, bindings: &TypeBindings, ctx: &ExpansionContext) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::Function(decl) => StmtKind::Function(FnDecl {
            name: decl.name.clone(),
            is_declare: decl.is_declare,
            is_async: decl.is_async,
            is_generator: decl.is_generator,
            type_params: decl.type_params.clone(),
            params: decl
                .params
                .iter()
                .map(|p| rewrite_param(p, bindings, ctx))
                .collect(),
            return_type: decl
                .return_type
                .as_ref()
                .map(|t| rewrite_type_expr(t, bindings, ctx)),
            body: decl
                .body
                .as_ref()
                .map(|b| rewrite_block_types(b, bindings, ctx)),
            span: decl.span,
        }),
        StmtKind::TypeAlias(decl) => {
            let mut decl = decl.clone();
            decl.target = rewrite_type_expr(&decl.target, bindings, ctx);
            StmtKind::TypeAlias(decl)
        }
        StmtKind::Alias(decl) => StmtKind::Alias(decl.clone()),
        StmtKind::Let(decl) => {
            let mut decl = decl.clone();
            decl.ty = decl
                .ty
                .as_ref()
                .map(|t| rewrite_type_expr(t, bindings, ctx));
            decl.init = decl
                .init
                .as_ref()
                .map(|e| rewrite_expr_types(e, bindings, ctx));
            StmtKind::Let(decl)
        }
        StmtKind::Return(value) => StmtKind::Return(
            value
                .as_ref()
                .map(|e| rewrite_expr_types(e, bindings, ctx)),
        ),
        StmtKind::Expr(expr) => StmtKind::Expr(rewrite_expr_types(expr, bindings, ctx)),
    };
    Stmt {
        kind,
        leading_comments: stmt.leading_comments.clone(),
        span: stmt.span,
    }
}

fn rewrite_expr_types(expr: &Expr, bindings: &TypeBindings, ctx: &ExpansionContext) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Ident(_) | ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {
            expr.kind.clone()
        }
        ExprKind::Array(items) => ExprKind::Array(
            items
                .iter()
                .map(|e| rewrite_expr_types(e, bindings, ctx))
                .collect(),
        ),
        ExprKind::Member { object, property } => ExprKind::Member {
            object: Box::new(rewrite_expr_types(object, bindings, ctx)),
            property: property.clone(),
        },
        ExprKind::Call(call) => ExprKind::Call(crate::syntax::ast::CallExpr {
            callee: Box::new(rewrite_expr_types(&call.callee, bindings, ctx)),
            type_args: call.type_args.as_ref().map(|args| {
                args.iter()
                    .map(|t| rewrite_type_expr(t, bindings, ctx))
                    .collect()
            }),
            args: call
                .args
                .iter()
                .map(|e| rewrite_expr_types(e, bindings, ctx))
                .collect(),
        }),
        ExprKind::Closure(closure) => {
            let mut closure = (**closure).clone();
            closure.params = closure
                .params
                .iter()
                .map(|p| rewrite_param(p, bindings, ctx))
                .collect();
            closure.return_type = closure
                .return_type
                .as_ref()
                .map(|t| rewrite_type_expr(t, bindings, ctx));
            closure.body = rewrite_block_types(&closure.body, bindings, ctx);
            ExprKind::Closure(Box::new(closure))
        }
        ExprKind::Paren(inner) => {
            ExprKind::Paren(Box::new(rewrite_expr_types(inner, bindings, ctx)))
        }
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op: *op,
            lhs: Box::new(rewrite_expr_types(lhs, bindings, ctx)),
            rhs: Box::new(rewrite_expr_types(rhs, bindings, ctx)),
        },
    };
    Expr {
        kind,
        span: expr.span,
    }
}
