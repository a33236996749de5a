//! Comment omission for spliced macro bodies.
//!
//! Comments written at a macro's definition site must not leak into its
//! call sites: the splicer runs the expanded body through these strippers
//! before building the replacement closure, so the produced invocation
//! carries no residual comments.

use crate::syntax::ast::{Block, Expr, ExprKind, Stmt};

pub fn strip_block(block: Block) -> Block {
    Block {
        stmts: block.stmts.into_iter().map(strip_stmt).collect(),
        span: block.span,
    }
}

fn strip_stmt(mut stmt: Stmt) -> Stmt {
    stmt.leading_comments.clear();
    stmt.kind = match stmt.kind {
        crate::syntax::ast::StmtKind::Function(mut decl) => {
            decl.body = decl.body.map(strip_block);
            crate::syntax::ast::StmtKind::Function(decl)
        }
        crate::syntax::ast::StmtKind::Let(mut decl) => {
            decl.init = decl.init.map(strip_expr);
            crate::syntax::ast::StmtKind::Let(decl)
        }
        crate::syntax::ast::StmtKind::Return(value) => {
            crate::syntax::ast::StmtKind::Return(value.map(strip_expr))
        }
        crate::syntax::ast::StmtKind::Expr(expr) => {
            crate::syntax::ast::StmtKind::Expr(strip_expr(expr))
        }
        other => other,
    };
    stmt
}

fn strip_expr(expr: Expr) -> Expr {
    let kind = match expr.kind {
        ExprKind::Array(items) => {
            ExprKind::Array(items.into_iter().map(strip_expr).collect())
        }
        ExprKind::Member { object, property } => ExprKind::Member {
            object: Box::new(strip_expr(*object)),
            property,
        },
        ExprKind::Call(mut call) => {
            call.callee = Box::new(strip_expr(*call.callee));
            call.args = call.args.into_iter().map(strip_expr).collect();
            ExprKind::Call(call)
        }
        ExprKind::Closure(mut closure) => {
            closure.body = strip_block(closure.body);
            ExprKind::Closure(closure)
        }
        ExprKind::Paren(inner) => ExprKind::Paren(Box::new(strip_expr(*inner))),
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op,
            lhs: Box::new(strip_expr(*lhs)),
            rhs: Box::new(strip_expr(*rhs)),
        },
        other => other,
    };
    Expr {
        kind,
        span: expr.span,
    }
}
