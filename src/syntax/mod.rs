//! Front-end syntax layer: AST, parser and printer for the Splice language.
//!
//! This layer is purely syntactic. Identifier resolution, type inference and
//! everything else with semantic content lives in [`crate::semantic`]; the
//! expansion engine in [`crate::expand`] consumes both.

pub mod ast;
pub mod parser;
pub mod printer;

pub use ast::{
    AliasDecl, BinOp, Block, CallExpr, ClosureExpr, Expr, ExprKind, FnDecl, Ident, LetDecl,
    NodeId, ObjectMember, Param, Span, Stmt, StmtKind, TypeAliasDecl, TypeExpr, TypeExprKind,
    TypeParam, Unit,
};
pub use parser::parse;
pub use printer::print_unit;
