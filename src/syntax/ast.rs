//! AST for the Splice front-end language.
//!
//! Every node category is a closed tagged-variant enum (`StmtKind`,
//! `ExprKind`, `TypeExprKind`) wrapped in a struct carrying the source span,
//! so visitors dispatch with exhaustive matches and a new node shape is a
//! compile-time-checked gap.
//!
//! Identifiers carry a `NodeId` assigned by the parser; the semantic layer
//! records identifier resolutions against these ids. Nodes built by the
//! expansion engine use `NodeId::SYNTH` and have no semantic identity.

use serde::Serialize;

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// Identity of a parsed node, used as the key for semantic resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id shared by all synthesized nodes; never present in a resolution map.
    pub const SYNTH: NodeId = NodeId(u32::MAX);

    pub fn is_synthetic(self) -> bool {
        self == NodeId::SYNTH
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub id: NodeId,
    pub span: Span,
}

impl Ident {
    /// An identifier with no semantic identity, as produced by the
    /// type materializer.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Ident {
            name: name.into(),
            id: NodeId::SYNTH,
            span: Span::default(),
        }
    }
}

/// One compilation unit: the statement list of a single source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    /// Line comments written directly above the statement.
    pub leading_comments: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Function(FnDecl),
    TypeAlias(TypeAliasDecl),
    Alias(AliasDecl),
    Let(LetDecl),
    Return(Option<Expr>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: Ident,
    pub is_declare: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    /// Absent for forward declarations (`declare function f(): T;`).
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Ident,
    pub constraint: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: Ident,
    pub params: Vec<TypeParam>,
    pub target: TypeExpr,
    pub span: Span,
}

/// Re-export style indirection: `alias renamed = original;`. The canonical
/// symbol resolver unwraps chains of these to a fixed point.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasDecl {
    pub name: Ident,
    pub target: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetDecl {
    pub is_const: bool,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(Ident),
    Number(f64),
    /// String literal body, stored verbatim with its escape sequences.
    Str(String),
    Bool(bool),
    Array(Vec<Expr>),
    Member {
        object: Box<Expr>,
        property: String,
    },
    Call(CallExpr),
    Closure(Box<ClosureExpr>),
    Paren(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub type_args: Option<Vec<TypeExpr>>,
    pub args: Vec<Expr>,
}

/// Anonymous function expression; the replacement construct produced by the
/// expansion engine (wrapped in an immediate invocation).
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureExpr {
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn synthetic(kind: TypeExprKind) -> Self {
        TypeExpr {
            kind,
            span: Span::default(),
        }
    }

    /// A synthesized named reference, e.g. `Pair<number, string>`.
    pub fn reference(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::synthetic(TypeExprKind::Ref {
            name: Ident::synthetic(name),
            args,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    Ref { name: Ident, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    Object(Vec<ObjectMember>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    Paren(Box<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMember {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}
