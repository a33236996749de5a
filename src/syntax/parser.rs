//! Splice parser.
//!
//! Converts source text into the AST of `syntax::ast`, assigning each parsed
//! identifier a fresh `NodeId` for the semantic layer to key resolutions on.
//! Purely syntactic; no symbol resolution happens here.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::diagnostics::{to_source_span, EngineError};
use crate::syntax::ast::{
    AliasDecl, BinOp, Block, CallExpr, ClosureExpr, Expr, ExprKind, FnDecl, Ident, LetDecl,
    NodeId, ObjectMember, Param, Span, Stmt, StmtKind, TypeAliasDecl, TypeExpr, TypeExprKind,
    TypeParam, Unit,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SpliceParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse one compilation unit. `name` is the source name used in parse
/// diagnostics (typically the file path).
pub fn parse(source: &str, name: &str) -> Result<Unit, EngineError> {
    let pairs = SpliceParser::parse(Rule::unit, source)
        .map_err(|e| convert_parse_error(e, source, name))?;

    let unit_pair = pairs.peek().expect("pest guarantees the unit rule exists");
    let mut lowerer = Lowerer::default();

    let stmts = unit_pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::stmt)
        .map(|p| lowerer.build_stmt(p))
        .collect();

    Ok(Unit {
        stmts,
        span: Span::new(0, source.len()),
    })
}

// ============================================================================
// LOWERING
// ============================================================================

/// Carries the node-id counter through the lowering walk.
#[derive(Default)]
struct Lowerer {
    next_id: u32,
}

impl Lowerer {
    fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn build_stmt(&mut self, pair: Pair<Rule>) -> Stmt {
        let span = get_span(&pair);
        let mut comments = Vec::new();
        let mut kind = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::line_comment => comments.push(comment_text(inner.as_str())),
                _ => kind = Some(self.build_stmt_kind(inner)),
            }
        }

        Stmt {
            // grammar guarantees exactly one bare statement per stmt
            kind: kind.expect("stmt rule always contains a statement"),
            leading_comments: comments,
            span,
        }
    }

    fn build_stmt_kind(&mut self, pair: Pair<Rule>) -> StmtKind {
        match pair.as_rule() {
            Rule::fn_decl => StmtKind::Function(self.build_fn_decl(pair)),
            Rule::type_alias_decl => StmtKind::TypeAlias(self.build_type_alias(pair)),
            Rule::alias_decl => StmtKind::Alias(self.build_alias(pair)),
            Rule::let_decl => StmtKind::Let(self.build_let(pair)),
            Rule::return_stmt => {
                let value = pair
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::expr)
                    .map(|p| self.build_expr(p));
                StmtKind::Return(value)
            }
            Rule::expr_stmt => {
                // grammar guarantees inner expr exists
                let inner = pair.into_inner().next().expect("expr_stmt has an expr");
                StmtKind::Expr(self.build_expr(inner))
            }
            rule => unreachable!("unexpected statement rule: {:?}", rule),
        }
    }

    fn build_fn_decl(&mut self, pair: Pair<Rule>) -> FnDecl {
        let span = get_span(&pair);
        let mut decl = FnDecl {
            name: Ident::synthetic(""),
            is_declare: false,
            is_async: false,
            is_generator: false,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
            body: None,
            span,
        };

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_declare => decl.is_declare = true,
                Rule::modifier_async => decl.is_async = true,
                Rule::generator_mark => decl.is_generator = true,
                Rule::ident => decl.name = self.build_ident(inner),
                Rule::type_params => decl.type_params = self.build_type_params(inner),
                Rule::param_list => decl.params = self.build_params(inner),
                Rule::ret_annot => decl.return_type = Some(self.build_ret_annot(inner)),
                Rule::block => decl.body = Some(self.build_block(inner)),
                _ => {}
            }
        }
        decl
    }

    fn build_type_alias(&mut self, pair: Pair<Rule>) -> TypeAliasDecl {
        let span = get_span(&pair);
        let mut name = Ident::synthetic("");
        let mut params = Vec::new();
        let mut target = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = self.build_ident(inner),
                Rule::type_params => params = self.build_type_params(inner),
                Rule::type_expr => target = Some(self.build_type(inner)),
                _ => {}
            }
        }

        TypeAliasDecl {
            name,
            params,
            // grammar guarantees the aliased type exists
            target: target.expect("type alias has a target type"),
            span,
        }
    }

    fn build_alias(&mut self, pair: Pair<Rule>) -> AliasDecl {
        let span = get_span(&pair);
        let mut idents = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::ident)
            .map(|p| self.build_ident(p))
            .collect::<Vec<_>>()
            .into_iter();
        // grammar guarantees both sides
        let name = idents.next().expect("alias has a name");
        let target = idents.next().expect("alias has a target");
        AliasDecl { name, target, span }
    }

    fn build_let(&mut self, pair: Pair<Rule>) -> LetDecl {
        let span = get_span(&pair);
        let mut is_const = false;
        let mut name = Ident::synthetic("");
        let mut ty = None;
        let mut init = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::let_kind => is_const = inner.as_str() == "const",
                Rule::ident => name = self.build_ident(inner),
                Rule::type_expr => ty = Some(self.build_type(inner)),
                Rule::expr => init = Some(self.build_expr(inner)),
                _ => {}
            }
        }

        LetDecl {
            is_const,
            name,
            ty,
            init,
            span,
        }
    }

    fn build_block(&mut self, pair: Pair<Rule>) -> Block {
        let span = get_span(&pair);
        let stmts = pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::stmt)
            .map(|p| self.build_stmt(p))
            .collect();
        Block { stmts, span }
    }

    fn build_type_params(&mut self, pair: Pair<Rule>) -> Vec<TypeParam> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::type_param)
            .map(|p| {
                let span = get_span(&p);
                let mut name = Ident::synthetic("");
                let mut constraint = None;
                for inner in p.into_inner() {
                    match inner.as_rule() {
                        Rule::ident => name = self.build_ident(inner),
                        Rule::type_expr => constraint = Some(self.build_type(inner)),
                        _ => {}
                    }
                }
                TypeParam {
                    name,
                    constraint,
                    span,
                }
            })
            .collect()
    }

    fn build_params(&mut self, pair: Pair<Rule>) -> Vec<Param> {
        pair.into_inner()
            .filter(|p| p.as_rule() == Rule::param)
            .map(|p| {
                let span = get_span(&p);
                let mut name = Ident::synthetic("");
                let mut ty = None;
                for inner in p.into_inner() {
                    match inner.as_rule() {
                        Rule::ident => name = self.build_ident(inner),
                        Rule::type_expr => ty = Some(self.build_type(inner)),
                        _ => {}
                    }
                }
                Param { name, ty, span }
            })
            .collect()
    }

    fn build_ret_annot(&mut self, pair: Pair<Rule>) -> TypeExpr {
        // grammar guarantees inner type exists
        let inner = pair.into_inner().next().expect("ret_annot has a type");
        self.build_type(inner)
    }

    fn build_ident(&mut self, pair: Pair<Rule>) -> Ident {
        Ident {
            name: pair.as_str().to_string(),
            id: self.fresh(),
            span: get_span(&pair),
        }
    }

    // --- Expressions ---

    fn build_expr(&mut self, pair: Pair<Rule>) -> Expr {
        match pair.as_rule() {
            Rule::expr => {
                // grammar guarantees inner binary_expr
                let inner = pair.into_inner().next().expect("expr wraps a binary_expr");
                self.build_expr(inner)
            }
            Rule::binary_expr => self.build_binary(pair),
            Rule::postfix_expr => self.build_postfix(pair),
            rule => unreachable!("unexpected expression rule: {:?}", rule),
        }
    }

    fn build_binary(&mut self, pair: Pair<Rule>) -> Expr {
        let span = get_span(&pair);
        let mut inner = pair.into_inner();
        // grammar guarantees at least one operand
        let first = inner.next().expect("binary_expr has an operand");
        let mut lhs = self.build_postfix(first);

        while let Some(op_pair) = inner.next() {
            let op = build_bin_op(op_pair.as_str());
            let rhs_pair = inner.next().expect("operator is followed by an operand");
            let rhs = self.build_postfix(rhs_pair);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            };
        }
        lhs
    }

    fn build_postfix(&mut self, pair: Pair<Rule>) -> Expr {
        let span = get_span(&pair);
        let mut inner = pair.into_inner();
        // grammar guarantees a primary expression
        let primary = inner.next().expect("postfix_expr has a primary");
        let mut expr = self.build_primary(primary);

        for op in inner {
            match op.as_rule() {
                Rule::member_op => {
                    let name = op
                        .into_inner()
                        .next()
                        .expect("member access has a property name");
                    expr = Expr {
                        kind: ExprKind::Member {
                            object: Box::new(expr),
                            property: name.as_str().to_string(),
                        },
                        span,
                    };
                }
                Rule::call_op => {
                    let mut type_args = None;
                    let mut args = Vec::new();
                    for part in op.into_inner() {
                        match part.as_rule() {
                            Rule::call_type_args => {
                                type_args = Some(
                                    part.into_inner().map(|t| self.build_type(t)).collect(),
                                );
                            }
                            Rule::arg_list => {
                                args = part.into_inner().map(|e| self.build_expr(e)).collect();
                            }
                            _ => {}
                        }
                    }
                    expr = Expr {
                        kind: ExprKind::Call(CallExpr {
                            callee: Box::new(expr),
                            type_args,
                            args,
                        }),
                        span,
                    };
                }
                rule => unreachable!("unexpected postfix rule: {:?}", rule),
            }
        }
        expr
    }

    fn build_primary(&mut self, pair: Pair<Rule>) -> Expr {
        let span = get_span(&pair);
        let kind = match pair.as_rule() {
            Rule::number => {
                // grammar guarantees a well-formed float literal
                ExprKind::Number(pair.as_str().parse().expect("number literal parses"))
            }
            Rule::string => {
                let raw = pair.as_str();
                ExprKind::Str(raw[1..raw.len() - 1].to_string())
            }
            Rule::boolean => ExprKind::Bool(pair.as_str() == "true"),
            Rule::ident_expr => {
                let ident = pair.into_inner().next().expect("ident_expr wraps an ident");
                ExprKind::Ident(self.build_ident(ident))
            }
            Rule::array_lit => {
                ExprKind::Array(pair.into_inner().map(|e| self.build_expr(e)).collect())
            }
            Rule::paren_expr => {
                let inner = pair.into_inner().next().expect("paren_expr wraps an expr");
                ExprKind::Paren(Box::new(self.build_expr(inner)))
            }
            Rule::closure_expr => ExprKind::Closure(Box::new(self.build_closure(pair))),
            rule => unreachable!("unexpected primary rule: {:?}", rule),
        };
        Expr { kind, span }
    }

    fn build_closure(&mut self, pair: Pair<Rule>) -> ClosureExpr {
        let mut closure = ClosureExpr {
            is_async: false,
            is_generator: false,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
            body: Block {
                stmts: Vec::new(),
                span: Span::default(),
            },
        };

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::modifier_async => closure.is_async = true,
                Rule::generator_mark => closure.is_generator = true,
                Rule::type_params => closure.type_params = self.build_type_params(inner),
                Rule::param_list => closure.params = self.build_params(inner),
                Rule::ret_annot => closure.return_type = Some(self.build_ret_annot(inner)),
                Rule::block => closure.body = self.build_block(inner),
                _ => {}
            }
        }
        closure
    }

    // --- Types ---

    fn build_type(&mut self, pair: Pair<Rule>) -> TypeExpr {
        let span = get_span(&pair);
        match pair.as_rule() {
            Rule::type_expr => {
                let members: Vec<TypeExpr> =
                    pair.into_inner().map(|p| self.build_type(p)).collect();
                collapse_composite(members, span, TypeExprKind::Union)
            }
            Rule::inter_type => {
                let members: Vec<TypeExpr> =
                    pair.into_inner().map(|p| self.build_type(p)).collect();
                collapse_composite(members, span, TypeExprKind::Intersection)
            }
            Rule::postfix_type => {
                let mut inner = pair.into_inner();
                // grammar guarantees a primary type
                let primary = inner.next().expect("postfix_type has a primary");
                let mut ty = self.build_type(primary);
                for suffix in inner {
                    debug_assert_eq!(suffix.as_rule(), Rule::array_suffix);
                    ty = TypeExpr {
                        kind: TypeExprKind::Array(Box::new(ty)),
                        span,
                    };
                }
                ty
            }
            Rule::ref_type => {
                let mut name = Ident::synthetic("");
                let mut args = Vec::new();
                for inner in pair.into_inner() {
                    match inner.as_rule() {
                        Rule::ident => name = self.build_ident(inner),
                        Rule::type_arg_list => {
                            args = inner.into_inner().map(|t| self.build_type(t)).collect();
                        }
                        _ => {}
                    }
                }
                TypeExpr {
                    kind: TypeExprKind::Ref { name, args },
                    span,
                }
            }
            Rule::object_type => {
                let members = pair
                    .into_inner()
                    .filter(|p| p.as_rule() == Rule::object_member)
                    .map(|p| self.build_object_member(p))
                    .collect();
                TypeExpr {
                    kind: TypeExprKind::Object(members),
                    span,
                }
            }
            Rule::paren_type => {
                let inner = pair.into_inner().next().expect("paren_type wraps a type");
                TypeExpr {
                    kind: TypeExprKind::Paren(Box::new(self.build_type(inner))),
                    span,
                }
            }
            rule => unreachable!("unexpected type rule: {:?}", rule),
        }
    }

    fn build_object_member(&mut self, pair: Pair<Rule>) -> ObjectMember {
        let mut name = String::new();
        let mut optional = false;
        let mut ty = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::ident => name = inner.as_str().to_string(),
                Rule::optional_mark => optional = true,
                Rule::type_expr => ty = Some(self.build_type(inner)),
                _ => {}
            }
        }
        ObjectMember {
            name,
            optional,
            // grammar guarantees the member type exists
            ty: ty.expect("object member has a type"),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn comment_text(raw: &str) -> String {
    raw.trim_start_matches("//").trim().to_string()
}

fn build_bin_op(symbol: &str) -> BinOp {
    match symbol {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "==" => BinOp::Eq,
        "!=" => BinOp::Ne,
        "<" => BinOp::Lt,
        ">" => BinOp::Gt,
        other => unreachable!("unexpected binary operator: {}", other),
    }
}

/// Single-member unions/intersections collapse to the member itself.
fn collapse_composite(
    mut members: Vec<TypeExpr>,
    span: Span,
    make: fn(Vec<TypeExpr>) -> TypeExprKind,
) -> TypeExpr {
    if members.len() == 1 {
        members.remove(0)
    } else {
        TypeExpr {
            kind: make(members),
            span,
        }
    }
}

fn convert_parse_error(
    error: pest::error::Error<Rule>,
    source: &str,
    name: &str,
) -> EngineError {
    use pest::error::InputLocation;

    let span = match error.location {
        InputLocation::Pos(p) => Span::new(p, p),
        InputLocation::Span((s, e)) => Span::new(s, e),
    };
    EngineError::Parse {
        message: error.variant.message().to_string(),
        src: miette::NamedSource::new(name, source.to_string()),
        span: to_source_span(span),
    }
}
