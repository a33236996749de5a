//! Parser and printer contract tests.

mod common;

use common::reprint;
use splice::syntax::ast::{ExprKind, StmtKind, TypeExprKind};
use splice::syntax::parser::parse;

#[test]
fn parses_function_declarations_with_modifiers() {
    let unit = parse(
        "declare async function* pump<T extends Source>(from: T): T[];\n",
        "test.spl",
    )
    .unwrap();
    assert_eq!(unit.stmts.len(), 1);
    let StmtKind::Function(decl) = &unit.stmts[0].kind else {
        panic!("expected a function declaration");
    };
    assert!(decl.is_declare);
    assert!(decl.is_async);
    assert!(decl.is_generator);
    assert!(decl.body.is_none());
    assert_eq!(decl.type_params.len(), 1);
    assert!(decl.type_params[0].constraint.is_some());
    assert_eq!(decl.params.len(), 1);
}

#[test]
fn leading_line_comments_attach_to_statements() {
    let unit = parse(
        "// first\n// second\nlet x = 1;\nlet y = 2;\n",
        "test.spl",
    )
    .unwrap();
    assert_eq!(unit.stmts[0].leading_comments, vec!["first", "second"]);
    assert!(unit.stmts[1].leading_comments.is_empty());
}

#[test]
fn call_type_arguments_win_over_comparison() {
    let unit = parse("f<number>(1);\nlet c = a < b;\n", "test.spl").unwrap();
    let StmtKind::Expr(expr) = &unit.stmts[0].kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call(call) = &expr.kind else {
        panic!("expected a call");
    };
    assert_eq!(call.type_args.as_ref().map(|a| a.len()), Some(1));

    let StmtKind::Let(decl) = &unit.stmts[1].kind else {
        panic!("expected a let declaration");
    };
    assert!(matches!(
        decl.init.as_ref().map(|e| &e.kind),
        Some(ExprKind::Binary { .. })
    ));
}

#[test]
fn type_shapes_parse_structurally() {
    let unit = parse(
        "type Shape<T> = { a: string, b?: T } | T[] & (Box<T> | number);\n",
        "test.spl",
    )
    .unwrap();
    let StmtKind::TypeAlias(decl) = &unit.stmts[0].kind else {
        panic!("expected a type alias");
    };
    let TypeExprKind::Union(members) = &decl.target.kind else {
        panic!("expected a union at the top");
    };
    assert_eq!(members.len(), 2);
    assert!(matches!(members[0].kind, TypeExprKind::Object(_)));
    assert!(matches!(members[1].kind, TypeExprKind::Intersection(_)));
}

#[test]
fn print_parse_print_is_stable() {
    let source = "\
// greeting
function hello(name: string): string {
  return name;
}
type Pair<A, B> = { first: A, second: B };
alias hi = hello;
const msg = hi(\"world\");
";
    let once = reprint(source);
    let twice = reprint(&once);
    assert_eq!(once, twice);
}

#[test]
fn iife_output_shape_reparses() {
    let source = "let x = (function (n: number): number {\n  return n;\n})(1);\n";
    let once = reprint(source);
    assert_eq!(once, reprint(&once));
}

#[test]
fn malformed_source_is_a_parse_error() {
    assert!(parse("function {", "test.spl").is_err());
    assert!(parse("let = 3;", "test.spl").is_err());
}

#[test]
fn markers_are_legal_identifier_characters() {
    let unit = parse("let arr$macro$ = 5;\n", "test.spl").unwrap();
    let StmtKind::Let(decl) = &unit.stmts[0].kind else {
        panic!("expected a let declaration");
    };
    assert_eq!(decl.name.name, "arr$macro$");
}
