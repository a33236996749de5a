//! Structural substitution: every occurrence of a bound type parameter is
//! replaced while the surrounding type shape is preserved exactly.

mod common;

use common::{assert_same, expand, expand_clean, reprint};
use splice::diagnostics::{DiagnosticCode, DiagnosticSink};
use splice::expand::{resolve_bindings, Config, ExpansionContext, MacroDefinition, TypeBindings};
use splice::semantic::{Prim, SemanticOracle, SymbolId, Type};
use splice::syntax::ast::{CallExpr, ExprKind, Ident, StmtKind, TypeExpr};
use splice::syntax::parser::parse;

#[test]
fn object_shapes_substitute_member_by_member() {
    let output = expand_clean(
        "\
function tag$macro$<T>(value: { a: string, b?: T }): { a: string, b?: T } {
  return value;
}
let v: { a: string, b?: number };
let t = tag$macro$<number>(v);
",
    );
    assert!(output.contains("value: { a: string, b?: number }"));
    assert!(output.contains("): { a: string, b?: number } {"));
}

#[test]
fn array_shapes_substitute_the_element() {
    let output = expand_clean(
        "\
function head$macro$<T>(xs: T[]): T {
  return xs.shift();
}
let nums: number[];
let h = head$macro$(nums);
",
    );
    let expected = reprint(
        "\
let nums: number[];
let h = (function (xs: number[]): number { return xs.shift(); })(nums);
",
    );
    assert_same(&output, &expected);
}

#[test]
fn alias_applications_keep_the_alias_name() {
    let output = expand_clean(
        "\
type Box<T> = { value: T };
function unbox$macro$<T>(b: Box<T>): T {
  return b.value;
}
let bx: Box<string>;
let u = unbox$macro$(bx);
",
    );
    // the alias reference survives with its argument substituted; it is not
    // flattened to the underlying object shape
    assert!(output.contains("b: Box<string>"));
    assert!(output.contains("): string {"));
    assert!(output.contains("type Box<T> = { value: T };"));
}

#[test]
fn unions_substitute_every_member_in_order() {
    let output = expand_clean(
        "\
function pick$macro$<T>(v: T | { b: T }): T | { b: T } {
  return v;
}
let x: number;
let p = pick$macro$<number>(x);
",
    );
    assert!(output.contains("v: number | { b: number }"));
}

#[test]
fn intersections_substitute_every_member_in_order() {
    let output = expand_clean(
        "\
function both$macro$<T>(v: T & { b: T }): T & { b: T } {
  return v;
}
let x: number;
let p = both$macro$<number>(x);
",
    );
    assert!(output.contains("v: number & { b: number }"));
}

#[test]
fn inferred_arguments_substitute_like_explicit_ones() {
    let output = expand_clean(
        "\
function second$macro$<T>(pair: { a: string, b: T }): T {
  return pair.b;
}
let v: { a: string, b: number };
let s = second$macro$(v);
",
    );
    assert!(output.contains("pair: { a: string, b: number }"));
    assert!(output.contains("): number {"));
}

#[test]
fn alias_transforms_that_omit_properties_still_infer() {
    let output = expand_clean(
        "\
type Slim<T> = { b: T };
function slim$macro$<T>(v: Slim<T>): T {
  return v.b;
}
let full: { a: string, b: number };
let s = slim$macro$(full);
",
    );
    // the alias picks a subset of the argument's properties; matching goes
    // through the alias target, and the written alias shape is preserved
    assert!(output.contains("v: Slim<number>"));
    assert!(output.contains("): number {"));
}

#[test]
fn composite_type_arguments_splice_whole_expressions() {
    let output = expand_clean(
        "\
function keep$macro$<T>(v: T): T {
  return v;
}
let q: number | string;
let k = keep$macro$<number | string>(q);
",
    );
    assert!(output.contains("v: number | string"));
}

#[test]
fn body_type_annotations_are_rewritten_too() {
    let output = expand_clean(
        "\
function make$macro$<T>(seed: T): T[] {
  let acc: T[] = [seed];
  return acc;
}
let xs = make$macro$<string>(\"a\");
",
    );
    assert!(output.contains("let acc: string[] = [seed];"));
    assert!(!output.contains(": T["));
}

// ----------------------------------------------------------------------------
// Resolver-level behavior against a host-provided oracle
// ----------------------------------------------------------------------------

/// A minimal host oracle: binds only the macro's name, never its type
/// parameters.
struct NamelessParamOracle;

impl SemanticOracle for NamelessParamOracle {
    fn symbol_at(&self, ident: &Ident) -> Option<SymbolId> {
        (ident.name == "m$macro$").then_some(SymbolId(7))
    }

    fn root_symbol(&self, symbol: SymbolId) -> SymbolId {
        symbol
    }

    fn call_type_args(&self, _call: &CallExpr) -> Option<Vec<Type>> {
        Some(vec![Type::Prim(Prim::Number)])
    }

    fn type_to_syntax(&self, _ty: &Type) -> TypeExpr {
        TypeExpr::reference("never", Vec::new())
    }
}

fn macro_call_parts(source: &str) -> (MacroDefinition, CallExpr) {
    let unit = parse(source, "test.spl").unwrap();
    let mut definition = None;
    let mut call = None;
    for stmt in unit.stmts {
        match stmt.kind {
            StmtKind::Function(decl) => {
                definition = Some(MacroDefinition::from_decl(decl, SymbolId(7)).unwrap());
            }
            StmtKind::Expr(expr) => {
                if let ExprKind::Call(c) = expr.kind {
                    call = Some(c);
                }
            }
            _ => {}
        }
    }
    (definition.unwrap(), call.unwrap())
}

#[test]
fn unresolvable_type_parameters_degrade_the_call() {
    let (definition, call) = macro_call_parts(
        "\
function m$macro$<T>(x: T): T {
  return x;
}
m$macro$(1);
",
    );
    let oracle = NamelessParamOracle;
    let config = Config::default();
    let sink = DiagnosticSink::new();
    let ctx = ExpansionContext::new(&config, &oracle, &sink);
    let inherited = TypeBindings::new();

    let resolution = resolve_bindings(
        &call,
        splice::syntax::ast::Span::new(0, 1),
        &definition,
        &inherited,
        &ctx,
    );

    assert!(!resolution.substituted);
    assert!(resolution.map.is_empty());
    let entries = sink.into_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, DiagnosticCode::TypeParameterWithNoSymbol);
}

#[test]
fn mismatch_reports_once_and_returns_the_inherited_map() {
    let (definition, call) = macro_call_parts(
        "\
function m$macro$<A, B>(a: A, b: B): A {
  return a;
}
m$macro$(1, 2);
",
    );
    // the stub oracle resolves one type argument for a two-parameter macro
    let oracle = NamelessParamOracle;
    let config = Config::default();
    let sink = DiagnosticSink::new();
    let ctx = ExpansionContext::new(&config, &oracle, &sink);
    let inherited = TypeBindings::new();

    let resolution = resolve_bindings(
        &call,
        splice::syntax::ast::Span::new(0, 1),
        &definition,
        &inherited,
        &ctx,
    );

    assert!(!resolution.substituted);
    let entries = sink.into_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code, DiagnosticCode::CallTypeArgumentMismatch);
}

#[test]
fn unexpanded_mismatched_calls_keep_written_types() {
    let (output, diagnostics) = expand(
        "\
function wrapit$macro$<T>(v: T): { inner: T } {
  let out: { inner: T };
  return out;
}
let w = wrapit$macro$<number, string>(1);
",
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        DiagnosticCode::CallTypeArgumentMismatch
    );
    // degraded splice: declared shapes stay exactly as written
    assert!(output.contains("(function <T>(v: T): { inner: T } {"));
    assert!(output.contains("let out: { inner: T };"));
}
