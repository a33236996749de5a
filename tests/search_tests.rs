//! Definition-search pass contract tests: registration, erasure and the
//! malformed-definition diagnostics.

mod common;

use common::{expand, expand_clean};
use splice::diagnostics::{DiagnosticCode, DiagnosticSink};
use splice::expand::{search, Config, ExpansionContext, MacroRegistry};
use splice::semantic::bind_unit;
use splice::syntax::parser::parse;
use splice::syntax::printer::print_unit;

#[test]
fn definitions_are_registered_and_erased() {
    let source = "\
function id$macro$(x: number): number {
  return x;
}
function keep(x: number): number {
  return x;
}
let y = keep(2);
";
    let unit = parse(source, "test.spl").unwrap();
    let analysis = bind_unit(&unit);
    let config = Config::default();
    let sink = DiagnosticSink::new();
    let ctx = ExpansionContext::new(&config, &analysis, &sink);
    let mut registry = MacroRegistry::new();

    let unit = search::collect_definitions(unit, &mut registry, &ctx).unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.names().any(|n| n == "id$macro$"));
    assert!(sink.is_empty());

    let printed = print_unit(&unit);
    assert!(!printed.contains("id$macro$"));
    assert!(printed.contains("function keep"));
}

#[test]
fn forward_declarations_are_not_macros() {
    let source = "\
declare function ext$macro$(x: number): number;
let y = ext$macro$(1);
";
    let output = expand_clean(source);
    // the declaration survives and the call is untouched
    assert!(output.contains("declare function ext$macro$"));
    assert!(output.contains("ext$macro$(1)"));
}

#[test]
fn unresolvable_definitions_are_diagnosed_and_dropped() {
    let source = "\
function lost$macro$(): number {
  return 1;
}
let n = lost$macro$();
";
    let unit = parse(source, "test.spl").unwrap();
    // an analysis of a different unit knows none of these identifiers
    let empty = bind_unit(&parse("", "empty.spl").unwrap());
    let outcome = splice::ExpansionPipeline::new(Config::default())
        .run(unit, &empty)
        .unwrap();

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].code,
        DiagnosticCode::DefinitionWithNoSymbol
    );

    let printed = print_unit(&outcome.unit);
    // dropped definition never surfaces, and since it was never registered
    // its call stays un-rewritten
    assert!(!printed.contains("function lost$macro$"));
    assert!(printed.contains("lost$macro$()"));
}

#[test]
fn definitions_nested_in_macros_are_rejected() {
    let source = "\
function outer$macro$(): number {
  function inner$macro$(): number {
    return 1;
  }
  return 2;
}
let a = outer$macro$();
";
    let (output, diagnostics) = expand(source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::DefinitionInsideMacro);
    // the nested definition is erased from the registered body too
    assert!(!output.contains("inner$macro$"));
    assert!(!output.contains("outer$macro$"));
    assert!(output.contains("return 2;"));
}

#[test]
fn definitions_nested_in_generic_functions_are_rejected() {
    let source = "\
function host<T>(x: T): T {
  function bad$macro$(): number {
    return 1;
  }
  return x;
}
";
    let (output, diagnostics) = expand(source);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        DiagnosticCode::DefinitionInsideGenericFunction
    );
    assert!(!output.contains("bad$macro$"));
    assert!(output.contains("function host<T>"));
}

#[test]
fn custom_marker_changes_recognition() {
    let source = "\
function sum_inline(a: number, b: number): number {
  return a + b;
}
let s = sum_inline(1, 2);
";
    let unit = parse(source, "test.spl").unwrap();
    let analysis = bind_unit(&unit);
    let outcome = splice::ExpansionPipeline::new(Config::with_marker("_inline"))
        .run(unit, &analysis)
        .unwrap();
    let printed = print_unit(&outcome.unit);
    assert!(!printed.contains("function sum_inline"));
    assert!(printed.contains("(function (a: number, b: number): number {"));
}
