//! Expansion-pass contract tests: the observable properties of splicing.

mod common;

use common::{assert_same, expand, expand_clean, reprint};
use splice::diagnostics::DiagnosticCode;

#[test]
fn call_substitution_identity() {
    let output = expand_clean(
        "\
function add$macro$(a: number, b: number): number {
  return a + b;
}
let sum = add$macro$(1, 2);
",
    );
    let expected = reprint(
        "let sum = (function (a: number, b: number): number { return a + b; })(1, 2);\n",
    );
    assert_same(&output, &expected);
}

#[test]
fn erasure_removes_every_recognized_definition() {
    let output = expand_clean(
        "\
function one$macro$(): number {
  return 1;
}
async function two$macro$(): number {
  return 2;
}
let a = one$macro$();
",
    );
    assert!(!output.contains("$macro$"));
    assert!(!output.contains("function one"));
    assert!(!output.contains("function two"));
}

#[test]
fn non_interference_with_marker_lookalikes() {
    let output = expand_clean(
        "\
function real$macro$(): number {
  return 1;
}
let fake$macro$ = 5;
let use1 = fake$macro$ + 1;
let use2 = real$macro$();
",
    );
    // a value binding whose name merely carries the marker is untouched
    assert!(output.contains("let fake$macro$ = 5;"));
    assert!(output.contains("fake$macro$ + 1"));
    // while the real macro call expanded
    assert!(output.contains("(function (): number {"));
    assert!(!output.contains("real$macro$"));
}

#[test]
fn calls_resolve_through_alias_indirection() {
    let output = expand_clean(
        "\
function add$macro$(a: number, b: number): number {
  return a + b;
}
alias plus = add$macro$;
alias sum = plus;
let n = sum(1, 2);
",
    );
    assert!(output.contains("(function (a: number, b: number): number {"));
    assert!(!output.contains("sum(1, 2)"));
}

#[test]
fn nested_macro_calls_expand_with_composed_bindings() {
    let output = expand_clean(
        "\
function array$macro$<T>(): T[] {
  return [];
}
function wrap$macro$<T>(): T[] {
  return array$macro$<T>();
}
let xs = wrap$macro$<number>();
",
    );
    let expected = reprint(
        "\
let xs = (function (): number[] {
  return (function (): number[] { return []; })();
})();
",
    );
    assert_same(&output, &expected);
}

#[test]
fn macro_calls_inside_generic_functions_keep_outer_parameters() {
    let output = expand_clean(
        "\
function array$macro$<T>(): T[] {
  return [];
}
function generic<FT>(): FT[] {
  return array$macro$<FT>();
}
",
    );
    let expected = reprint(
        "\
function generic<FT>(): FT[] {
  return (function (): FT[] { return []; })();
}
",
    );
    assert_same(&output, &expected);
}

#[test]
fn arguments_are_expansion_visited_but_never_substituted() {
    let output = expand_clean(
        "\
function inc$macro$(n: number): number {
  return n + 1;
}
function twice$macro$(n: number): number {
  return n + n;
}
let r = twice$macro$(inc$macro$(1));
",
    );
    // both calls expanded; the argument expression expanded in place
    assert!(!output.contains("$macro$"));
    assert!(output.contains(")((function (n: number): number {"));
}

#[test]
fn expansion_is_idempotent() {
    let source = "\
function add$macro$<T>(a: T, b: T): T {
  return a + b;
}
let s = add$macro$<number>(1, 2);
let untouched = 3;
";
    let (first, diagnostics) = expand(source);
    assert!(diagnostics.is_empty());
    let (second, diagnostics) = expand(&first);
    assert!(diagnostics.is_empty());
    assert_same(&second, &first);
}

#[test]
fn units_without_macro_calls_round_trip() {
    let source = "\
// a plain unit
function plain(x: number): number {
  return x * 2;
}
type Pair<A, B> = { first: A, second: B };
let p: Pair<number, string>;
let d = plain(4);
";
    let output = expand_clean(source);
    assert_same(&output, &reprint(source));
}

#[test]
fn mismatched_type_arguments_degrade_with_one_diagnostic() {
    let (output, diagnostics) = expand(
        "\
function pair$macro$<A, B>(a: A, b: B): A {
  return a;
}
let p = pair$macro$<number>(1, 2);
",
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code,
        DiagnosticCode::CallTypeArgumentMismatch
    );
    // the call is still spliced, its types left as originally written and
    // its type-parameter list retained
    assert!(output.contains("(function <A, B>(a: A, b: B): A {"));
    assert!(!output.contains("pair$macro$"));
}

#[test]
fn modifiers_relevant_to_the_call_form_survive() {
    let output = expand_clean(
        "\
async function fetch$macro$(url: string): string {
  return url;
}
function* seq$macro$(): number {
  return 1;
}
let f = fetch$macro$(\"x\");
let g = seq$macro$();
",
    );
    assert!(output.contains("(async function (url: string): string {"));
    assert!(output.contains("(function* (): number {"));
}

#[test]
fn definition_site_comments_do_not_leak() {
    let output = expand_clean(
        "\
function note$macro$(): number {
  // inner note
  return 1;
}
// call comment
let n = note$macro$();
",
    );
    assert!(!output.contains("inner note"));
    assert!(output.contains("// call comment"));
}
