//! CLI surface tests: the `splice` binary over the fixture sources.

use assert_cmd::Command;
use predicates::prelude::*;

fn splice() -> Command {
    Command::cargo_bin("splice").expect("binary builds")
}

#[test]
fn expand_prints_the_transformed_source() {
    splice()
        .args(["expand", "tests/fixtures/simple.spl"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "(function (a: number, b: number): number {",
        ))
        .stdout(predicate::str::contains("$macro$").not());
}

#[test]
fn definition_comments_are_erased_with_the_definition() {
    splice()
        .args(["expand", "tests/fixtures/simple.spl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("// the smallest useful macro").not());
}

#[test]
fn check_reports_ok_on_clean_input() {
    splice()
        .args(["check", "tests/fixtures/simple.spl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_fails_and_reports_diagnostics() {
    splice()
        .args(["check", "tests/fixtures/mismatch.spl"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("24010"));
}

#[test]
fn check_emits_json_diagnostics() {
    splice()
        .args(["check", "--json", "tests/fixtures/mismatch.spl"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": 24010"));
}

#[test]
fn expand_over_a_directory_discovers_sources() {
    splice()
        .args(["expand", "tests/fixtures"])
        .assert()
        .success()
        .stdout(predicate::str::contains("// ==> "));
}

#[test]
fn missing_files_fail_with_an_io_error() {
    splice()
        .args(["expand", "tests/fixtures/nope.spl"])
        .assert()
        .failure();
}

#[test]
fn config_file_sets_the_marker() {
    splice()
        .args([
            "expand",
            "tests/fixtures/simple.spl",
            "--config",
            "tests/fixtures/inline_marker.json",
        ])
        .assert()
        .success()
        // under the config's `_inline` marker nothing here is a macro
        .stdout(predicate::str::contains("function add$macro$"));
}

#[test]
fn custom_marker_flag_is_honored() {
    splice()
        .args(["expand", "tests/fixtures/simple.spl", "--marker", "_inline"])
        .assert()
        .success()
        // with a different marker nothing is recognized: round-trip
        .stdout(predicate::str::contains("function add$macro$"));
}
