//! End-to-end CLI tests (§6 "Command-line surface").
//!
//! Grounded on `faxc-drv`'s `tests/e2e/cli_tests.rs`: drive the real
//! built binary with `assert_cmd`, asserting on exit code and stdout
//! rather than calling library internals.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn tinyc() -> Command {
    Command::cargo_bin("tinyc").expect("tinyc binary should build")
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp source file");
    write!(file, "{contents}").expect("failed to write temp source file");
    file
}

#[test]
fn a_well_typed_program_exits_zero_and_prints_ir() {
    let file = source_file("int main() { int x = 3 + 5 * 2; return x; }");

    tinyc()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("return"));
}

#[test]
fn a_semantic_error_exits_one_and_prints_the_diagnostic() {
    let file = source_file("int main() { int a = 5; b = a + 3; return 0; }");

    tinyc()
        .arg(file.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Semantic"));
}

#[test]
fn a_missing_file_exits_two() {
    tinyc()
        .arg("/nonexistent/path/does-not-exist.tc")
        .assert()
        .code(2);
}

#[test]
fn help_output_mentions_the_binary_name() {
    tinyc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tinyc"));
}

#[test]
fn version_flag_succeeds() {
    tinyc().arg("--version").assert().success();
}

#[test]
fn emit_tokens_prints_the_token_stream_instead_of_ir() {
    let file = source_file("int x = 1;");

    tinyc()
        .arg(file.path())
        .arg("--emit")
        .arg("tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("Identifier"));
}

#[test]
fn emit_symbols_prints_a_scope_and_symbol_count() {
    let file = source_file("int x = 1; int y = 2;");

    tinyc()
        .arg(file.path())
        .arg("--emit")
        .arg("symbols")
        .assert()
        .success()
        .stdout(predicate::str::contains("symbols"));
}

#[test]
fn comments_flag_adds_region_comments_to_stdout() {
    let file = source_file("int main() { while (1) { } return 0; }");

    tinyc()
        .arg(file.path())
        .arg("--emit-comments")
        .assert()
        .success()
        .stdout(predicate::str::contains("While loop"));
}
