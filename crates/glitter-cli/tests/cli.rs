//! End-to-end tests driving the compiled `glitter` binary, grounded on the
//! sibling compiler's own `assert_cmd`-based CLI test suite.

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn glitter_bin() -> Command {
    Command::cargo_bin("glitter").expect("glitter binary should build")
}

fn script_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn prints_hello_world() {
    let dir = TempDir::new().unwrap();
    let path = script_file(&dir, "hello.glit", r#"print "hello, world";"#);

    glitter_bin()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello, world"));
}

#[test]
fn assignment_and_arithmetic() {
    let dir = TempDir::new().unwrap();
    let path = script_file(
        &dir,
        "arith.glit",
        "var a = 2; var b = 3; print a * b + 1;",
    );

    glitter_bin()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("7"));
}

#[test]
fn recursive_function_runs() {
    let dir = TempDir::new().unwrap();
    let path = script_file(
        &dir,
        "fib.glit",
        "function fib(n) { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } print fib(6);",
    );

    glitter_bin()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("8"));
}

#[test]
fn closures_capture_independent_state() {
    let dir = TempDir::new().unwrap();
    let path = script_file(
        &dir,
        "closures.glit",
        r#"
        function make_counter() {
            var count = 0;
            function increment() {
                count = count + 1;
                print count;
            }
            return increment;
        }
        var a = make_counter();
        var b = make_counter();
        a();
        a();
        b();
        "#,
    );

    glitter_bin()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n2\n1\n"));
}

#[test]
fn for_loop_prints_each_iteration() {
    let dir = TempDir::new().unwrap();
    let path = script_file(
        &dir,
        "loop.glit",
        "for (var i = 0; i < 3; i = i + 1) { print i; }",
    );

    glitter_bin()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("0\n1\n2\n"));
}

#[test]
fn runtime_error_exits_nonzero_and_reports_diagnostic() {
    let dir = TempDir::new().unwrap();
    let path = script_file(&dir, "bad.glit", r#"print "x" + 1;"#);

    glitter_bin()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn missing_file_is_a_clean_failure() {
    glitter_bin()
        .arg("/nonexistent/path/to/script.glit")
        .assert()
        .failure();
}

#[test]
fn repl_quits_on_command() {
    glitter_bin()
        .write_stdin("print 1 + 1;\n!quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn repl_persists_globals_across_lines() {
    glitter_bin()
        .write_stdin("var a = 1;\na = a + 1;\nprint a;\n!quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn no_color_flag_suppresses_ansi_codes() {
    let dir = TempDir::new().unwrap();
    let path = script_file(&dir, "bad.glit", r#"print "x" + 1;"#);

    glitter_bin()
        .arg("--no-color")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn no_color_choice_is_remembered_on_the_next_run_without_the_flag() {
    let config_home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let path = script_file(&dir, "bad.glit", r#"print "x" + 1;"#);

    // First run passes --no-color explicitly; this should persist the
    // preference to the config file under the fake XDG config home.
    glitter_bin()
        .env("XDG_CONFIG_HOME", config_home.path())
        .arg("--no-color")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\u{1b}[").not());

    assert!(config_home.path().join("glitter").join("config.toml").exists());

    // Second run passes no flag at all; color should still be off because
    // it was remembered from the first run.
    glitter_bin()
        .env("XDG_CONFIG_HOME", config_home.path())
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\u{1b}[").not());
}
