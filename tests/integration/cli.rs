mod common;
use common::mic;

use std::path::{Path, PathBuf};
use std::process::Output;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn isolated_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    dir
}

fn check(args: &[&str], file: &Path) -> Output {
    mic().arg("check").args(args).arg(file).output().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const VALID: &str = "module m { fn main { std.println(\"hi\"); } }";

#[test]
fn check_valid_file() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", VALID);
    let output = check(&[], &file);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("ok (0 warning(s))"));
}

#[test]
fn check_reports_errors() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", "module m { fn main { int x = \"s\"; } }");
    let output = check(&[], &file);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Datatypes are not equal on both sides"), "{err}");
    assert!(err.contains("analysis failed with 1 error(s)"), "{err}");
}

#[test]
fn no_stdlib_hides_std_module() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", VALID);
    let output = check(&["--no-stdlib"], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Cannot find module 'std'"));
}

#[test]
fn deny_warnings_fails_on_warning() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", "module m { fn main { while (true) { break; int x = 1; } } }");
    let output = check(&[], &file);
    assert!(output.status.success());
    assert!(stderr(&output).contains("ok (1 warning(s))"));

    let output = check(&["--deny-warnings"], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unreachable statement"));
}

#[test]
fn dump_ast_prints_json() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", VALID);
    let output = check(&["--dump-ast"], &file);
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "PARENT");
    let children = json["children"].as_array().unwrap();
    assert!(children.iter().any(|c| c["kind"] == "STDLIB_FINISH"));
    assert_eq!(children.last().unwrap()["kind"], "CREATE_MODULE");
}

#[test]
fn discovered_config_applies() {
    let dir = isolated_dir();
    write(dir.path(), "mi.toml", "[analyzer]\ndeny_warnings = true\n");
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    let file = write(&src, "main.mi", "module m { fn main { ret; int x = 1; } }");
    let output = check(&[], &file);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn explicit_config_overrides_discovery() {
    let dir = isolated_dir();
    write(dir.path(), "mi.toml", "[analyzer]\nstdlib = false\n");
    let other = write(dir.path(), "other.toml", "[analyzer]\nstdlib = true\n");
    let file = write(dir.path(), "main.mi", VALID);

    assert_eq!(check(&[], &file).status.code(), Some(1));
    let output = check(&["--config", other.to_str().unwrap()], &file);
    assert!(output.status.success(), "{}", stderr(&output));
}

#[test]
fn invalid_config_reported() {
    let dir = isolated_dir();
    write(dir.path(), "mi.toml", "[analyzer]\nturbo = true\n");
    let file = write(dir.path(), "main.mi", VALID);
    let output = check(&[], &file);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[config]"));
}

#[test]
fn missing_file() {
    let dir = isolated_dir();
    let output = check(&[], &dir.path().join("absent.mi"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn tokens_command_lists_tokens() {
    let dir = isolated_dir();
    let file = write(dir.path(), "main.mi", "module m { }");
    let output = mic().arg("tokens").arg(&file).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("1:1\tmodule\tmodule"), "{}", lines[0]);
    assert!(lines[1].ends_with("\tm"));
}
