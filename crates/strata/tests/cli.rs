//! Integration tests for the strata binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn strata(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(args)
        .arg("--dir")
        .arg(dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run strata")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn setup(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    for (name, text) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        fs::write(path, text).expect("Failed to write source");
    }
    temp
}

#[test]
fn test_render_cascade() {
    let temp = setup(&[
        ("base.yml", "server: &server\n  host: localhost\n  port: 80\n"),
        ("prod.yml", "server:\n  port: 443\nbackup:\n  <<: *server\n"),
    ]);
    let output = strata(temp.path(), &["render", "base", "prod"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["server"]["port"], 443);
    assert_eq!(json["server"]["host"], "localhost");
    assert_eq!(json["backup"]["port"], 80);
}

#[test]
fn test_render_with_override_and_compact_output() {
    let temp = setup(&[("base.yml", "a:\n  b: 1\n")]);
    let output = strata(
        temp.path(),
        &["render", "base", "--override", "a.b: 2", "--compact"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "{\"a\":{\"b\":2}}\n");
}

#[test]
fn test_render_to_file() {
    let temp = setup(&[("base.yml", "x: 1\n")]);
    let target = temp.path().join("out.json");
    let output = strata(
        temp.path(),
        &["render", "base", "--output", target.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(written["x"], 1);
}

#[test]
fn test_missing_source_warns_and_continues() {
    let temp = setup(&[("a.yml", "a: 1\n")]);
    let output = strata(temp.path(), &["render", "iDoNotExist", "a"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["a"], 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Warning [S-4-1]"), "{stderr}");
    assert!(stderr.contains("iDoNotExist.yml"));
}

#[test]
fn test_quiet_suppresses_warnings() {
    let temp = setup(&[("a.yml", "x: ${nope}\n")]);
    let output = strata(temp.path(), &["render", "a", "--quiet"]);
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Warning"));
}

#[test]
fn test_deny_warnings_fails() {
    let temp = setup(&[("a.yml", "x: ${nope}\n")]);
    let output = strata(temp.path(), &["render", "a", "--deny-warnings"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("S-4-2"));
}

#[test]
fn test_fatal_error_names_line() {
    let temp = setup(&[("a.yml", "a:\n  <<: *missing\n")]);
    let output = strata(temp.path(), &["render", "a"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error [S-2-1]"), "{stderr}");
    assert!(stderr.contains("  <<: *missing"));
}

#[test]
fn test_invalid_separator() {
    let temp = setup(&[("a.yml", "a: 1\n")]);
    let output = strata(temp.path(), &["render", "a", "--separator", ":"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("S-0-1"));
}

#[test]
fn test_includes() {
    let temp = setup(&[
        ("includer.yml", "@include shared/included\nnested:\n  @include shared/specific\n"),
        ("shared/included.yml", "included: true\n@include relative\n"),
        ("shared/relative.yml", "relativeIncluded: true\n"),
        ("shared/specific.yml", "includedSpecific: true\n"),
    ]);
    let output = strata(temp.path(), &["render", "includer"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["included"], true);
    assert_eq!(json["relativeIncluded"], true);
    assert_eq!(json["nested"]["includedSpecific"], true);
}

#[test]
fn test_explain_renders_markdown() {
    let temp = setup(&[("a.yml", "base: &base\n  x: 1\nuse:\n  <<: *base\n")]);
    let output = strata(temp.path(), &["explain", "a"]);
    assert!(output.status.success());

    let markdown = String::from_utf8_lossy(&output.stdout);
    assert!(markdown.starts_with("# Cascade walkthrough"));
    assert!(markdown.contains("## Hierarchy blown up"));
    assert!(markdown.contains("use.x: 1"));
}

#[test]
fn test_json_errors_for_warnings() {
    let temp = setup(&[("a.yml", "a: 1\n")]);
    let output = strata(temp.path(), &["render", "iDoNotExist", "a", "--json-errors"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warnings: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    assert_eq!(warnings.len(), 1, "{stderr}");
    assert_eq!(warnings[0]["kind"], "warning");
    assert_eq!(warnings[0]["code"], "S-4-1");
    assert_eq!(warnings[0]["subsystem"], "cascade");
}

#[test]
fn test_json_errors_for_fatal_error() {
    let temp = setup(&[("a.yml", "a:\n  <<: *missing\n")]);
    let output = strata(temp.path(), &["render", "a", "--json-errors"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let error: serde_json::Value = stderr
        .lines()
        .find_map(|line| serde_json::from_str(line).ok())
        .expect("no JSON diagnostic on stderr");
    assert_eq!(error["kind"], "error");
    assert_eq!(error["code"], "S-2-1");
    assert_eq!(error["line"], "  <<: *missing");
}

#[test]
fn test_dotted_source_name() {
    let temp = setup(&[("app.prod.yml", "env: prod\n")]);
    let output = strata(temp.path(), &["render", "app.prod"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["env"], "prod");
}
