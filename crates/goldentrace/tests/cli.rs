//! End-to-end runs of the `goldentrace` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const GOLDEN: &str = r#"{"name": "kernel.scan", "attributes": ["kc.rows:3"]}
{"name": "duckdb.plan", "attributes": ["kc.plan:SELECT 1"]}
{"name": "timer.fire", "attributes": ["kc.timestamp:100"]}
{"name": "timer.fire", "attributes": ["kc.timestamp:200"]}
{"name": "tx.commit", "attributes": []}
{"name": "receipt.verify", "attributes": ["merkle_root:abc123"]}
"#;

fn write_trace(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("trace.jsonl");
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_goldentrace"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn golden_trace_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, GOLDEN);

    let output = run(&[&path]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("🎯 Golden trace verification: PASSED"));
}

#[test]
fn constant_output_exits_one() {
    let dir = TempDir::new().unwrap();
    let trace = format!(
        "{}{}\n{}\n",
        GOLDEN,
        r#"{"name": "query.run", "attributes": ["result:42"]}"#,
        r#"{"name": "query.run", "attributes": ["result:42"]}"#,
    );
    let path = write_trace(&dir, &trace);

    let output = run(&[&path]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("  ❌ Constant output detected in query: 42"));
    assert!(text.trim_end().ends_with("🎯 Golden trace verification: FAILED"));
}

#[test]
fn malformed_line_fails_every_check() {
    let dir = TempDir::new().unwrap();
    let mut lines: Vec<&str> = GOLDEN.lines().collect();
    lines.insert(3, "{\"name\": \"timer.fire\", \"attributes\": [");
    let path = write_trace(&dir, &lines.join("\n"));

    let output = run(&[&path]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("Failed to load traces"));
    assert!(text.contains("  ❌ No execution routing spans found"));
    assert!(text.contains("  ❌ No timer hook spans found"));
    assert!(text.contains("  ❌ No transaction spans found"));
    assert!(text.contains("  ❌ No operation spans found"));
}

#[test]
fn missing_file_exits_one() {
    let dir = TempDir::new().unwrap();
    let output = run(&[&dir.path().join("absent.jsonl")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("not found"));
}

#[test]
fn wrong_argument_count_exits_one() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));

    let output = run(&[Path::new("a.jsonl"), Path::new("b.jsonl")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn report_flag_writes_verdict_json() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, GOLDEN);
    let report = dir.path().join("verdict.json");

    let output = Command::new(env!("CARGO_BIN_EXE_goldentrace"))
        .arg(&path)
        .arg("--report")
        .arg(&report)
        .arg("--parallel")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["execution_routing"], true);
    assert_eq!(json["span_count"], 6);
    assert!(json["violations"].as_array().unwrap().is_empty());
}

#[test]
fn repeated_runs_over_same_file_agree() {
    let dir = TempDir::new().unwrap();
    let trace = format!(
        "{}{}\n",
        GOLDEN,
        r#"{"name": "receipt.fake", "attributes": ["status:ok"]}"#
    );
    let path = write_trace(&dir, &trace);

    let mut runs = Vec::new();
    for i in 0..2 {
        let report = dir.path().join(format!("verdict-{}.json", i));
        let output = Command::new(env!("CARGO_BIN_EXE_goldentrace"))
            .arg(&path)
            .arg("--report")
            .arg(&report)
            .output()
            .unwrap();
        let verdict: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        runs.push((output.status.code(), stdout(&output), verdict));
    }

    assert_eq!(runs[0].0, Some(1));
    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].2["transaction_integrity"], false);
}

#[test]
fn misspelled_vocabulary_field_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = write_trace(&dir, GOLDEN);
    let vocab = dir.path().join("vocab.json");
    std::fs::write(&vocab, r#"{"timer_markr": "hook"}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_goldentrace"))
        .arg(&path)
        .arg("--vocabulary")
        .arg(&vocab)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("timer_markr"));
}

#[test]
fn vocabulary_override_is_applied() {
    let dir = TempDir::new().unwrap();
    let trace = GOLDEN.replace("timer.fire", "hook.fire");
    let path = write_trace(&dir, &trace);

    assert_eq!(run(&[&path]).status.code(), Some(1));

    let vocab = dir.path().join("vocab.json");
    std::fs::write(&vocab, r#"{"timer_marker": "hook"}"#).unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_goldentrace"))
        .arg(&path)
        .arg("--vocabulary")
        .arg(&vocab)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
}
