//! Integration tests for the `slots` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the find and
//! check-config subcommands through the actual binary, including stdin/stdout
//! piping, file I/O and error handling.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn request_json() -> String {
    std::fs::read_to_string(fixture("request.json")).expect("request.json fixture must exist")
}

fn slot_starts(stdout: &[u8]) -> Vec<String> {
    let value: Value = serde_json::from_slice(stdout).expect("stdout must be JSON");
    value
        .as_array()
        .expect("stdout must be a JSON array")
        .iter()
        .map(|s| s["startAt"].as_str().unwrap().to_string())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// find
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn find_stdin_to_stdout() {
    let assert = Command::cargo_bin("slots")
        .unwrap()
        .arg("find")
        .write_stdin(request_json())
        .assert()
        .success();

    let starts = slot_starts(&assert.get_output().stdout);
    assert_eq!(starts.len(), 7);
    assert_eq!(starts[0], "2026-03-02T09:00:00Z");
    assert!(!starts.contains(&"2026-03-02T12:00:00Z".to_string()));
}

#[test]
fn find_file_to_file() {
    let output_path = std::env::temp_dir().join("slots-test-find-output.json");
    let _ = std::fs::remove_file(&output_path);

    Command::cargo_bin("slots")
        .unwrap()
        .args(["find", "-i", &fixture("request.json"), "-o"])
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read(&output_path).expect("output file must exist");
    assert_eq!(slot_starts(&content).len(), 7);

    let _ = std::fs::remove_file(&output_path);
}

#[test]
fn find_pretty_output_is_indented() {
    Command::cargo_bin("slots")
        .unwrap()
        .args(["find", "--pretty", "-i", &fixture("request.json")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  {"))
        .stdout(predicate::str::contains("\"priority\""));
}

#[test]
fn find_with_toml_config_override() {
    let assert = Command::cargo_bin("slots")
        .unwrap()
        .args([
            "find",
            "-i",
            &fixture("request.json"),
            "--config",
            &fixture("engine.toml"),
        ])
        .assert()
        .success();

    let starts = slot_starts(&assert.get_output().stdout);
    assert_eq!(
        starts,
        vec!["2026-03-02T09:00:00Z", "2026-03-02T14:30:00Z"]
    );
}

#[test]
fn find_rejects_invalid_json() {
    Command::cargo_bin("slots")
        .unwrap()
        .arg("find")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse availability request"));
}

#[test]
fn find_rejects_zero_duration() {
    let request = request_json().replace("\"duration\": 60", "\"duration\": 0");
    Command::cargo_bin("slots")
        .unwrap()
        .arg("find")
        .write_stdin(request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn find_missing_input_file() {
    Command::cargo_bin("slots")
        .unwrap()
        .args(["find", "-i", "/nonexistent/request.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read request file"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    let assert = Command::cargo_bin("slots")
        .unwrap()
        .args(["-v", "find", "-i", &fixture("request.json")])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("shift processed"));

    // stdout is still parseable JSON.
    assert_eq!(slot_starts(&assert.get_output().stdout).len(), 7);
}

// ─────────────────────────────────────────────────────────────────────────────
// check-config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_config_prints_normalized_json() {
    Command::cargo_bin("slots")
        .unwrap()
        .args(["check-config", "-i", &fixture("engine.toml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slotStart\": \"custom\""))
        .stdout(predicate::str::contains("\"breakDuration\": 10"))
        .stdout(predicate::str::contains("\"14:30\""));
}

#[test]
fn check_config_rejects_unsupported_step() {
    Command::cargo_bin("slots")
        .unwrap()
        .args(["check-config", "-i", &fixture("bad_engine.toml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid engine configuration"));
}

#[test]
fn no_subcommand_shows_usage() {
    Command::cargo_bin("slots")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
