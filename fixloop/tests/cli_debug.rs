//! CLI tests for `fixloop init`, `fixloop debug`, and `fixloop exec`.
//!
//! Spawns the fixloop binary with a config whose reasoning command is a small
//! shell script, and checks exit codes and artifacts.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::Command;

use fixloop::exit_codes;
use fixloop::io::config::{FixloopConfig, load_config, write_config};
use fixloop::test_support::require_python;

const RESPONDER: &str = r#"#!/bin/sh
prompt=$(cat)
case "$prompt" in
  *"You are a Expert Code Fixer."*)
    printf '```python\ndef safe_divide(a, b):\n    if b == 0:\n        return None\n    return a / b\n\nfor n in [10, 5, 0]:\n    print(safe_divide(10, n))\n```\n'
    ;;
  *"You are a Expert Code Validator."*)
    printf '{"validation": "VALID", "reason": "guarded", "remaining_issues": [], "confidence": "High"}\n'
    ;;
  *)
    printf 'BUG ANALYSIS:\nRuntime Issues:\n- division by zero\n'
    ;;
esac
"#;

fn write_cfg(dir: &Path, command: Vec<String>) {
    let mut cfg = FixloopConfig::default();
    cfg.reasoning.command = command;
    write_config(&dir.join("fixloop.toml"), &cfg).expect("write config");
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");

    let status = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("fixloop init");
    assert_eq!(status.code(), Some(exit_codes::OK));
    let cfg = load_config(&temp.path().join("fixloop.toml")).expect("load");
    assert_eq!(cfg, FixloopConfig::default());

    let again = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .arg("init")
        .status()
        .expect("fixloop init again");
    assert_eq!(again.code(), Some(exit_codes::INVALID));
}

#[test]
fn debug_sample_succeeds_and_writes_session_log() {
    require_python();
    let temp = tempfile::tempdir().expect("tempdir");
    let script = temp.path().join("responder.sh");
    fs::write(&script, RESPONDER).expect("write responder");
    write_cfg(
        temp.path(),
        vec!["sh".to_string(), script.display().to_string()],
    );

    let output = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .args(["debug", "--sample", "runtime", "--json", "--log-dir", "logs"])
        .output()
        .expect("fixloop debug");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("report json");
    assert_eq!(report["success"], true);
    assert_eq!(report["attempts"], 1);
    assert_eq!(report["phase"], "Succeeded");

    let sessions: Vec<_> = fs::read_dir(temp.path().join("logs"))
        .expect("read logs")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].join("report.json").exists());
    let history = fs::read_to_string(sessions[0].join("history.jsonl")).expect("history");
    assert_eq!(history.lines().count(), 4);
}

#[test]
fn debug_exhaustion_exits_with_exhausted_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_cfg(temp.path(), vec!["false".to_string()]);
    fs::write(temp.path().join("bug.py"), "import math\nprint(math.pie)\n").expect("write source");

    let output = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .args(["debug", "bug.py"])
        .output()
        .expect("fixloop debug");

    assert_eq!(output.status.code(), Some(exit_codes::EXHAUSTED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not fixed after 2 attempt(s)"));
    assert!(stdout.contains("AGENT ERROR"));
}

#[test]
fn debug_rejects_invalid_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("fixloop.toml"), "max_retries = 0\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .args(["debug", "--sample", "syntax"])
        .output()
        .expect("fixloop debug");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_retries"));
}

#[test]
fn exec_prints_execution_result() {
    require_python();
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("div.py"), "print('before')\nprint(1 / 0)\n").expect("write source");

    let output = Command::new(env!("CARGO_BIN_EXE_fixloop"))
        .current_dir(temp.path())
        .args(["exec", "div.py"])
        .output()
        .expect("fixloop exec");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("result json");
    assert_eq!(result["success"], false);
    assert_eq!(result["error_kind"], "ZeroDivisionError");
    assert_eq!(result["output"], "before");
}
