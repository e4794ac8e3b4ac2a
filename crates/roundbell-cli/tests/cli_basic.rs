//! Basic CLI E2E tests.
//!
//! Tests invoke the built `roundbell` binary with HOME pointed at a temporary
//! directory, so config and history never touch the real user directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_roundbell"))
        .args(args)
        .env("HOME", home)
        .env_remove("ROUNDBELL_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_plan(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const SHORT_PLAN: &str = r#"
title = "Short"
workout_type = "running"

[[warmup]]
name = "Walk"
duration = 5

[[warmup]]
name = "Broken"
duration = 0

[[rounds]]
work_time = 6
rest_time = 3

[[rounds.exercises]]
name = "Sprint"
duration = 6

[[rounds]]
work_time = 6

[[cooldown]]
name = "Stretch"
duration = 4
"#;

// ============================================================================
// plan
// ============================================================================

#[test]
fn test_plan_show_sample() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["plan", "show"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["total_rounds"], 3);
    assert_eq!(json["plan"]["title"], "Sample Boxing");
    assert_eq!(json["segment_secs"], 855);
}

#[test]
fn test_plan_check_reports_issues() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), "short.toml", SHORT_PLAN);
    let (stdout, stderr, code) = run_cli(home.path(), &["plan", "check", plan.to_str().unwrap()]);
    assert_eq!(code, 0);
    let issues: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert!(issues.iter().any(|i| i["kind"] == "non_positive_warmup"));
    assert!(issues.iter().any(|i| i["kind"] == "empty_combination"));
    assert!(stderr.contains("issue(s) found"));
}

#[test]
fn test_plan_missing_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["plan", "show", "/nonexistent/plan.toml"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn test_plan_json_with_camel_case_fields() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(
        home.path(),
        "plan.json",
        r#"{"title":"J","workoutType":"gym","rounds":[{"workTime":60,"restTime":15}]}"#,
    );
    let (stdout, _, code) = run_cli(home.path(), &["plan", "show", plan.to_str().unwrap()]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["plan"]["workout_type"], "gym");
    assert_eq!(json["rounds_secs"], 75);
}

// ============================================================================
// session
// ============================================================================

#[test]
fn test_session_simulate_runs_to_completion() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), "short.toml", SHORT_PLAN);
    let (stdout, _, code) = run_cli(
        home.path(),
        &["session", "simulate", plan.to_str().unwrap(), "--prep", "2"],
    );
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    // 2 prep + 5 walk + 60 rest + 6 + 3 + 6 + 4 stretch
    assert_eq!(summary["duration_secs"], 86);
    assert_eq!(summary["workout_type"], "running");
    assert_eq!(summary["skips_used"], 0);
}

#[test]
fn test_session_simulate_events_are_json_lines() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), "short.toml", SHORT_PLAN);
    let (stdout, _, code) = run_cli(
        home.path(),
        &["session", "simulate", plan.to_str().unwrap(), "--events"],
    );
    assert_eq!(code, 0);
    let first = stdout.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["type"], "session_started");
    assert!(stdout.contains("\"type\":\"malformed_exercise_skipped\""));
    assert!(stdout.contains("\"type\":\"session_finished\""));
}

#[test]
fn test_session_simulate_skip_all() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["session", "simulate", "--skip-all"]);
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["duration_secs"], 0);
    assert_eq!(summary["skips_used"], 5);
}

#[test]
fn test_session_run_quit_abandons() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), "short.toml", SHORT_PLAN);
    let mut child = Command::new(env!("CARGO_BIN_EXE_roundbell"))
        .args(["session", "run", plan.to_str().unwrap(), "--no-save", "--mute"])
        .env("HOME", home.path())
        .env_remove("ROUNDBELL_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"q\n").unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("session abandoned"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "session.skip_budget", "3"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "session.skip_budget"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "session.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "audio.announcements", "loud"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_list_and_path() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("session.preparation_secs = 10"));
    assert!(stdout.contains("audio.announcements = true"));

    let (stdout, _, code) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/roundbell/config.toml"));
}

#[test]
fn test_config_drives_simulation() {
    let home = tempfile::tempdir().unwrap();
    let plan = write_plan(home.path(), "short.toml", SHORT_PLAN);
    run_cli(home.path(), &["config", "set", "session.post_warmup_rest_secs", "0"]);
    let (stdout, _, code) = run_cli(
        home.path(),
        &["session", "simulate", plan.to_str().unwrap(), "--prep", "0"],
    );
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["duration_secs"], 24);
}

// ============================================================================
// history
// ============================================================================

#[test]
fn test_history_starts_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["history", "list"]);
    assert_eq!(code, 0);
    let records: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert!(records.is_empty());

    let (stdout, _, code) = run_cli(home.path(), &["history", "stats"]);
    assert_eq!(code, 0);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["total_sessions"], 0);
}
