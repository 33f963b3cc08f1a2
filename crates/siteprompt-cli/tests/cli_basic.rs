//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a scratch
//! directory so config and storage never touch the real profile.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_siteprompt"))
        .args(args)
        .env("HOME", home)
        .env_remove("SITEPROMPT_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "newsletter.cooldown_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "7");
    assert!(home.path().join(".config/siteprompt/config.toml").exists());
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "exit_intent.cooldown_days", "3"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "exit_intent.cooldown_days"]);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "newsletter.colour", "red"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_notify_seeded_is_reproducible() {
    let home = tempfile::tempdir().unwrap();
    let args = ["notify", "--seed", "7", "--count", "3"];
    let (code, first, _) = run_cli(home.path(), &args);
    assert_eq!(code, 0);
    let (_, second, _) = run_cli(home.path(), &args);
    assert_eq!(first, second);

    let parsed: serde_json::Value = serde_json::from_str(&first).unwrap();
    let events = parsed.as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["id"], 1);
    assert!(events[0]["actorName"].is_string());
}

#[test]
fn test_check_admin_path_is_excluded() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["check", "--kind", "exit-intent", "--path", "/admin/crm", "--memory"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["eligible"], false);
    assert_eq!(parsed["reason"], "excluded_path");
}

#[test]
fn test_convert_then_check() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(home.path(), &["suppression", "convert"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(home.path(), &["check", "--path", "/blog"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["reason"], "already_converted");

    let (_, stdout, _) = run_cli(home.path(), &["suppression", "status"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed.as_array().unwrap().iter().all(|s| s["converted"] == true));
}

#[test]
fn test_simulate_scroll_shows_popup() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("reader.json");
    std::fs::write(
        &script,
        r#"{
            "name": "reader",
            "path": "/blog/year-end",
            "steps": [
                {"at_ms": 2000, "type": "scroll", "scroll_top": 1500, "scroll_height": 3000, "viewport_height": 900},
                {"at_ms": 4000, "type": "dismiss"}
            ]
        }"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(
        home.path(),
        &["simulate", "--script", script.to_str().unwrap(), "--memory"],
    );
    assert_eq!(code, 0, "{stderr}");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let types: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec!["PopupArmed", "TriggerFired", "PopupShown", "PopupDismissed"]
    );
}

#[test]
fn test_related_ranks_by_overlap() {
    let home = tempfile::tempdir().unwrap();
    let posts = home.path().join("posts.json");
    std::fs::write(
        &posts,
        r#"[
            {"slug": "gst-basics", "category": "Tax", "tags": ["gst", "small-business"]},
            {"slug": "gst-filing", "category": "Tax", "tags": ["gst"]},
            {"slug": "payroll-101", "category": "Payroll", "tags": ["small-business"]},
            {"slug": "office-party", "category": "News", "tags": []}
        ]"#,
    )
    .unwrap();

    let (code, stdout, _) = run_cli(
        home.path(),
        &["related", "--posts", posts.to_str().unwrap(), "--slug", "gst-basics"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slugs: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["post"]["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["gst-filing", "payroll-101"]);
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("siteprompt"));
}

#[test]
fn test_config_get_unknown_key_reports_core_error() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_cli(home.path(), &["config", "get", "newsletter.colour"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Unknown configuration key: newsletter.colour"));
}
