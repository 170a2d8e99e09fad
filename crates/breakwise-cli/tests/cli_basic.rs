//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::io::Write;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "breakwise-cli", "--"])
        .args(args)
        .env("BREAKWISE_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_version() {
    let (stdout, _, code) = run_cli(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("breakwise-cli"));
}

#[test]
fn test_stats_list_json_parses() {
    let (stdout, _, code) = run_cli(&["stats", "list", "--json"]);
    assert_eq!(code, 0, "stats list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stats output not JSON");
    assert!(parsed.is_array());
}

#[test]
fn test_break_feedback_validates_ranges() {
    let (_, stderr, code) = run_cli(&["break", "feedback", "--delta", "9", "--experience", "5"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("delta"));
}

#[test]
fn test_full_break_flow() {
    // Start from a clean slate: reset config, clear any in-flight state.
    let (_, _, code) = run_cli(&["config", "reset"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(&["break", "abandon"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(&["config", "get", "epsilon"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0.05");

    for name in ["Walk outside", "Stretch", "Tea break"] {
        let (_, _, code) = run_cli(&["favorite", "add", name]);
        assert_eq!(code, 0, "favorite add {name} failed");
    }
    let (stdout, _, code) = run_cli(&["favorite", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("* Stretch"));

    // Load busy intervals from a local export.
    let feed = std::env::temp_dir().join("breakwise_feed.ics");
    {
        let mut f = std::fs::File::create(&feed).unwrap();
        writeln!(f, "BEGIN:VCALENDAR").unwrap();
        writeln!(f, "BEGIN:VEVENT").unwrap();
        writeln!(f, "DTSTART:20300101T090000").unwrap();
        writeln!(f, "DTEND:20300101T100000").unwrap();
        writeln!(f, "SUMMARY:Far future standup").unwrap();
        writeln!(f, "END:VEVENT").unwrap();
        writeln!(f, "END:VCALENDAR").unwrap();
    }
    let feed_arg = feed.to_string_lossy().to_string();
    let (stdout, _, code) = run_cli(&["calendar", "load", &feed_arg]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Loaded"), "unexpected status: {stdout}");

    let (stdout, _, code) = run_cli(&["break", "suggest", "--seed", "7"]);
    assert_eq!(code, 0, "suggest failed: {stdout}");
    assert!(stdout.contains("Recommended break:"));

    let (_, _, code) = run_cli(&["break", "accept"]);
    assert_eq!(code, 0);

    // Pick the first offered slot, if the real clock leaves one today.
    let (stdout, _, code) = run_cli(&["break", "slots", "--duration", "30"]);
    assert_eq!(code, 0);
    let first_slot = stdout
        .lines()
        .filter_map(|l| l.strip_prefix("  "))
        .find(|l| l.len() == 5 && l.contains(':'))
        .map(str::to_string);

    if let Some(slot) = first_slot {
        let (stdout, _, code) = run_cli(&["break", "schedule", &slot, "--duration", "30"]);
        assert_eq!(code, 0, "schedule failed: {stdout}");

        let (_, _, code) = run_cli(&["break", "done"]);
        assert_eq!(code, 0);

        let (stdout, _, code) =
            run_cli(&["break", "feedback", "--delta", "3", "--experience", "8"]);
        assert_eq!(code, 0);
        assert!(stdout.contains("learned value"), "got: {stdout}");

        let (stdout, _, code) = run_cli(&["stats", "list"]);
        assert_eq!(code, 0);
        assert!(stdout.contains("report(s)"));
    } else {
        // Day already over; at least leave the machine in a clean state.
        let (_, _, code) = run_cli(&["break", "abandon"]);
        assert_eq!(code, 0);
    }

    let _ = std::fs::remove_file(&feed);
}
