//! End-to-end tests for the complete reconciliation flow.
//!
//! Tests the full pipeline through the binary: load roster and tables →
//! reconcile → render. This validates the report surface works end-to-end.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn cr_binary() -> String {
    env!("CARGO_BIN_EXE_cr").to_string()
}

/// Writes a roster and one activity table into the temp directory.
fn write_inputs(dir: &Path) {
    fs::write(
        dir.join("roster.json"),
        r#"[
            {"agent": "Jane Doe", "desk": "Team A", "department": 1},
            {"agent": "Mei Tanaka", "desk": "Japan Team", "department": 2}
        ]"#,
    )
    .unwrap();

    let tables = dir.join("activity");
    fs::create_dir(&tables).unwrap();
    fs::write(
        tables.join("coperato-traling.json"),
        r#"[
            {"Name": "jane doe - 9", "Duration": "45:00", "Call Attempts": 3, "Unique": 5, "Disposition": "ANSWERED"},
            {"Name": "jane doe - 9", "Duration": "1:00", "Call Attempts": 1, "Unique": 5, "Disposition": "NO ANSWER"}
        ]"#,
    )
    .unwrap();
    fs::write(
        tables.join("voicespin.json"),
        r#"[
            {"AGENT": "Unknown Caller - 44", "BILLSEC": "1:30:00", "CALL ID": "c-1", "CALL STATUS": "ANSWERED"}
        ]"#,
    )
    .unwrap();
}

fn run_report(dir: &Path, extra: &[&str]) -> std::process::Output {
    Command::new(cr_binary())
        .current_dir(dir)
        .arg("report")
        .arg("--roster")
        .arg(dir.join("roster.json"))
        .arg("--tables")
        .arg(dir.join("activity"))
        .args(extra)
        .output()
        .expect("failed to run cr report")
}

#[test]
fn report_reconciles_and_prints_totals() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());

    let output = run_report(temp.path(), &[]);
    assert!(
        output.status.success(),
        "cr report should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    // The answered call counts: 45:00 under the generic convention is 2700 s.
    assert!(stdout.contains("Jane Doe"));
    assert!(stdout.contains("talk 45 m 0 s (30.00%)"));
    assert!(stdout.contains("attempts 3 (1.20%)"));
    // The zero-activity retention agent still appears.
    assert!(stdout.contains("Mei Tanaka"));
    // The unmatched voicespin identity is surfaced, suffix stripped.
    assert!(stdout.contains("voicespin: Unknown Caller"));
}

#[test]
fn report_json_mode_is_machine_readable() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());

    let output = run_report(temp.path(), &["--json"]);
    assert!(output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let jane = &parsed["conversion"][0];
    assert_eq!(jane["agent"], "jane doe");
    assert_eq!(jane["total_seconds"], 2700);
    assert_eq!(jane["total_attempts"], 3);
    assert_eq!(jane["total_unique"], 5);
    assert_eq!(parsed["unmatched"]["voicespin"][0], "unknown caller");
}

#[test]
fn report_fails_on_duplicate_roster_entries() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());
    fs::write(
        temp.path().join("roster.json"),
        r#"[
            {"agent": "Jane Doe", "desk": "Team A", "department": 1},
            {"agent": "JANE DOE", "desk": "Team B", "department": 2}
        ]"#,
    )
    .unwrap();

    let output = run_report(temp.path(), &[]);
    assert!(!output.status.success(), "duplicate roster keys must abort");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate roster entry"));
}

#[test]
fn sources_lists_the_builtin_registry() {
    let output = Command::new(cr_binary())
        .arg("sources")
        .output()
        .expect("failed to run cr sources");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for source in ["voiso-summitlife", "coperato-signix", "voicespin"] {
        assert!(stdout.contains(source), "missing {source}");
    }
    assert!(stdout.contains("CALL STATUS = ANSWERED"));
}
