//! End-to-end tests of the rguard binary against the fixtures.

use test_helpers::{rationale_kinds, rguard_bin, rguard_json, rguard_stdout, workspace_root};

use std::io::Write;
use std::process::Stdio;

fn fixture(name: &str) -> String {
    workspace_root()
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[test]
fn healthy_release_is_approved() {
    let result = rguard_json(&["evaluate", "fixtures/approve.json"], 0);
    assert_eq!(result["decision"], "APPROVE");
    assert_eq!(result["path"], "approve");
    assert_eq!(result["risk_score"], 12.5);
    assert_eq!(result["release_id"], "rc-2026.10.1");
    assert!(!rationale_kinds(&result).contains(&"gate_violation".to_string()));
    assert!(result["signals_hash"]
        .as_str()
        .unwrap()
        .starts_with("sha256:"));
}

#[test]
fn failing_e2e_blocks_with_exit_2() {
    let result = rguard_json(&["evaluate", "fixtures/block_e2e.json"], 2);
    assert_eq!(result["decision"], "BLOCK");
    assert_eq!(result["path"], "gate_block");

    let violation = result["rationale"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kind"] == "gate_violation")
        .expect("gate violation in rationale");
    assert_eq!(violation["rule"], "E2E_PASS_RATE");
    assert_eq!(violation["observed"], 0.7);
    assert_eq!(violation["limit"], 0.98);
    assert!(violation["message"]
        .as_str()
        .unwrap()
        .contains("e2e_pass_rate"));
}

#[test]
fn low_coverage_warns() {
    let result = rguard_json(&["evaluate", "fixtures/warn_coverage.json"], 0);
    assert_eq!(result["decision"], "WARN");
    assert_eq!(result["path"], "gate_warn");
    assert_eq!(result["release_id"], "local");

    let violation = result["rationale"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["kind"] == "gate_violation")
        .unwrap();
    assert_eq!(violation["rule"], "LINE_COVERAGE");
    assert_eq!(violation["severity"], "WARN");
}

#[test]
fn warn_gate_holds_a_high_risk_release_at_warn() {
    let result = rguard_json(&["evaluate", "fixtures/warn_high_risk.json"], 0);
    assert_eq!(result["decision"], "WARN");
    assert_eq!(result["path"], "gate_warn");
    assert_eq!(result["risk_score"], 92.0);
}

#[test]
fn no_signals_is_an_uninformative_approve() {
    let result = rguard_json(&["evaluate", "fixtures/empty.json"], 0);
    assert_eq!(result["decision"], "APPROVE");
    assert_eq!(result["risk_score"], 0.0);
    let kinds = rationale_kinds(&result);
    assert!(kinds.contains(&"score_uninformative".to_string()));
    assert!(!kinds.contains(&"gate_violation".to_string()));
    assert_eq!(kinds.last().unwrap(), "decision");
}

#[test]
fn require_signals_rejects_empty_release() {
    let out = rguard_bin()
        .args(["evaluate", "fixtures/empty.json", "--require-signals"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no signals found"));
}

#[test]
fn later_observation_supersedes_earlier() {
    let result = rguard_json(&["evaluate", "fixtures/duplicate_e2e.json"], 0);
    assert_eq!(result["decision"], "APPROVE");
    assert_eq!(result["risk_score"], 0.0);
}

#[test]
fn stdin_input_matches_file_input() {
    let single = r#"[{"type":"TEST","name":"e2e_pass_rate","value":1.0,"observed_at":"2026-10-05T16:00:00Z"}]"#;
    let mut child = rguard_bin()
        .args(["evaluate", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(single.as_bytes())
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let from_stdin: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

    let from_file = rguard_json(&["evaluate", "fixtures/duplicate_e2e.json"], 0);
    assert_eq!(from_stdin["signals_hash"], from_file["signals_hash"]);
    assert_eq!(from_stdin["decision"], from_file["decision"]);
}

#[test]
fn canary_error_rate_blocks() {
    let result = rguard_json(&["evaluate", "fixtures/canary_5xx.json"], 2);
    assert_eq!(result["path"], "gate_block");
    assert!(result["rationale"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["rule"] == "CANARY_5XX_RATE"));
}

#[test]
fn threshold_flags_move_zone_boundaries() {
    let result = rguard_json(
        &["evaluate", "fixtures/approve.json", "--approve-threshold", "10"],
        0,
    );
    assert_eq!(result["decision"], "WARN");
    assert_eq!(result["path"], "risk_warn");

    let result = rguard_json(
        &[
            "evaluate",
            "fixtures/approve.json",
            "--approve-threshold",
            "5",
            "--warn-threshold",
            "12.5",
        ],
        2,
    );
    assert_eq!(result["path"], "risk_block");
}

#[test]
fn inverted_thresholds_are_rejected() {
    let out = rguard_bin()
        .args([
            "evaluate",
            "fixtures/approve.json",
            "--approve-threshold",
            "70",
            "--warn-threshold",
            "60",
        ])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn env_threshold_applies_below_flags() {
    let out = rguard_bin()
        .args(["evaluate", "fixtures/approve.json"])
        .env("RELEASEGUARD_APPROVE_THRESHOLD", "10")
        .output()
        .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result["decision"], "WARN");

    let out = rguard_bin()
        .args(["evaluate", "fixtures/approve.json", "--approve-threshold", "20"])
        .env("RELEASEGUARD_APPROVE_THRESHOLD", "10")
        .output()
        .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result["decision"], "APPROVE");
}

#[test]
fn init_writes_workspace_config_once() {
    let dir = tempfile::tempdir().unwrap();
    let status = rguard_bin()
        .arg("init")
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(status.success());

    let config: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(".releaseguard/config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(config["approve_threshold"], 30.0);
    assert_eq!(config["warn_threshold"], 60.0);

    let again = rguard_bin()
        .arg("init")
        .current_dir(dir.path())
        .status()
        .unwrap();
    assert!(!again.success());
}

#[test]
fn workspace_config_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".releaseguard")).unwrap();
    std::fs::write(
        dir.path().join(".releaseguard/config.json"),
        r#"{"approve_threshold": 10.0}"#,
    )
    .unwrap();

    let out = rguard_bin()
        .args(["evaluate", &fixture("approve.json")])
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    let result: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result["path"], "risk_warn");
}

#[test]
fn ledger_records_and_report_reads_latest() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("ledger.jsonl");
    let ledger = ledger.to_str().unwrap();

    rguard_json(
        &["evaluate", "fixtures/block_e2e.json", "--ledger", ledger],
        2,
    );
    rguard_json(
        &[
            "evaluate",
            "fixtures/approve.json",
            "--release",
            "rc-2026.10.2",
            "--ledger",
            ledger,
        ],
        0,
    );

    let out = rguard_bin()
        .args(["ledger", ledger, "--verify"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("2 entries"));

    let report = rguard_json(&["report", "fixtures/block_e2e.json", "--ledger", ledger], 0);
    assert_eq!(report["release_id"], "rc-2026.10.2");
    assert_eq!(report["evaluation"]["decision"], "APPROVE");
    assert_eq!(report["summary"]["total_signals"], 1);
    assert_eq!(report["summary"]["signal_types"][0], "TEST");
    assert_eq!(report["summary"]["decision"], "APPROVE");
    assert_eq!(report["summary"]["risk_score"], 12.5);
}

#[test]
fn report_without_evaluation_has_null_latest() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("ledger.jsonl");
    let report = rguard_json(
        &[
            "report",
            "fixtures/approve.json",
            "--ledger",
            ledger.to_str().unwrap(),
        ],
        0,
    );
    assert!(report["evaluation"].is_null());
    assert_eq!(report["summary"]["total_signals"], 4);
    assert!(report["summary"].get("decision").is_none());
}

#[test]
fn gates_lists_table_in_order() {
    let gates = rguard_json(&["gates", "--json"], 0);
    let ids: Vec<_> = gates
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.first(), Some(&"UNIT_PASS_RATE"));
    assert_eq!(ids.last(), Some(&"CANARY_5XX_RATE"));
    assert_eq!(ids.len(), 9);

    let text = rguard_stdout(&["gates"]);
    assert!(text.contains("E2E_PASS_RATE"));
    assert!(text.contains("TEST/e2e_pass_rate"));
}

#[test]
fn catalog_lists_signals() {
    let catalog = rguard_json(&["catalog", "--json"], 0);
    assert!(catalog
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["name"] == "line_coverage" && e["direction"] == "HIGHER_IS_BETTER"));

    let text = rguard_stdout(&["catalog"]);
    assert!(text.contains("PERF/error_rate"));
}

#[test]
fn invalid_signal_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"signals": "nope"}"#).unwrap();
    let out = rguard_bin()
        .args(["evaluate", bad.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid signals"));
}
