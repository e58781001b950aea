//! End-to-end CLI integration tests using test fixtures.
//!
//! Each fixture in `tests/fixtures/` contains:
//! - a project snapshot (`project.yml` or `project.json`)
//! - `expected.validation-report.csv` when at least one session fails
//!
//! These tests run the CLI against each fixture and verify:
//! 1. Exit code matches expected (0 = all compliant, 2 = failures)
//! 2. The CSV report matches byte for byte, or is absent

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a Command for the sessionguard binary.
/// Wraps the deprecated cargo_bin to centralize the deprecation warning.
#[allow(deprecated)]
fn sessionguard_cmd() -> Command {
    Command::cargo_bin("sessionguard")
        .expect("sessionguard binary not found - run `cargo build` first")
}

/// Get the path to the test fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("sessionguard-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

fn snapshot_path(fixture_name: &str) -> PathBuf {
    let dir = fixtures_dir().join(fixture_name);
    let yml = dir.join("project.yml");
    if yml.exists() { yml } else { dir.join("project.json") }
}

/// Run `check` on a fixture, writing into a fresh output directory.
fn run_check_on_fixture(fixture_name: &str, extra: &[&str]) -> (i32, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = sessionguard_cmd()
        .arg("--config")
        .arg(temp_dir.path().join("sessionguard.toml"))
        .arg("check")
        .arg("--snapshot")
        .arg(snapshot_path(fixture_name))
        .arg("--output-dir")
        .arg(temp_dir.path().join("out"))
        .args(extra)
        .output()
        .expect("Failed to run command");

    (output.status.code().unwrap_or(-1), temp_dir)
}

fn report_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("out").join("validation-report.csv")
}

fn load_expected_csv(fixture_name: &str) -> String {
    let path = fixtures_dir()
        .join(fixture_name)
        .join("expected.validation-report.csv");
    std::fs::read_to_string(path).expect("Failed to read expected report")
}

fn read_yaml(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("Failed to read YAML");
    serde_yaml::from_str(&text).expect("Failed to parse YAML")
}

// ============================================================================
// Fixture tests
// ============================================================================

#[test]
fn fixture_mixed_failures_fails() {
    let (exit_code, temp_dir) = run_check_on_fixture("mixed_failures", &[]);

    assert_eq!(exit_code, 2, "mixed_failures fixture should exit with 2 (fail)");
    let actual = std::fs::read_to_string(report_path(&temp_dir)).expect("report written");
    assert_eq!(actual, load_expected_csv("mixed_failures"));
}

#[test]
fn fixture_compliant_passes() {
    let (exit_code, temp_dir) = run_check_on_fixture("compliant", &[]);

    assert_eq!(exit_code, 0, "compliant fixture should exit with 0 (pass)");
    assert!(!report_path(&temp_dir).exists(), "no report for a clean run");
    assert!(temp_dir.path().join("out/template-list.yml").exists());
}

#[test]
fn fixture_classification_fails() {
    let (exit_code, temp_dir) = run_check_on_fixture("classification", &[]);

    assert_eq!(exit_code, 2, "classification fixture should exit with 2 (fail)");
    let actual = std::fs::read_to_string(report_path(&temp_dir)).expect("report written");
    assert_eq!(actual, load_expected_csv("classification"));
}

#[test]
fn fixture_no_templates_is_skipped() {
    let (exit_code, temp_dir) = run_check_on_fixture("no_templates", &[]);

    assert_eq!(exit_code, 0, "no_templates fixture should exit with 0");
    assert!(!temp_dir.path().join("out").exists(), "nothing is written");
}

// ============================================================================
// CLI behavior tests
// ============================================================================

#[test]
fn parallel_run_matches_sequential() {
    let (exit_code, temp_dir) = run_check_on_fixture("mixed_failures", &["--jobs", "4"]);

    assert_eq!(exit_code, 2);
    let actual = std::fs::read_to_string(report_path(&temp_dir)).expect("report written");
    assert_eq!(actual, load_expected_csv("mixed_failures"));
}

#[test]
fn no_fail_exits_zero_but_still_reports() {
    let (exit_code, temp_dir) = run_check_on_fixture("mixed_failures", &["--no-fail"]);

    assert_eq!(exit_code, 0);
    assert!(report_path(&temp_dir).exists());
}

#[test]
fn session_limit_truncates_the_report() {
    let (exit_code, temp_dir) =
        run_check_on_fixture("mixed_failures", &["--stop-after-n-sessions", "2"]);

    assert_eq!(exit_code, 2);
    let actual = std::fs::read_to_string(report_path(&temp_dir)).expect("report written");
    let expected: Vec<String> = load_expected_csv("mixed_failures")
        .lines()
        .take(2)
        .map(str::to_string)
        .collect();
    assert_eq!(actual.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn negative_limit_checks_everything() {
    let (exit_code, temp_dir) =
        run_check_on_fixture("mixed_failures", &["--stop-after-n-sessions", "-1"]);

    assert_eq!(exit_code, 2);
    let actual = std::fs::read_to_string(report_path(&temp_dir)).expect("report written");
    assert_eq!(actual, load_expected_csv("mixed_failures"));
}

#[test]
fn template_list_round_trips_through_override() {
    let (_, first) = run_check_on_fixture("mixed_failures", &[]);
    let list = first.path().join("out").join("template-list.yml");

    let project = read_yaml(&snapshot_path("mixed_failures"));
    let dumped = read_yaml(&list);
    assert_eq!(dumped["templates0"], project["project"]["templates"][0]);
    assert_eq!(dumped["templates1"], project["project"]["templates"][1]);

    let list_arg = list.to_str().expect("utf8 path").to_string();
    let (exit_code, second) = run_check_on_fixture("mixed_failures", &["--templates", &list_arg]);
    assert_eq!(exit_code, 2);
    assert_eq!(
        std::fs::read_to_string(report_path(&second)).expect("report written"),
        load_expected_csv("mixed_failures")
    );
}

#[test]
fn config_file_sets_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = temp_dir.path().join("sessionguard.toml");
    let out = temp_dir.path().join("configured");
    std::fs::write(
        &config,
        format!(
            "output_dir = {:?}\nfail_on_noncompliant = false\n",
            out.to_str().expect("utf8 path")
        ),
    )
    .expect("write config");

    sessionguard_cmd()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg("--snapshot")
        .arg(snapshot_path("mixed_failures"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 5 session(s) non-compliant"));
    assert!(out.join("validation-report.csv").exists());
}

#[test]
fn verbose_run_logs_the_summary() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    sessionguard_cmd()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .arg("check")
        .arg("--snapshot")
        .arg(snapshot_path("mixed_failures"))
        .arg("--output-dir")
        .arg(temp_dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("run finished"))
        .stderr(predicate::str::contains("elapsed_ms"))
        .stderr(predicate::str::contains("started_at"));
}

#[test]
fn quiet_run_keeps_the_summary_out_of_stderr() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    sessionguard_cmd()
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .arg("check")
        .arg("--snapshot")
        .arg(snapshot_path("compliant"))
        .arg("--output-dir")
        .arg(temp_dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("run finished").not());
}

#[test]
fn invalid_template_file_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let templates = temp_dir.path().join("templates.yml");
    std::fs::write(&templates, "- acquisitions:\n    - label: anat\n").expect("write");

    sessionguard_cmd()
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .arg("check")
        .arg("--snapshot")
        .arg(snapshot_path("compliant"))
        .arg("--templates")
        .arg(&templates)
        .arg("--output-dir")
        .arg(temp_dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing `minimum`"));
}

#[test]
fn templates_command_prints_yaml() {
    sessionguard_cmd()
        .arg("templates")
        .arg("--snapshot")
        .arg(snapshot_path("compliant"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("templates0:"));
}

#[test]
fn missing_snapshot_returns_error() {
    sessionguard_cmd()
        .args(["check", "--snapshot", "/definitely/not/here.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read snapshot"));
}

#[test]
fn version_flag_works() {
    sessionguard_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
