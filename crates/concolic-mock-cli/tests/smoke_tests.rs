//! Smoke tests for the cmock CLI

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the cmock binary, isolated from any local cmock.yaml
fn cmock(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cmock").expect("cmock binary should exist");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("targets"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    cmock(&dir).assert().failure();
}

// ============================================================================
// Run Command Tests
// ============================================================================

#[test]
fn test_run_covers_fixture() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("testFinal"))
        .stdout(predicate::str::contains("4/4 branch points complete"));
}

#[test]
fn test_run_json() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .args(["run", "--format", "json", "--case", "testIntSupplier"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complete\""))
        .stdout(predicate::str::contains("testIntSupplier"));
}

#[test]
fn test_run_sealed_case_fails() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .args(["run", "--case", "testSealed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot mock"));
}

#[test]
fn test_run_unknown_case() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .args(["run", "--case", "testNope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown case"));
}

#[test]
fn test_run_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.json");
    cmock(&dir)
        .args(["run", "-q", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();
    let json = fs::read_to_string(&out).unwrap();
    assert!(json.contains("testBoxedIntSupplier"));
}

#[test]
fn test_run_budget_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tight.yaml");
    fs::write(&config, "campaign:\n  max_executions: 1\n").unwrap();
    cmock(&dir)
        .args(["run", "--case", "testFinal", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("budget spent"));
}

#[test]
fn test_run_picks_up_local_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cmock.yaml"), "mock:\n  mode: basic\n").unwrap();
    cmock(&dir)
        .args(["run", "--case", "testFinal"])
        .assert()
        .failure();
    cmock(&dir)
        .args(["run", "--case", "testFunction"])
        .assert()
        .success();
}

// ============================================================================
// Targets and Config Tests
// ============================================================================

#[test]
fn test_targets_lists_interception() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("call-site"))
        .stdout(predicate::str::contains("testSealed"));
}

#[test]
fn test_config_prints_yaml() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .args(["config", "--defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_executions: 64"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    cmock(&dir)
        .args(["config", "--config", "absent.yaml"])
        .assert()
        .failure();
}
