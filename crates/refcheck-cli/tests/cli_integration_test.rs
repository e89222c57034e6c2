//! End-to-end integration tests for the refcheck CLI.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Get a Command for the refcheck binary
fn refcheck_cmd() -> Command {
    Command::cargo_bin("refcheck").unwrap()
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_cli_help() {
    refcheck_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("shape"));
}

#[test]
fn test_cli_version() {
    refcheck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refcheck"));
}

// =============================================================================
// Run
// =============================================================================

#[test]
fn test_run_filtered_suite_passes() {
    let temp_dir = TempDir::new().unwrap();
    refcheck_cmd()
        .current_dir(temp_dir.path())
        .args(["run", "--filter", "precomputed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maxpool_2d_precomputed_same_upper"))
        .stdout(predicate::str::contains("0 failed"));
}

#[test]
fn test_run_reads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "[harness]\nfilter = \"concat_2d\"\ndecimal = 6\n").unwrap();

    refcheck_cmd()
        .args(["run", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("concat_2d_axis_negative_2"))
        .stdout(predicate::str::contains("averagepool").not());
}

#[test]
fn test_run_rejects_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("refcheck.toml"), "[harness]\ndecimal = \"x\"\n").unwrap();

    refcheck_cmd()
        .current_dir(temp_dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_run_empty_selection_fails() {
    let temp_dir = TempDir::new().unwrap();
    refcheck_cmd()
        .current_dir(temp_dir.path())
        .args(["run", "--filter", "no_such_case"])
        .assert()
        .failure();
}

// =============================================================================
// List and Shape
// =============================================================================

#[test]
fn test_list_cases() {
    refcheck_cmd()
        .args(["list", "--filter", "sum_"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sum_example"))
        .stdout(predicate::str::contains("3 of"));
}

#[test]
fn test_shape_same_upper() {
    refcheck_cmd()
        .args([
            "shape",
            "--auto-pad",
            "SAME_UPPER",
            "--input",
            "5,5",
            "--kernel",
            "3,3",
            "--strides",
            "2,2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[3, 3]"))
        .stdout(predicate::str::contains("[2, 2]"));
}

#[test]
fn test_shape_unknown_policy_fails() {
    refcheck_cmd()
        .args(["shape", "--auto-pad", "SAME", "--input", "5", "--kernel", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("auto_pad"));
}

#[test]
fn test_exported_node_drives_shape() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("nodes");

    refcheck_cmd()
        .args(["list", "--filter", "maxpool_2d_precomputed_same_upper", "--export"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 node descriptors"));

    let node_path = out_dir.join("maxpool_2d_precomputed_same_upper.json");
    let json = fs::read_to_string(&node_path).unwrap();
    assert!(json.contains("kernel_shape"));

    refcheck_cmd()
        .args(["shape", "--input", "5,5", "--node"])
        .arg(&node_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SAME_UPPER"))
        .stdout(predicate::str::contains("[3, 3]"))
        .stdout(predicate::str::contains("[1, 1]"));
}

#[test]
fn test_shape_rejects_malformed_node() {
    let temp_dir = TempDir::new().unwrap();
    let node_path = temp_dir.path().join("bad.json");
    fs::write(&node_path, "{ not json").unwrap();

    refcheck_cmd()
        .args(["shape", "--input", "5,5", "--node"])
        .arg(&node_path)
        .assert()
        .failure();
}

#[test]
fn test_shape_node_conflicts_with_kernel() {
    let temp_dir = TempDir::new().unwrap();
    let node_path = temp_dir.path().join("node.json");
    fs::write(&node_path, "{}").unwrap();

    refcheck_cmd()
        .args(["shape", "--input", "5", "--kernel", "3", "--node"])
        .arg(&node_path)
        .assert()
        .failure();
}
