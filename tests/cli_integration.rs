//! CLI integration tests for gantt
//!
//! These tests drive the binary against board files on disk, covering the
//! inspection commands and the save path of `shift`.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command instance for the gantt binary
fn gantt_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("gantt"))
}

/// Write a three-task board with a valid dependency chain
fn setup_board(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("board.json");
    fs::write(
        &path,
        r#"{
            "tasks": [
                {"id": "design", "startDate": "2024-03-01", "endDate": "2024-03-04"},
                {"id": "build", "startDate": "2024-03-04", "endDate": "2024-03-08", "dependencies": ["design"]},
                {"id": "ship", "startDate": "2024-03-08", "endDate": "2024-03-09", "dependencies": ["build"]}
            ],
            "cellWidth": 30,
            "cellHeight": 20
        }"#,
    )
    .unwrap();
    path
}

/// Write a board where "late" ends after the task depending on it
fn setup_conflicted_board(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("conflicted.json");
    fs::write(
        &path,
        r#"{
            "tasks": [
                {"id": "late", "startDate": "2024-03-01", "endDate": "2024-03-10"},
                {"id": "early", "startDate": "2024-03-02", "endDate": "2024-03-05", "dependencies": ["late", "ghost"]}
            ]
        }"#,
    )
    .unwrap();
    path
}

// =============================================================================
// Rows Tests
// =============================================================================

#[test]
fn test_rows_prints_placements() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .arg("rows")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("design\t0\t3\t2024-03-01\t2024-03-04"))
        .stdout(predicate::str::contains("build\t3\t4\t2024-03-04\t2024-03-08"))
        .stdout(predicate::str::contains("ship\t7\t1\t2024-03-08\t2024-03-09"))
        .stdout(predicate::str::contains("3 task(s), 9 column(s)"));
}

#[test]
fn test_rows_json_output() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    let output = gantt_cmd()
        .args(["rows", path.to_str().unwrap(), "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let rows: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["id"], "design");
    assert_eq!(rows[0]["offset"], 0);
    assert_eq!(rows[0]["span"], 3);
    assert_eq!(rows[1]["offset"], 3);
    assert_eq!(rows[2]["span"], 1);
}

#[test]
fn test_rows_missing_file_fails() {
    gantt_cmd()
        .args(["rows", "/no/such/board.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read board file"));
}

// =============================================================================
// Check Tests
// =============================================================================

#[test]
fn test_check_passes_on_valid_board() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All dependency placements are valid"));
}

#[test]
fn test_check_reports_conflicts_and_fails() {
    let dir = TempDir::new().unwrap();
    let path = setup_conflicted_board(&dir);

    gantt_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "early: dependency \"late\" ends after it",
        ))
        .stdout(predicate::str::contains(
            "early: depends on a task that is not on the board",
        ))
        .stderr(predicate::str::contains("2 invalid dependency placement(s)"));
}

#[test]
fn test_check_json_records() {
    let dir = TempDir::new().unwrap();
    let path = setup_conflicted_board(&dir);

    let output = gantt_cmd()
        .args(["check", path.to_str().unwrap(), "--format", "json"])
        .assert()
        .failure();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let records: Value = serde_json::from_str(&stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| {
        r["reason"] == "date_conflict" && r["sourceId"] == "early" && r["dependencyId"] == "late"
    }));
    assert!(records.iter().any(|r| {
        r["reason"] == "dependency_missing"
            && r["sourceId"] == "early"
            && r["dependencyId"].is_null()
    }));
}

// =============================================================================
// Order Tests
// =============================================================================

#[test]
fn test_order_lists_dependencies_first() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    let output = gantt_cmd()
        .args(["order", path.to_str().unwrap(), "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let order: Vec<String> = serde_json::from_str(&stdout).unwrap();
    let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
    assert!(pos("design") < pos("build"));
    assert!(pos("build") < pos("ship"));
}

#[test]
fn test_order_fails_on_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cycle.json");
    fs::write(
        &path,
        r#"{
            "tasks": [
                {"id": "a", "dependencies": ["b"]},
                {"id": "b", "dependencies": ["a"]}
            ]
        }"#,
    )
    .unwrap();

    gantt_cmd()
        .arg("order")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Can't order tasks"));
}

// =============================================================================
// Shift Tests
// =============================================================================

#[test]
fn test_shift_moves_task_and_saves() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .args([
            "shift",
            path.to_str().unwrap(),
            "--id",
            "design",
            "--offset",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Updated \"design\": 2024-03-03 -> 2024-03-06",
        ));

    // The move is persisted, and the min date moved with it
    gantt_cmd()
        .arg("rows")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("design\t0\t3\t2024-03-03\t2024-03-06"))
        .stdout(predicate::str::contains("build\t1\t4"));
}

#[test]
fn test_shift_resizes_with_explicit_reference() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .args([
            "shift",
            path.to_str().unwrap(),
            "--id",
            "ship",
            "--span",
            "2",
            "--reference",
            "2024-03-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Updated \"ship\": 2024-03-08 -> 2024-03-10",
        ));
}

#[test]
fn test_shift_without_fields_fails() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .args(["shift", path.to_str().unwrap(), "--id", "design"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to do"));
}

#[test]
fn test_shift_unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    let path = setup_board(&dir);

    gantt_cmd()
        .args([
            "shift",
            path.to_str().unwrap(),
            "--id",
            "nope",
            "--offset",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
