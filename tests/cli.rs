use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    cargo_bin_cmd!("rts-sph")
}

fn fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tiny.sph");
    fs::write(&path, "1 11 2 11\n0.5\n0.1 0.2 0.3\n-1.5\n0 0 0\n").unwrap();
    path
}

#[test]
fn summarises_file_as_json() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir);

    let output = cmd()
        .arg(&path)
        .args(["--knots", "1.0,-1.0", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["degree"], 1);
    assert_eq!(json["knot_count"], 2);
    assert_eq!(json["nonzero"], 5);
    assert_eq!(json["max_abs_per_knot"][1], 1.5);
}

#[test]
fn empty_model_from_degree() {
    cmd()
        .args(["--degree", "3", "--knots", "1,0,-1"])
        .assert()
        .success()
        .stdout(contains("array shape:   [3, 2, 4, 4]"));
}

#[test]
fn no_degree_or_file_fails() {
    cmd()
        .assert()
        .failure()
        .stderr(contains("no shape information"));
}

#[test]
fn header_mismatch_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir);

    cmd()
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("loading"))
        .stderr(contains("active knots"));
}

#[test]
fn config_file_supplies_options() {
    let dir = TempDir::new().unwrap();
    fixture(&dir);
    let config = dir.path().join("model.json");
    fs::write(
        &config,
        r#"{"filename": "tiny.sph", "knots": [1.0, -1.0], "inner_radius": 3500.0}"#,
    )
    .unwrap();

    cmd()
        .arg("--config")
        .arg(&config)
        .args(["--outer-radius", "6371"])
        .assert()
        .success()
        .stdout(contains("3500.000 – 6371.000"));
}
