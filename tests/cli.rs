use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const FIXTURES: &str = "tests/fixtures/cluster";

fn k8s_analyzer(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("k8s-analyzer").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be JSON")
}

#[test]
fn parse_prints_stats_and_summary() {
    let home = TempDir::new().unwrap();
    let assert = k8s_analyzer(&home)
        .args(["parse", "tests/fixtures/cluster/cluster-export.json"])
        .assert()
        .success();

    let report = stdout_json(&assert.get_output().stdout);
    assert_eq!(report["stats"]["parsed"], 4);
    assert_eq!(report["stats"]["skipped"], 2);
    assert_eq!(report["stats"]["errors"], 1);
    assert_eq!(report["summary"]["resource_types"]["Node"], 2);
}

#[test]
fn analyze_writes_full_state() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("state.json");

    let assert = k8s_analyzer(&home)
        .args([
            "analyze",
            "tests/fixtures/cluster/workloads.yaml",
            "-a",
            "tests/fixtures/cluster/storage.yaml",
            "-a",
            "tests/fixtures/cluster/cluster-export.json",
        ])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let report = stdout_json(&assert.get_output().stdout);
    assert_eq!(report["summary"]["total_relationships"], 17);

    let state: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(state["resources"].as_array().map(Vec::len), Some(15));
}

#[test]
fn analyze_creates_output_directories() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("reports").join("shop").join("state.json");

    k8s_analyzer(&home)
        .args(["analyze", "tests/fixtures/cluster/storage.yaml", "-o"])
        .arg(&out)
        .assert()
        .success();

    let state: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(state["resources"].as_array().map(Vec::len), Some(3));
}

#[test]
fn validate_lists_resources_with_issues() {
    let home = TempDir::new().unwrap();
    let assert = k8s_analyzer(&home)
        .args([
            "validate",
            "tests/fixtures/cluster/workloads.yaml",
            "-a",
            "tests/fixtures/cluster/storage.yaml",
            "-a",
            "tests/fixtures/cluster/cluster-export.json",
        ])
        .assert()
        .success();

    let findings = stdout_json(&assert.get_output().stdout);
    let resources: Vec<&str> = findings
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["resource"].as_str().unwrap())
        .collect();
    assert_eq!(
        resources,
        vec![
            "Pod/web-2/shop",
            "Pod/batch-1/shop",
            "Service/web-lb/shop",
            "ConfigMap/old-config/shop",
            "Node/worker-2",
        ]
    );
    assert_eq!(findings[1]["issues"][0], "Pod is in Failed phase");
}

#[test]
fn scan_respects_max_files() {
    let home = TempDir::new().unwrap();
    let assert = k8s_analyzer(&home)
        .args(["scan", FIXTURES, "-m", "1", "--analyze"])
        .assert()
        .success();

    // cluster-export.json sorts first
    let report = stdout_json(&assert.get_output().stdout);
    assert_eq!(report["stats"]["parsed"], 4);
    assert_eq!(report["summary"]["health_status"]["error"], 1);
}

#[test]
fn list_files_with_pattern() {
    let home = TempDir::new().unwrap();
    k8s_analyzer(&home)
        .args(["list-files", FIXTURES, "-p", "*.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("storage.yaml"))
        .stdout(predicate::str::contains("workloads.yaml"))
        .stdout(predicate::str::contains("cluster-export.json").not());
}

#[test]
fn config_file_controls_output() {
    let home = TempDir::new().unwrap();
    let config_dir = TempDir::new().unwrap();
    fs::write(
        config_dir.path().join(".k8s-analyzer.toml"),
        "[output]\npretty = false\n",
    )
    .unwrap();

    k8s_analyzer(&home)
        .arg("--config")
        .arg(config_dir.path())
        .args(["parse", "tests/fixtures/cluster/storage.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\"stats\""))
        .stdout(predicate::str::contains("\n").count(1));
}

#[test]
fn missing_file_fails() {
    let home = TempDir::new().unwrap();
    k8s_analyzer(&home)
        .args(["parse", "tests/fixtures/cluster/nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn missing_scan_root_fails() {
    let home = TempDir::new().unwrap();
    k8s_analyzer(&home)
        .args(["scan", "tests/fixtures/does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
