use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"id": "A", "levels": [{"level": 1}, {"level": 2, "requirements": {"B": 1}}]},
  {"id": "B", "levels": [{"level": 1}]}
]"#;

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("catalog.json"), CATALOG).unwrap();
    fs::write(tmp.path().join("config.toml"), "starters = []\n").unwrap();
    tmp
}

#[allow(deprecated)]
fn buildplan_cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("buildplan").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("BUILDPLAN_CATALOG")
        .env_remove("RUST_LOG")
        .args(["--catalog", "catalog.json", "--config", "config.toml"]);
    cmd
}

#[test]
fn test_plan_prints_ordered_steps() {
    let tmp = setup();

    buildplan_cmd(&tmp)
        .args(["plan", "A", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Build plan for A L2 (3 steps):\n  1. B L1\n  2. A L1\n  3. A L2\n",
        ));
}

#[test]
fn test_plan_already_built() {
    let tmp = setup();
    fs::write(tmp.path().join("state.json"), r#"{"A": 2}"#).unwrap();

    buildplan_cmd(&tmp)
        .args(["plan", "A", "2", "--state", "state.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A L2 is already built"));
}

#[test]
fn test_plan_json_is_parseable() {
    let tmp = setup();

    let output = buildplan_cmd(&tmp)
        .args(["plan", "A", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("\"step\": 3"));
    assert!(stdout.trim_start().starts_with('['));
    assert!(stdout.contains("\"id\": \"B\""));
}

#[test]
fn test_plan_tree() {
    let tmp = setup();

    buildplan_cmd(&tmp)
        .args(["plan", "A", "2", "--tree"])
        .assert()
        .success()
        .stdout(predicate::str::diff("A L2\n├── A L1\n└── B L1\n"));
}

#[test]
fn test_plan_json_and_tree_conflict() {
    let tmp = setup();

    buildplan_cmd(&tmp)
        .args(["plan", "A", "2", "--json", "--tree"])
        .assert()
        .failure();
}

#[test]
fn test_plan_unknown_building_fails() {
    let tmp = setup();

    buildplan_cmd(&tmp)
        .args(["plan", "castle", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown building: castle"));
}

#[test]
fn test_plan_invalid_level_fails() {
    let tmp = setup();

    buildplan_cmd(&tmp)
        .args(["plan", "A", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid level 7 for building A"));
}

#[test]
fn test_catalog_from_env() {
    let tmp = setup();

    #[allow(deprecated)]
    Command::cargo_bin("buildplan")
        .unwrap()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("BUILDPLAN_CATALOG", tmp.path().join("catalog.json"))
        .args(["--config", "config.toml", "plan", "B", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. B L1"));
}

#[test]
fn test_missing_catalog_fails() {
    let tmp = setup();

    #[allow(deprecated)]
    Command::cargo_bin("buildplan")
        .unwrap()
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env_remove("BUILDPLAN_CATALOG")
        .args(["plan", "A", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No building catalog given"));
}
