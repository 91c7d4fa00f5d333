/// End-to-end tests for the `scout` binary.
use assert_cmd::Command;
use predicates::prelude::*;
use scout_edge::{TrendRecord, TrendStore, json, persistence};
use tempfile::tempdir;

fn scout() -> Command {
    let mut cmd = Command::cargo_bin("scout").unwrap();
    cmd.env_remove("DATA_DIR").env("RUST_LOG", "off").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_agents_lists_stores() {
    let dir = tempdir().unwrap();
    TrendStore::open(dir.path(), "research").unwrap();
    TrendStore::open(dir.path(), "news_watch").unwrap();

    scout()
        .arg("--memory-dir")
        .arg(dir.path())
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("research"))
        .stdout(predicate::str::contains("news_watch"))
        .stdout(predicate::str::contains("2 total"));
}

#[test]
fn test_recent_unknown_agent_fails() {
    let dir = tempdir().unwrap();

    scout()
        .arg("--memory-dir")
        .arg(dir.path())
        .args(["recent", "--agent", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trend store"));
}

#[test]
fn test_export_writes_document() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "research").unwrap();
    store
        .add_trend(TrendRecord::from_value(json!({"title": "today"})).unwrap())
        .unwrap();
    let out = dir.path().join("report.json");

    scout()
        .arg("--memory-dir")
        .arg(dir.path())
        .args(["export", "--days", "7", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    let report: serde_json::Value = persistence::load_json(&out).unwrap();
    assert_eq!(report["trend_count"], 1);
    assert_eq!(report["lookback_days"], 7);
    assert_eq!(report["trends"][0]["agent_id"], "research");
}

#[test]
fn test_clear_empties_trends() {
    let dir = tempdir().unwrap();
    let mut store = TrendStore::open(dir.path(), "research").unwrap();
    store
        .add_trend(TrendRecord::from_value(json!({"title": "gone"})).unwrap())
        .unwrap();

    scout()
        .arg("--memory-dir")
        .arg(dir.path())
        .args(["clear", "--agent", "research"])
        .assert()
        .success();

    assert!(TrendStore::open(dir.path(), "research").unwrap().is_empty());
}

#[test]
fn test_clear_unknown_agent_creates_nothing() {
    let dir = tempdir().unwrap();

    scout()
        .arg("--memory-dir")
        .arg(dir.path())
        .args(["clear", "--agent", "typo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trend store"));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_export_of_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("report.json");

    scout()
        .arg("--memory-dir")
        .arg(dir.path().join("missing"))
        .args(["export", "--output"])
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::contains("OK").not());
}
