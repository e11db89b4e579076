mod common;

use assert_cmd::Command;
use chrono::{Duration, Utc};
use common::{usage_line, LogFixture};
use predicates::prelude::*;

fn monitor() -> Command {
    Command::cargo_bin("claude-monitor").unwrap()
}

#[test]
fn test_projects_lists_directories() {
    let fixture = LogFixture::new().unwrap();
    fixture.project("demo");

    monitor()
        .args(["projects", "--json", "--dir"])
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_daily_json_reports_costs() {
    let fixture = LogFixture::new().unwrap();
    let recent = Utc::now() - Duration::minutes(5);
    fixture.append_line(
        "demo",
        "work.jsonl",
        &usage_line(recent, "claude-3-5-haiku-20241022", 1_000_000, 500_000, 0, 0),
    );

    monitor()
        .args(["daily", "--json", "--dir"])
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("totalCost"))
        .stdout(predicate::str::contains("2.8"));
}

#[test]
fn test_current_runs_on_empty_root() {
    let fixture = LogFixture::new().unwrap();
    fixture.project("demo");

    monitor()
        .args(["current", "--json", "--dir"])
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("todayCost"));
}

#[test]
fn test_missing_directory_fails() {
    let fixture = LogFixture::new().unwrap();

    monitor()
        .args(["current", "--dir"])
        .arg(fixture.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_unknown_plan_is_rejected() {
    let fixture = LogFixture::new().unwrap();
    fixture.project("demo");

    monitor()
        .args(["current", "--plan", "platinum", "--dir"])
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown plan"));
}
