use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn printguard() -> Command {
    let mut cmd = Command::cargo_bin("printguard").unwrap();
    cmd.env_remove("PRINTGUARD_CONFIG").env_remove("PRINTGUARD_LOG");
    cmd
}

#[test]
fn plan_lists_builtin_actions() {
    printguard()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan: printer-lockdown (18 actions)"))
        .stdout(predicate::str::contains("mask cups-browsed.service"))
        .stdout(predicate::str::contains("notifies: udevadm control --reload-rules"))
        .stdout(predicate::str::contains("start cups.service if not running"));
}

#[test]
fn plan_json_is_parseable() {
    let output = printguard().args(["plan", "--json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "printer-lockdown");
    let actions = value["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 18);
    assert_eq!(actions[0]["kind"]["kind"], "stop_service");
}

#[test]
fn config_can_drop_cups_start() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "start_cups_after = false").unwrap();

    printguard()
        .arg("--config")
        .arg(file.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("(17 actions)"))
        .stdout(predicate::str::contains("start cups.service").not());
}

#[test]
fn missing_config_is_fatal_for_plan() {
    printguard()
        .args(["--config", "/nonexistent/printguard.toml", "plan"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn watchdog_once_exits_successfully() {
    printguard()
        .args(["watchdog", "--once", "--dry-run"])
        .assert()
        .success();
}

#[test]
fn watchdog_exits_successfully_with_bad_config() {
    printguard()
        .args(["--config", "/nonexistent/printguard.toml", "watchdog", "--once", "--dry-run"])
        .assert()
        .success();
}
