//! Command-line tests against an isolated data directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn billtracker(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_billtracker"));
    cmd.env("BILLTRACKER_DATA_DIR", dir.path())
        .env_remove("BILLTRACKER_USER")
        .env_remove("RUST_LOG");
    cmd
}

fn setup_alice() -> TempDir {
    let dir = TempDir::new().unwrap();
    billtracker(&dir).arg("init").assert().success();
    billtracker(&dir)
        .args(["user", "add", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered user: alice"));
    dir
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    billtracker(&dir)
        .args(["init", "--default-user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    assert!(dir.path().join("config.json").exists());
    billtracker(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Default user:    alice"));
}

#[test]
fn bill_changes_appear_in_audit_log() {
    let dir = setup_alice();

    billtracker(&dir)
        .args(["--user", "alice", "bill", "add", "Rent", "1200.00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created bill: Rent"));

    billtracker(&dir)
        .args(["--user", "alice", "bill", "update", "Rent", "--amount", "1300"])
        .assert()
        .success();

    billtracker(&dir)
        .args(["--user", "alice", "audit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add").and(predicate::str::contains("update")));

    billtracker(&dir)
        .args(["--user", "alice", "audit", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_amount_due: 1200.0 -> 1300.0"));
}

#[test]
fn user_from_environment() {
    let dir = setup_alice();

    billtracker(&dir)
        .env("BILLTRACKER_USER", "alice")
        .args(["lookup", "category", "Utilities"])
        .assert()
        .success();

    billtracker(&dir)
        .args(["audit", "export", "--format", "json", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"table_name\": \"Category\"").and(
            predicate::str::contains("\"user\": 1"),
        ));
}

#[test]
fn mutation_without_user_fails() {
    let dir = setup_alice();

    billtracker(&dir)
        .args(["bill", "add", "Rent", "1200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an acting user"));
}

#[test]
fn audit_list_is_scoped_to_user() {
    let dir = setup_alice();
    billtracker(&dir)
        .args(["user", "add", "bob"])
        .assert()
        .success();

    billtracker(&dir)
        .args(["--user", "alice", "account", "add", "Checking"])
        .assert()
        .success();

    billtracker(&dir)
        .args(["--user", "bob", "audit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit records found."));

    billtracker(&dir)
        .args(["--user", "bob", "audit", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BankAccount"));
}

#[test]
fn csv_export_to_file() {
    let dir = setup_alice();
    billtracker(&dir)
        .args(["--user", "alice", "lookup", "status", "Paid", "--color", "green"])
        .assert()
        .success();

    let output = dir.path().join("audit.csv");
    billtracker(&dir)
        .args(["--user", "alice", "audit", "export", "--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 audit records"));

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("ID,Timestamp,User,Action,Table,Row ID,Before,After"));
    assert!(contents.contains("Status"));
}

#[test]
fn unknown_table_filter_is_rejected() {
    let dir = setup_alice();

    billtracker(&dir)
        .args(["--user", "alice", "audit", "list", "--table", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown table"));
}

#[test]
fn out_of_range_amount_is_rejected() {
    let dir = setup_alice();

    billtracker(&dir)
        .args(["--user", "alice", "bill", "add", "Rent", "100000000000000000"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid amount"));

    billtracker(&dir)
        .args(["--user", "alice", "audit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit records found."));
}
