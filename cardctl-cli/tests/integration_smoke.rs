//! Smoke tests to verify command wiring and exit codes without a database

use assert_cmd::Command;
use predicates::prelude::*;

/// A cardctl command isolated from the caller's config and environment
fn cardctl(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cardctl").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("CARDCTL_DB_HOST")
        .env_remove("CARDCTL_DB_PORT")
        .env_remove("CARDCTL_DB_NAME")
        .env_remove("CARDCTL_DB_USER")
        .env_remove("CARDCTL_DB_PASSWORD");
    cmd
}

// === Help Tests ===

#[test]
fn test_add_help() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Edition or set the card comes from"));
}

#[test]
fn test_find_help() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .args(["find", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Match foil printings"));
}

#[test]
fn test_decr_help() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .args(["decr", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of copies"));
}

#[test]
fn test_completions_need_no_database() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cardctl"));
}

// === Exit Code Tests ===

#[test]
fn test_usage_error_exits_3() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home).args(["add", "Bolt"]).assert().code(3);
}

#[test]
fn test_blank_name_rejected_before_connecting() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .args(["add", "   ", "--edition", "2024"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("name"));
}

#[test]
fn test_missing_config_file_exits_3() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nope.toml");
    cardctl(&home)
        .arg("--config")
        .arg(&missing)
        .args(["show", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Config not found"));
}

#[test]
fn test_bad_port_exits_3() {
    let home = tempfile::tempdir().unwrap();
    cardctl(&home)
        .env("CARDCTL_DB_PORT", "not-a-port")
        .args(["show", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("CARDCTL_DB_PORT"));
}

#[test]
fn test_unreachable_database_exits_2() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("cardctl.toml"),
        "[postgresql]\nhost = \"127.0.0.1\"\nport = 1\nconnect_timeout_secs = 1\n",
    )
    .unwrap();

    cardctl(&home)
        .args(["--config", "cardctl.toml", "show", "1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot reach card database"));
}
