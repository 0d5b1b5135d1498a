use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("idflow")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("callback"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("sign"));
}

#[test]
fn test_login_requires_provider() {
    cargo_bin_cmd!("idflow")
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--provider"));
}

#[test]
fn test_login_rejects_unknown_provider() {
    cargo_bin_cmd!("idflow")
        .args(["login", "--provider", "myspace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("myspace"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("idflow")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
