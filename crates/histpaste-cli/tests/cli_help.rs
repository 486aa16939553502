use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("histpaste")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("paste"))
        .stdout(predicate::str::contains("clip"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_paste_help_shows_history_flags() {
    cargo_bin_cmd!("histpaste")
        .args(["paste", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--in"))
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--lines"))
        .stdout(predicate::str::contains("--public"));
}

#[test]
fn test_history_help_shows_subcommands() {
    cargo_bin_cmd!("histpaste")
        .args(["history", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("record"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("histpaste")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0.0"));
}

#[test]
fn test_invalid_range_is_rejected() {
    cargo_bin_cmd!("histpaste")
        .args(["paste", "--in=1..x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid range"));
}
