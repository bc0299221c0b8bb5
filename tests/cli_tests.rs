//! CLI surface tests using the REAL quarry binary

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    TestWorkspace::new()
        .quarry_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-hosting API"))
        .stdout(predicate::str::contains("--repo"))
        .stdout(predicate::str::contains("--api-url"))
        .stdout(predicate::str::contains("--unattended"))
        .stdout(predicate::str::contains("--keep-workdir"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn test_version_output() {
    TestWorkspace::new()
        .quarry_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quarry"));
}

#[test]
fn test_missing_configuration_fails() {
    TestWorkspace::new()
        .quarry_cmd()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no repository configured"));
}

#[test]
fn test_invalid_repo_slug_rejected() {
    TestWorkspace::new()
        .quarry_cmd()
        .args(["--repo", "noslash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn test_repo_slug_from_environment_is_validated() {
    TestWorkspace::new()
        .quarry_cmd()
        .env("QUARRY_REPO", "noslash")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn test_relative_install_path_rejected() {
    TestWorkspace::new()
        .quarry_cmd()
        .args(["--repo", "upstream/app", "--install-path", "apps/app"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be absolute"));
}

#[test]
fn test_unknown_flag_rejected() {
    TestWorkspace::new()
        .quarry_cmd()
        .arg("--bogus")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_positional_arguments_rejected() {
    TestWorkspace::new()
        .quarry_cmd()
        .arg("install")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}
