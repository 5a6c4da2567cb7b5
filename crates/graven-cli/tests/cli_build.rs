use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn graven_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("graven").unwrap();
    cmd.env("GRAVEN_HOME", home.path())
        .env_remove("GRAVEN_DOCKER_HOST");
    cmd
}

fn gradle_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("gradlew"), "#!/bin/sh\n").unwrap();
    tmp
}

#[test]
fn test_build_rejects_unknown_type() {
    let home = TempDir::new().unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .args(["build", "--type", "ant"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ant"));
}

#[test]
fn test_build_type_conflicts_with_cmd() {
    let home = TempDir::new().unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .arg("build")
        .arg(project.path())
        .args(["--type", "maven", "--cmd", "make"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_build_rejects_invalid_timeout() {
    let home = TempDir::new().unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .arg("build")
        .arg(project.path())
        .args(["--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn test_build_rejects_unsupported_docker_scheme() {
    let home = TempDir::new().unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .arg("build")
        .arg(project.path())
        .args(["--docker-host", "ftp://docker.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp"));
}

#[test]
fn test_build_docker_host_from_env() {
    let home = TempDir::new().unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .env("GRAVEN_DOCKER_HOST", "gopher://docker.example")
        .arg("build")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("gopher"));
}

#[test]
fn test_build_zero_timeout_from_global_config() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("config.toml"), "[build]\ntimeout = \"0s\"\n").unwrap();
    let project = gradle_project();

    graven_cmd(&home)
        .arg("build")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout must be greater than 0"));
}
