use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn graven_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("graven").unwrap();
    cmd.env("GRAVEN_HOME", home.path());
    cmd
}

#[test]
fn test_detect_gradle_project() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("gradlew"), "#!/bin/sh\n").unwrap();

    graven_cmd(&home)
        .arg("detect")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("gradle\n"))
        .stdout(predicate::str::contains("./gradlew --project-cache-dir"))
        .stdout(predicate::str::contains("eclipse-temurin:{java}"));
}

#[test]
fn test_detect_defaults_to_current_dir() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pom.xml"), "<project/>").unwrap();

    graven_cmd(&home)
        .current_dir(project.path())
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("maven\n"))
        .stdout(predicate::str::contains("mvn package"));
}

#[test]
fn test_detect_empty_dir_fails() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    graven_cmd(&home)
        .arg("detect")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Neither gradlew"));
}

#[test]
fn test_detect_both_markers_fails() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("gradlew"), "").unwrap();
    fs::write(project.path().join("pom.xml"), "<project/>").unwrap();

    graven_cmd(&home)
        .arg("detect")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Both gradlew"));
}
