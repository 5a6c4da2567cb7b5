use std::time::Duration;

use graven_core::manifest::Manifest;
use tempfile::TempDir;

#[test]
fn test_missing_manifest_is_default() {
    let tmp = TempDir::new().unwrap();
    let m = Manifest::load(tmp.path()).unwrap();
    assert!(m.build.java.is_none());
    assert!(m.publish.is_none());
}

#[test]
fn test_parse_full_manifest() {
    let m = Manifest::parse(
        r#"
[build]
java = 21
type = "maven"
image = "maven:3-amazoncorretto-{java}"
timeout = "5m"
artifacts = ["target/*.jar"]
docker-host = "unix:///var/run/docker.sock"

[publish]
group = "net.azisaba"
artifact = "gravenbuilder"
version = "1.0-SNAPSHOT"
snapshot-url = "https://repo.azisaba.net/repository/maven-snapshots/"
release-url = "https://repo.azisaba.net/repository/maven-releases/"
"#,
    )
    .unwrap();
    assert_eq!(m.build.java, Some(21));
    assert_eq!(m.build.timeout, Some(Duration::from_secs(300)));
    assert_eq!(m.build.artifacts, vec!["target/*.jar".to_string()]);
    let t = m.build.project_type().unwrap().unwrap();
    assert_eq!(t.name(), "maven");
    let publish = m.publish.unwrap();
    assert_eq!(publish.group.as_deref(), Some("net.azisaba"));
    assert!(publish.snapshot_url.unwrap().contains("maven-snapshots"));
}

#[test]
fn test_cmd_takes_precedence_over_type() {
    let m = Manifest::parse(
        r#"
[build]
type = "gradle"
cmd = ["/bin/sh", "-c", "./gradlew shadowJar"]
"#,
    )
    .unwrap();
    let t = m.build.project_type().unwrap().unwrap();
    assert_eq!(t.name(), "custom");
    assert_eq!(t.cmd()[2], "./gradlew shadowJar");
}

#[test]
fn test_empty_cmd_is_rejected() {
    let m = Manifest::parse("[build]\ncmd = []\n").unwrap();
    assert!(m.build.project_type().is_err());
}

#[test]
fn test_unknown_type_is_rejected() {
    let m = Manifest::parse("[build]\ntype = \"sbt\"\n").unwrap();
    assert!(m.build.project_type().is_err());
}

#[test]
fn test_manifest_interpolates_env_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(".graven.env"),
        "deployReleasesURL=https://nexus.example/releases\n",
    )
    .unwrap();
    std::fs::write(
        tmp.path().join("graven.toml"),
        "[publish]\nrelease-url = \"${env:deployReleasesURL}\"\n",
    )
    .unwrap();
    let m = Manifest::load(tmp.path()).unwrap();
    assert_eq!(
        m.publish.unwrap().release_url.as_deref(),
        Some("https://nexus.example/releases")
    );
}

#[test]
fn test_interpolated_secret_may_contain_quotes_and_backslashes() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".graven.env"), "deployPassword=pa\"ss\\w0rd\n").unwrap();
    std::fs::write(
        tmp.path().join("graven.toml"),
        "[publish]\npassword = \"${env:deployPassword}\"\n",
    )
    .unwrap();
    let m = Manifest::load(tmp.path()).unwrap();
    assert_eq!(m.publish.unwrap().password.as_deref(), Some("pa\"ss\\w0rd"));
}

#[test]
fn test_interpolation_reaches_arrays() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".graven.env"), "TASK=shadowJar\n").unwrap();
    std::fs::write(
        tmp.path().join("graven.toml"),
        "[build]\ncmd = [\"./gradlew\", \"${env:TASK}\"]\n",
    )
    .unwrap();
    let m = Manifest::load(tmp.path()).unwrap();
    assert_eq!(m.build.cmd.unwrap()[1], "shadowJar");
}

#[test]
fn test_unreadable_env_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(".graven.env"), [0xff, 0xfe, 0x00]).unwrap();
    std::fs::write(tmp.path().join("graven.toml"), "[build]\njava = 17\n").unwrap();
    assert!(Manifest::load(tmp.path()).is_err());
}

#[test]
fn test_invalid_toml_reports_file_name() {
    let err = Manifest::parse("[build\njava = ").unwrap_err();
    assert!(err.to_string().contains("graven.toml"));
}
