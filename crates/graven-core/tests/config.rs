use std::path::PathBuf;
use std::time::Duration;

use graven_core::config::GlobalConfig;
use tempfile::TempDir;

#[test]
fn test_global_config_defaults() {
    let config = GlobalConfig::default();
    assert_eq!(config.docker.host, "tcp://localhost:2375");
    assert_eq!(config.build.java, 17);
    assert_eq!(config.build.timeout, Duration::from_secs(600));
    assert_eq!(
        config.cache.maven_home,
        PathBuf::from("/tmp/gravenbuilder-home-maven")
    );
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert_eq!(config.build.java, 17);
    assert_eq!(
        config.cache.gradle_home,
        PathBuf::from("/tmp/gravenbuilder-home-gradle")
    );
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[docker]
host = "unix:///var/run/docker.sock"

[build]
java = 21
timeout = "30m"

[cache]
maven-home = "/var/cache/graven/m2"
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.docker.host, "unix:///var/run/docker.sock");
    assert_eq!(config.build.java, 21);
    assert_eq!(config.build.timeout, Duration::from_secs(30 * 60));
    assert_eq!(config.cache.maven_home, PathBuf::from("/var/cache/graven/m2"));
    assert_eq!(
        config.cache.gradle_home,
        PathBuf::from("/tmp/gravenbuilder-home-gradle")
    );
}

#[test]
fn test_load_from_missing_file_is_default() {
    let tmp = TempDir::new().unwrap();
    let config = GlobalConfig::load_from(&tmp.path().join("config.toml")).unwrap();
    assert_eq!(config.build.java, 17);
}

#[test]
fn test_load_from_invalid_file_errors() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[build]\njava = \"seventeen\"\n").unwrap();
    let err = GlobalConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}
