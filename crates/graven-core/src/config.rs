use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::builder_config::{DEFAULT_DOCKER_HOST, DEFAULT_GRADLE_HOME, DEFAULT_MAVEN_HOME, DEFAULT_TIMEOUT};

/// Global user configuration loaded from `~/.graven/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub build: BuildDefaults,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Docker daemon settings from `[docker]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_docker_host")]
    pub host: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            host: default_docker_host(),
        }
    }
}

fn default_docker_host() -> String {
    DEFAULT_DOCKER_HOST.to_string()
}

/// Build defaults from `[build]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDefaults {
    #[serde(default = "default_java")]
    pub java: u32,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            java: default_java(),
            timeout: default_timeout(),
        }
    }
}

fn default_java() -> u32 {
    crate::DEFAULT_JAVA_VERSION
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

/// Host-side dependency caches from `[cache]`, shared between builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_maven_home", rename = "maven-home")]
    pub maven_home: PathBuf,
    #[serde(default = "default_gradle_home", rename = "gradle-home")]
    pub gradle_home: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            maven_home: default_maven_home(),
            gradle_home: default_gradle_home(),
        }
    }
}

fn default_maven_home() -> PathBuf {
    PathBuf::from(DEFAULT_MAVEN_HOME)
}

fn default_gradle_home() -> PathBuf {
    PathBuf::from(DEFAULT_GRADLE_HOME)
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load the configuration at `path`, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            graven_util::errors::GravenError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        toml::from_str(&content).map_err(|e| {
            graven_util::errors::GravenError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the Graven data directory: `$GRAVEN_HOME`, else `~/.graven/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(dir) = std::env::var("GRAVEN_HOME") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".graven")
}
