use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use graven_util::errors::GravenError;

use crate::project_type::ProjectType;

/// Name of the optional per-project manifest.
pub const MANIFEST_FILE: &str = "graven.toml";

/// The parsed representation of a `graven.toml` file.
///
/// The file is optional: a project with a `gradlew` or `pom.xml` builds
/// without one. Every field overrides the matching global default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub publish: Option<PublishSection>,
}

/// Build settings from `[build]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default)]
    pub java: Option<u32>,

    /// `gradle` or `maven`; detected from marker files when absent.
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,

    /// Custom build command; takes precedence over `type`.
    #[serde(default)]
    pub cmd: Option<Vec<String>>,

    /// Image template, `{java}` is replaced with the Java version.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Artifact glob patterns (default `*.jar`).
    #[serde(default)]
    pub artifacts: Vec<String>,

    #[serde(default, rename = "docker-host")]
    pub docker_host: Option<String>,
}

/// Publishing coordinates and repositories from `[publish]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishSection {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub artifact: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "snapshot-url")]
    pub snapshot_url: Option<String>,
    #[serde(default, rename = "release-url")]
    pub release_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Manifest {
    /// Load `graven.toml` from `project_dir`, interpolating `${env:VAR}`
    /// from `.graven.env` and the process environment. A missing file yields
    /// an empty manifest.
    pub fn load(project_dir: &Path) -> miette::Result<Self> {
        let path = project_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    /// Parse a manifest file with `${env:VAR}` interpolation.
    ///
    /// Interpolation runs on parsed string values, so substituted values may
    /// contain quotes and backslashes.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GravenError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let env_vars =
            crate::properties::load_env_file(&dir.join(crate::properties::ENV_FILE))?;

        let mut table = parse_table(&content)?;
        for (_, value) in table.iter_mut() {
            interpolate_value(value, &env_vars);
        }
        from_table(table)
    }

    /// Parse a manifest from a string (no interpolation).
    pub fn parse(content: &str) -> miette::Result<Self> {
        from_table(parse_table(content)?)
    }
}

fn parse_table(content: &str) -> miette::Result<toml::Table> {
    content.parse::<toml::Table>().map_err(|e| parse_error(&e))
}

fn from_table(table: toml::Table) -> miette::Result<Manifest> {
    toml::Value::Table(table)
        .try_into()
        .map_err(|e| parse_error(&e))
}

fn parse_error(e: &toml::de::Error) -> miette::Report {
    GravenError::Config {
        message: format!("Failed to parse {MANIFEST_FILE}: {e}"),
    }
    .into()
}

fn interpolate_value(value: &mut toml::Value, env_vars: &BTreeMap<String, String>) {
    match value {
        toml::Value::String(s) => *s = crate::properties::interpolate(s, env_vars),
        toml::Value::Array(items) => {
            for item in items {
                interpolate_value(item, env_vars);
            }
        }
        toml::Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                interpolate_value(item, env_vars);
            }
        }
        _ => {}
    }
}

impl BuildSection {
    /// The project type this section asks for, if any. `cmd` wins over `type`.
    ///
    /// The `image` override is not applied here because the type may still
    /// have to be detected from the project directory.
    pub fn project_type(&self) -> miette::Result<Option<ProjectType>> {
        match (&self.cmd, &self.project_type) {
            (Some(cmd), _) if !cmd.is_empty() => Ok(Some(ProjectType::custom(cmd.clone()))),
            (Some(_), _) => Err(GravenError::Config {
                message: "[build].cmd must not be empty".to_string(),
            }
            .into()),
            (None, Some(name)) => Ok(Some(name.parse::<ProjectType>()?)),
            (None, None) => Ok(None),
        }
    }
}
