//! Operation: publish built artifacts to a Maven repository.
//!
//! Coordinates come from the command line or `[publish]` in `graven.toml`.
//! Repository URLs and credentials come from `[publish]` or, failing that,
//! the `deploySnapshotURL`, `deployReleasesURL`, `deployUsername` and
//! `deployPassword` properties (`.graven.env`, then the environment).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use graven_core::manifest::{Manifest, PublishSection};
use graven_core::properties::{self, ENV_FILE};
use graven_maven::publish::{self, PublishPlan, PublishRepositories, Publication};
use graven_maven::repository::MavenRepository;
use graven_maven::transport;
use graven_util::errors::GravenError;
use graven_util::progress::{status, status_info};

/// Directories searched for jars when no `--file` is given.
pub const DEFAULT_ARTIFACT_DIRS: [&str; 2] = ["build/libs", "target"];

/// Options for a publish invocation.
#[derive(Default)]
pub struct PublishOptions {
    pub files: Vec<PathBuf>,
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    /// Resolve metadata and plan uploads without uploading.
    pub dry_run: bool,
}

/// Publish the artifacts of the project at `project_dir`.
///
/// Returns the executed (or, for a dry run, planned) uploads.
pub async fn publish(project_dir: &Path, opts: &PublishOptions) -> miette::Result<PublishPlan> {
    let manifest = Manifest::load(project_dir)?;
    let env = properties::load_env_file(&project_dir.join(ENV_FILE))?;
    let section = manifest.publish.unwrap_or_default();

    let publication = resolve_publication(opts, &section)?;
    let repos = resolve_repositories(&section, &env);
    let repo = repos.select(&publication.version)?;
    if !repo.has_auth() {
        tracing::warn!(
            "No credentials configured for {}; set deployUsername/deployPassword",
            repo.url
        );
    }

    let files = if opts.files.is_empty() {
        default_artifacts(project_dir)
    } else {
        opts.files.clone()
    };
    if files.is_empty() {
        return Err(GravenError::Publish {
            message: format!(
                "No jars found under {} in {}; run `graven build` first or pass --file",
                DEFAULT_ARTIFACT_DIRS.join(" or "),
                project_dir.display()
            ),
        }
        .into());
    }
    let files = publish::classify(&files)?;

    let client = transport::build_client()?;
    let plan = publish::prepare(&client, &repos, &publication, &files, chrono::Utc::now()).await?;

    if opts.dry_run {
        return Ok(plan);
    }

    status(
        "Publishing",
        &format!("{publication} to {} ({})", plan.repository.name, plan.repository.url),
    );
    publish::execute(&client, &plan, |upload| status_info("Uploading", &upload.name)).await?;
    status(
        "Published",
        &format!("{publication} as {}", plan.file_version),
    );

    Ok(plan)
}

/// Coordinates from CLI options, falling back to `[publish]`.
pub fn resolve_publication(
    opts: &PublishOptions,
    section: &PublishSection,
) -> miette::Result<Publication> {
    let pick = |cli: &Option<String>, manifest: &Option<String>, field: &str| {
        cli.clone().or_else(|| manifest.clone()).ok_or_else(|| {
            miette::Report::from(GravenError::Config {
                message: format!(
                    "No {field} to publish: pass --{field} or set [publish] {field} in graven.toml"
                ),
            })
        })
    };
    let group = pick(&opts.group, &section.group, "group")?;
    let artifact = pick(&opts.artifact, &section.artifact, "artifact")?;
    let version = pick(&opts.version, &section.version, "version")?;
    Publication::new(&group, &artifact, &version)
}

/// Snapshot and release repositories from `[publish]`, falling back to the
/// `deploy*` properties.
pub fn resolve_repositories(
    section: &PublishSection,
    env: &BTreeMap<String, String>,
) -> PublishRepositories {
    let setting = |value: &Option<String>, property: &str| {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| properties::lookup(property, env))
    };
    let username = setting(&section.username, "deployUsername");
    let password = setting(&section.password, "deployPassword");
    let repository = |name: &str, url: Option<String>| {
        url.map(|url| {
            MavenRepository::new(name, &url).with_credentials(username.clone(), password.clone())
        })
    };

    PublishRepositories {
        snapshot: repository("snapshots", setting(&section.snapshot_url, "deploySnapshotURL")),
        release: repository("releases", setting(&section.release_url, "deployReleasesURL")),
    }
}

/// Jars under `build/libs` and `target`, skipping Gradle `-plain` jars and
/// the `original-*` jars left behind by the Maven shade plugin.
pub fn default_artifacts(project_dir: &Path) -> Vec<PathBuf> {
    let mut jars: Vec<PathBuf> = DEFAULT_ARTIFACT_DIRS
        .iter()
        .filter_map(|dir| std::fs::read_dir(project_dir.join(dir)).ok())
        .flat_map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            name.ends_with(".jar") && !name.ends_with("-plain.jar") && !name.starts_with("original-")
        })
        .collect();
    jars.sort();
    jars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> PublishSection {
        PublishSection {
            group: Some("net.azisaba".into()),
            artifact: Some("app".into()),
            version: Some("1.0".into()),
            ..Default::default()
        }
    }

    #[test]
    fn cli_coordinates_override_manifest() {
        let opts = PublishOptions {
            version: Some("2.0-SNAPSHOT".into()),
            ..Default::default()
        };
        let publication = resolve_publication(&opts, &section()).unwrap();
        assert_eq!(publication.to_string(), "net.azisaba:app:2.0-SNAPSHOT");
        assert!(publication.is_snapshot());
    }

    #[test]
    fn missing_coordinate_names_flag() {
        let err = resolve_publication(&PublishOptions::default(), &PublishSection::default())
            .unwrap_err();
        assert!(err.to_string().contains("--group"));
    }

    #[test]
    fn repositories_fall_back_to_deploy_properties() {
        let env = BTreeMap::from([
            ("deploySnapshotURL".to_string(), "https://repo.example/snapshots/".to_string()),
            ("deployReleasesURL".to_string(), "https://repo.example/releases".to_string()),
            ("deployUsername".to_string(), "ci".to_string()),
            ("deployPassword".to_string(), "secret".to_string()),
        ]);
        let repos = resolve_repositories(&PublishSection::default(), &env);

        let snapshot = repos.snapshot.unwrap();
        assert_eq!(snapshot.url, "https://repo.example/snapshots");
        assert_eq!(snapshot.username.as_deref(), Some("ci"));
        assert_eq!(repos.release.unwrap().password.as_deref(), Some("secret"));
    }

    #[test]
    fn manifest_urls_win_over_properties() {
        let section = PublishSection {
            release_url: Some("https://nexus.example/releases".into()),
            password: Some("token".into()),
            ..section()
        };
        let env = BTreeMap::from([(
            "deployReleasesURL".to_string(),
            "https://ignored.example".to_string(),
        )]);
        let repos = resolve_repositories(&section, &env);

        let release = repos.release.unwrap();
        assert_eq!(release.url, "https://nexus.example/releases");
        assert_eq!(release.password.as_deref(), Some("token"));
    }
}
