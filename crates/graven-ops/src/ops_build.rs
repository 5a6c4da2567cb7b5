//! Operation: build a project inside a Docker container.
//!
//! Settings are layered: CLI options, then `graven.toml`, then the global
//! `~/.graven/config.toml`, then built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use graven_builder::{BuildOutcome, GravenBuilder};
use graven_core::builder_config::BuilderConfig;
use graven_core::config::GlobalConfig;
use graven_core::manifest::Manifest;
use graven_core::project_type::ProjectType;
use graven_util::errors::GravenError;
use graven_util::progress::{spinner, status, status_info, status_warn};

use crate::ops_detect::resolve_project_type;

/// Options for a build invocation. `None` means "not given on the command line".
#[derive(Default)]
pub struct BuildOptions {
    pub java: Option<u32>,
    /// From `--type` or `--cmd`.
    pub project_type: Option<ProjectType>,
    pub image: Option<String>,
    pub docker_host: Option<String>,
    pub timeout: Option<Duration>,
    pub artifacts: Vec<String>,
    /// Print builder debug messages as status lines.
    pub verbose: bool,
    /// Suppress status lines and the pull spinner (used for `--json`).
    pub quiet: bool,
}

/// Fully layered build settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBuild {
    pub project_dir: PathBuf,
    pub project_type: ProjectType,
    pub java: u32,
    pub docker_host: String,
    pub timeout: Duration,
    pub artifacts: Vec<String>,
    pub maven_home: PathBuf,
    pub gradle_home: PathBuf,
}

impl ResolvedBuild {
    pub fn image(&self) -> String {
        self.project_type.image_for(self.java)
    }
}

/// Layer CLI options over the project manifest and the global config.
pub fn resolve(
    project_dir: &Path,
    opts: &BuildOptions,
    manifest: &Manifest,
    global: &GlobalConfig,
) -> miette::Result<ResolvedBuild> {
    let project_dir = graven_util::fs::absolute(project_dir).map_err(GravenError::Io)?;
    if !project_dir.is_dir() {
        return Err(GravenError::Config {
            message: format!("{} is not a directory", project_dir.display()),
        }
        .into());
    }

    let project_type = resolve_project_type(
        &project_dir,
        manifest,
        opts.project_type.clone(),
        opts.image.as_deref(),
    )?;

    let build = &manifest.build;
    let artifacts = if !opts.artifacts.is_empty() {
        opts.artifacts.clone()
    } else {
        build.artifacts.clone()
    };

    Ok(ResolvedBuild {
        project_dir,
        project_type,
        java: opts.java.or(build.java).unwrap_or(global.build.java),
        docker_host: opts
            .docker_host
            .clone()
            .or_else(|| build.docker_host.clone())
            .unwrap_or_else(|| global.docker.host.clone()),
        timeout: opts.timeout.or(build.timeout).unwrap_or(global.build.timeout),
        artifacts,
        maven_home: global.cache.maven_home.clone(),
        gradle_home: global.cache.gradle_home.clone(),
    })
}

/// Turn resolved settings into a [`BuilderConfig`] with terminal sinks.
///
/// Container stdout goes to stdout, stderr to stderr. Debug messages become
/// status lines when `verbose`; the builder logs them via tracing either way.
pub fn builder_config(resolved: &ResolvedBuild, verbose: bool) -> miette::Result<BuilderConfig> {
    let mut config = BuilderConfig::default()
        .docker_host(&resolved.docker_host)?
        .timeout(resolved.timeout)?
        .maven_home(&resolved.maven_home)
        .gradle_home(&resolved.gradle_home)
        .on_stdout(|line| println!("{line}"))
        .on_stderr(|line| eprintln!("{line}"));
    if !resolved.artifacts.is_empty() {
        config = config.artifact_globs(resolved.artifacts.as_slice())?;
    }
    if verbose {
        config = config.on_debug(|message| status_info("Debug", message));
    }
    Ok(config)
}

/// Build the project at `project_dir` in a container.
///
/// Returns the outcome even for failed or timed-out builds; callers decide
/// the exit status via [`BuildOutcome::success`].
pub async fn build(project_dir: &Path, opts: &BuildOptions) -> miette::Result<BuildOutcome> {
    let global = GlobalConfig::load()?;
    let manifest = Manifest::load(project_dir)?;
    let resolved = resolve(project_dir, opts, &manifest, &global)?;
    let image = resolved.image();

    // must exist before they are bind-mounted
    for dir in [&resolved.maven_home, &resolved.gradle_home] {
        graven_util::fs::ensure_dir(dir).map_err(GravenError::Io)?;
    }

    let mut config = builder_config(&resolved, opts.verbose)?;
    if !opts.quiet {
        status(
            "Building",
            &format!(
                "{} ({} on {image}, docker {})",
                resolved.project_dir.display(),
                resolved.project_type.name(),
                resolved.docker_host
            ),
        );
    }

    let pull = (!opts.quiet).then(|| spinner(&format!("Pulling {image}")));
    if let Some(pb) = &pull {
        let pb = pb.clone();
        let verbose = opts.verbose;
        config = config.on_debug(move |message| {
            if message.starts_with("Pulling layer") {
                pb.set_message(message.to_string());
            } else if message.starts_with("Successfully pulled") {
                pb.finish_and_clear();
            }
            if verbose {
                pb.suspend(|| status_info("Debug", message));
            }
        });
    }

    let result = match GravenBuilder::new(config) {
        Ok(builder) => {
            builder
                .build_with(&resolved.project_dir, resolved.java, Some(resolved.project_type))
                .await
        }
        Err(e) => Err(e),
    };
    if let Some(pb) = pull {
        pb.finish_and_clear();
    }
    let outcome = result?;

    if !opts.quiet {
        let elapsed = seconds(outcome.duration);
        if outcome.timed_out {
            status_warn(
                "Timed out",
                &format!("after {}", seconds(resolved.timeout)),
            );
        } else if outcome.success() {
            status("Finished", &format!("build in {elapsed}"));
        } else {
            status_warn(
                "Failed",
                &format!(
                    "build exited with code {} after {elapsed}",
                    outcome.exit_code.unwrap_or(-1)
                ),
            );
        }
    }

    Ok(outcome)
}

fn seconds(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}
