//! The build pipeline: pull, create, start, follow, collect, remove.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use graven_core::builder_config::BuilderConfig;
use graven_core::project_type::ProjectType;
use graven_util::errors::GravenError;
use serde::Serialize;

use crate::artifacts::collect_artifacts;
use crate::docker::DockerEngine;
use crate::engine::{ContainerEngine, ContainerSpec, LogFrame, LogStream};
use crate::pull::PullReporter;

/// What a finished (or timed out) build produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    /// Name of the project type that was built (`gradle`, `maven`, `custom`).
    pub project_type: String,
    pub image: String,
    pub container_id: String,
    /// Files modified during the build that passed the artifact filter.
    pub artifacts: Vec<PathBuf>,
    pub timed_out: bool,
    /// `None` when the build timed out or the engine could not tell.
    pub exit_code: Option<i64>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl BuildOutcome {
    /// The build ran to completion and did not report a failing exit code.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code.map_or(true, |code| code == 0)
    }
}

/// Output of the part of the pipeline that runs while the container exists.
struct ContainerRun {
    artifacts: Vec<PathBuf>,
    timed_out: bool,
    exit_code: Option<i64>,
    duration: Duration,
}

/// Builds projects in Docker containers according to a [`BuilderConfig`].
pub struct GravenBuilder<E = DockerEngine> {
    config: BuilderConfig,
    engine: E,
}

impl GravenBuilder<DockerEngine> {
    /// Create a builder talking to the Docker daemon named in `config`.
    pub fn new(config: BuilderConfig) -> miette::Result<Self> {
        let engine = DockerEngine::connect(config.get_docker_host())?;
        Ok(Self { config, engine })
    }
}

impl<E: ContainerEngine> GravenBuilder<E> {
    /// Create a builder on top of an arbitrary engine.
    pub fn with_engine(config: BuilderConfig, engine: E) -> Self {
        Self { config, engine }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Build the project at `path`, detecting its type from `gradlew` / `pom.xml`.
    ///
    /// Fails if the type cannot be determined; use [`build_with`](Self::build_with)
    /// to name it explicitly.
    pub async fn build_on(&self, path: &Path, java_version: u32) -> miette::Result<BuildOutcome> {
        self.build_with(path, java_version, None).await
    }

    /// Build the project at `path` on the image for `java_version`.
    ///
    /// `project_type` overrides detection. The container is removed whether
    /// or not the build succeeds.
    pub async fn build_with(
        &self,
        path: &Path,
        java_version: u32,
        project_type: Option<ProjectType>,
    ) -> miette::Result<BuildOutcome> {
        let project_dir = graven_util::fs::absolute(path).map_err(GravenError::Io)?;
        let project_type = match project_type {
            Some(t) => t,
            None => ProjectType::detect(&project_dir)?,
        };
        self.config
            .debug(&format!("Using project type: {project_type}"));

        let image = project_type.image_for(java_version);
        self.pull(&image).await?;

        self.config.debug("Starting build");
        let spec = ContainerSpec::for_project(&project_dir, &image, &project_type, &self.config);
        let id = self.engine.create_container(&spec).await?;
        self.config.debug(&format!("Created container: {id}"));

        let result = self.run_container(&id, &project_dir).await;

        match self.engine.remove_container(&id).await {
            Ok(()) => self.config.debug(&format!("Removed container: {id}")),
            Err(e) if result.is_ok() => return Err(e),
            Err(e) => tracing::warn!("Failed to remove container {id} after failed build: {e}"),
        }

        let run = result?;
        Ok(BuildOutcome {
            project_type: project_type.name().to_string(),
            image,
            container_id: id,
            artifacts: run.artifacts,
            timed_out: run.timed_out,
            exit_code: run.exit_code,
            duration: run.duration,
        })
    }

    async fn pull(&self, image: &str) -> miette::Result<()> {
        let config = &self.config;
        let mut reporter = PullReporter::new();
        self.engine
            .pull_image(image, &mut |event| {
                if let Some(message) = reporter.report(event) {
                    config.debug(&message);
                }
            })
            .await?;
        config.debug(&format!("Successfully pulled image '{image}'"));
        Ok(())
    }

    async fn run_container(&self, id: &str, project_dir: &Path) -> miette::Result<ContainerRun> {
        let config = &self.config;
        let started_at = SystemTime::now();
        let clock = Instant::now();

        self.engine.start_container(id).await?;
        config.debug(&format!("Started container: {id}"));

        let mut forward = |frame: LogFrame| {
            let text = frame.text();
            match frame.stream {
                LogStream::Stdout => config.emit_stdout(&text),
                LogStream::Stderr => config.emit_stderr(&text),
            }
        };
        let timeout = config.get_timeout();
        let follow = self
            .engine
            .follow_logs(id, config.get_log_tail(), &mut forward);
        let timed_out = match tokio::time::timeout(timeout, follow).await {
            Ok(finished) => {
                finished?;
                false
            }
            Err(_) => {
                config.debug(&format!(
                    "Terminated due to exceeding timeout of {}",
                    humantime::format_duration(timeout)
                ));
                true
            }
        };

        let exit_code = if timed_out {
            None
        } else {
            self.engine.exit_code(id).await?
        };

        let artifacts = collect_artifacts(project_dir, started_at, |file| {
            config.accepts_artifact(file)
        });

        Ok(ContainerRun {
            artifacts,
            timed_out,
            exit_code,
            duration: clock.elapsed(),
        })
    }
}
