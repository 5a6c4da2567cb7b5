//! Settings for a single containerized build.
//!
//! [`BuilderConfig`] is assembled with consuming setters, in the same spirit
//! as the other builders in this workspace:
//!
//! ```
//! use std::time::Duration;
//! use graven_core::builder_config::BuilderConfig;
//!
//! let config = BuilderConfig::default()
//!     .docker_host("unix:///var/run/docker.sock")?
//!     .timeout(Duration::from_secs(300))?
//!     .on_stdout(|line| println!("[STDOUT] {line}"));
//! # Ok::<(), miette::Report>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use graven_util::errors::GravenError;
use url::Url;

/// Docker daemon address used when nothing else is configured.
pub const DEFAULT_DOCKER_HOST: &str = "tcp://localhost:2375";

/// Build step timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Host directory mounted at `/root/.m2` inside the container.
pub const DEFAULT_MAVEN_HOME: &str = "/tmp/gravenbuilder-home-maven";

/// Host directory mounted at `/root/.gradle` inside the container.
pub const DEFAULT_GRADLE_HOME: &str = "/tmp/gravenbuilder-home-gradle";

/// Trailing log lines requested when attaching to the build container.
pub const DEFAULT_LOG_TAIL: usize = 100;

/// Receives one line (or frame) of text.
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Decides whether a produced file is a build artifact.
pub type ArtifactFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Configuration for one containerized build.
#[derive(Clone)]
pub struct BuilderConfig {
    docker_host: Url,
    timeout: Duration,
    on_stdout: LineSink,
    on_stderr: LineSink,
    on_debug: LineSink,
    is_artifact: ArtifactFilter,
    maven_home: PathBuf,
    gradle_home: PathBuf,
    log_tail: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            docker_host: default_docker_host(),
            timeout: DEFAULT_TIMEOUT,
            on_stdout: Arc::new(|_| {}),
            on_stderr: Arc::new(|_| {}),
            on_debug: Arc::new(|_| {}),
            is_artifact: Arc::new(is_jar),
            maven_home: PathBuf::from(DEFAULT_MAVEN_HOME),
            gradle_home: PathBuf::from(DEFAULT_GRADLE_HOME),
            log_tail: DEFAULT_LOG_TAIL,
        }
    }
}

fn default_docker_host() -> Url {
    Url::parse(DEFAULT_DOCKER_HOST).expect("valid default docker host")
}

fn is_jar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".jar"))
}

impl BuilderConfig {
    /// Set the Docker daemon address (`tcp://`, `http://` or `unix://`).
    pub fn docker_host(mut self, host: &str) -> miette::Result<Self> {
        let url = Url::parse(host).map_err(|e| GravenError::Config {
            message: format!("Invalid docker host '{host}': {e}"),
        })?;
        match url.scheme() {
            "tcp" | "http" | "unix" => {}
            other => {
                return Err(GravenError::Config {
                    message: format!(
                        "Unsupported docker host scheme '{other}' in '{host}' (expected tcp, http or unix)"
                    ),
                }
                .into())
            }
        }
        self.docker_host = url;
        Ok(self)
    }

    /// Set the timeout for the build step itself. Pulling the image is not
    /// counted against it.
    pub fn timeout(mut self, timeout: Duration) -> miette::Result<Self> {
        if timeout.is_zero() {
            return Err(GravenError::Config {
                message: "timeout must be greater than 0".to_string(),
            }
            .into());
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn on_stdout(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stdout = Arc::new(sink);
        self
    }

    pub fn on_stderr(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stderr = Arc::new(sink);
        self
    }

    pub fn on_debug(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_debug = Arc::new(sink);
        self
    }

    /// Set the artifact predicate. It is only called for regular files that
    /// were modified after the build started, with their path relative to the
    /// project dir. Defaults to `*.jar`.
    pub fn is_artifact(mut self, filter: impl Fn(&Path) -> bool + Send + Sync + 'static) -> Self {
        self.is_artifact = Arc::new(filter);
        self
    }

    /// Accept files matching any of the glob `patterns`.
    ///
    /// Patterns without a `/` match the file name (`*.jar`); patterns with a
    /// `/` match the whole path relative to the project dir
    /// (`build/libs/*-all.jar`), where `*` stops at `/` and `**` does not.
    pub fn artifact_globs<S: AsRef<str>>(self, patterns: &[S]) -> miette::Result<Self> {
        let matcher = ArtifactGlobs::new(patterns)?;
        Ok(self.is_artifact(move |path| matcher.matches(path)))
    }

    pub fn maven_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.maven_home = dir.into();
        self
    }

    pub fn gradle_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.gradle_home = dir.into();
        self
    }

    pub fn log_tail(mut self, lines: usize) -> Self {
        self.log_tail = lines;
        self
    }

    pub fn get_docker_host(&self) -> &Url {
        &self.docker_host
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_maven_home(&self) -> &Path {
        &self.maven_home
    }

    pub fn get_gradle_home(&self) -> &Path {
        &self.gradle_home
    }

    pub fn get_log_tail(&self) -> usize {
        self.log_tail
    }

    pub fn emit_stdout(&self, line: &str) {
        (self.on_stdout)(line);
    }

    pub fn emit_stderr(&self, line: &str) {
        (self.on_stderr)(line);
    }

    /// Send a progress message to the debug sink and to `tracing`.
    pub fn debug(&self, message: &str) {
        tracing::debug!("{message}");
        (self.on_debug)(message);
    }

    pub fn accepts_artifact(&self, path: &Path) -> bool {
        (self.is_artifact)(path)
    }
}

impl fmt::Debug for BuilderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderConfig")
            .field("docker_host", &self.docker_host.as_str())
            .field("timeout", &self.timeout)
            .field("maven_home", &self.maven_home)
            .field("gradle_home", &self.gradle_home)
            .field("log_tail", &self.log_tail)
            .finish_non_exhaustive()
    }
}

struct ArtifactGlobs {
    names: GlobSet,
    paths: GlobSet,
}

impl ArtifactGlobs {
    fn new<S: AsRef<str>>(patterns: &[S]) -> miette::Result<Self> {
        let mut names = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.contains('/') {
                paths.add(compile(pattern.trim_start_matches('/'))?);
            } else {
                names.add(compile(pattern)?);
            }
        }
        Ok(Self {
            names: build_set(names)?,
            paths: build_set(paths)?,
        })
    }

    fn matches(&self, path: &Path) -> bool {
        let by_name = path
            .file_name()
            .is_some_and(|name| self.names.is_match(Path::new(name)));
        by_name || self.paths.is_match(path)
    }
}

fn compile(pattern: &str) -> miette::Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            GravenError::Config {
                message: format!("Invalid artifact pattern '{pattern}': {e}"),
            }
            .into()
        })
}

fn build_set(builder: GlobSetBuilder) -> miette::Result<GlobSet> {
    builder.build().map_err(|e| {
        GravenError::Config {
            message: format!("Invalid artifact patterns: {e}"),
        }
        .into()
    })
}
