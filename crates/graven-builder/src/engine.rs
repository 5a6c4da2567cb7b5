//! The container engine seam used by [`GravenBuilder`](crate::GravenBuilder).

use std::path::{Path, PathBuf};

use graven_core::builder_config::BuilderConfig;
use graven_core::project_type::ProjectType;

/// Where the project directory is mounted inside the container.
pub const APP_DIR: &str = "/app";
/// Maven's local repository inside the container.
pub const MAVEN_HOME_DIR: &str = "/root/.m2";
/// Gradle's user home inside the container.
pub const GRADLE_HOME_DIR: &str = "/root/.gradle";

/// Byte counters attached to a pull progress event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressDetail {
    pub current: Option<i64>,
    pub total: Option<i64>,
}

/// One status event from an image pull.
#[derive(Debug, Clone, Default)]
pub struct PullProgress {
    /// Layer id, when the event concerns a layer.
    pub id: Option<String>,
    pub status: Option<String>,
    pub detail: Option<ProgressDetail>,
}

/// Output stream a log frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// A chunk of container output.
#[derive(Debug, Clone)]
pub struct LogFrame {
    pub stream: LogStream,
    pub payload: Vec<u8>,
}

impl LogFrame {
    pub fn stdout(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: LogStream::Stdout,
            payload: payload.into(),
        }
    }

    pub fn stderr(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: LogStream::Stderr,
            payload: payload.into(),
        }
    }

    /// Payload as text with surrounding whitespace removed.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).trim().to_string()
    }
}

/// A host directory mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bind {
    pub host: PathBuf,
    pub container: String,
}

impl Bind {
    pub fn new(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }

    /// Docker `Binds` syntax: `host:container`.
    pub fn to_docker(&self) -> String {
        format!("{}:{}", self.host.display(), self.container)
    }
}

/// Everything needed to create a build container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: String,
    pub cmd: Vec<String>,
    pub working_dir: String,
    pub binds: Vec<Bind>,
}

impl ContainerSpec {
    /// The container for building `project_dir` (which must be absolute)
    /// with `project_type` on `image`.
    pub fn for_project(
        project_dir: &Path,
        image: &str,
        project_type: &ProjectType,
        config: &BuilderConfig,
    ) -> Self {
        Self {
            image: image.to_string(),
            cmd: project_type.cmd().to_vec(),
            working_dir: APP_DIR.to_string(),
            binds: vec![
                Bind::new(config.get_maven_home(), MAVEN_HOME_DIR),
                Bind::new(config.get_gradle_home(), GRADLE_HOME_DIR),
                Bind::new(project_dir, APP_DIR),
            ],
        }
    }

    /// Container-side mount points, for the `Volumes` field of the create request.
    pub fn volumes(&self) -> Vec<String> {
        self.binds.iter().map(|b| b.container.clone()).collect()
    }
}

/// Operations the builder needs from a container runtime.
///
/// Implementations report failures as [`GravenError::Docker`](graven_util::errors::GravenError::Docker).
#[allow(async_fn_in_trait)]
pub trait ContainerEngine {
    /// Pull `image`, calling `on_progress` for every status event. Returns once the pull completes.
    async fn pull_image(
        &self,
        image: &str,
        on_progress: &mut dyn FnMut(&PullProgress),
    ) -> miette::Result<()>;

    /// Create (but do not start) a container and return its id.
    async fn create_container(&self, spec: &ContainerSpec) -> miette::Result<String>;

    async fn start_container(&self, id: &str) -> miette::Result<()>;

    /// Follow stdout and stderr, starting `tail` lines back, until the container exits.
    async fn follow_logs(
        &self,
        id: &str,
        tail: usize,
        on_frame: &mut dyn FnMut(LogFrame),
    ) -> miette::Result<()>;

    /// Exit code of a stopped container, if the engine knows it.
    async fn exit_code(&self, id: &str) -> miette::Result<Option<i64>>;

    /// Force-remove the container together with its anonymous volumes.
    async fn remove_container(&self, id: &str) -> miette::Result<()>;
}
