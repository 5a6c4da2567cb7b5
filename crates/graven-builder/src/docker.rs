//! [`ContainerEngine`] backed by the Docker Engine API via bollard.

use std::collections::HashMap;

use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::stream::StreamExt;
use graven_util::errors::GravenError;
use url::Url;

use crate::engine::{ContainerEngine, ContainerSpec, LogFrame, ProgressDetail, PullProgress};

/// Seconds bollard waits for the daemon to answer a request.
const CLIENT_TIMEOUT_SECS: u64 = 120;

/// A connection to a Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connect to the daemon at `host`: `unix://` goes through the socket,
    /// `tcp://` and `http://` over plain HTTP.
    ///
    /// No request is sent until the first operation.
    pub fn connect(host: &Url) -> miette::Result<Self> {
        let docker = if host.scheme() == "unix" {
            Docker::connect_with_socket(host.as_str(), CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        } else {
            Docker::connect_with_http(host.as_str(), CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        }
        .map_err(|e| GravenError::Docker {
            message: format!("Failed to connect to Docker daemon at {host}: {e}"),
        })?;
        tracing::debug!("Connected to Docker daemon at {host}");
        Ok(Self { docker })
    }
}

fn docker_error(context: &str, e: bollard::errors::Error) -> miette::Report {
    GravenError::Docker {
        message: format!("{context}: {e}"),
    }
    .into()
}

impl ContainerEngine for DockerEngine {
    async fn pull_image(
        &self,
        image: &str,
        on_progress: &mut dyn FnMut(&PullProgress),
    ) -> miette::Result<()> {
        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(item) = stream.next().await {
            let info = item.map_err(|e| docker_error(&format!("Failed to pull image '{image}'"), e))?;
            let event = PullProgress {
                id: info.id,
                status: info.status,
                detail: info.progress_detail.map(|d| ProgressDetail {
                    current: d.current,
                    total: d.total,
                }),
            };
            on_progress(&event);
        }
        Ok(())
    }

    async fn create_container(&self, spec: &ContainerSpec) -> miette::Result<String> {
        let volumes: HashMap<String, HashMap<(), ()>> = spec
            .volumes()
            .into_iter()
            .map(|v| (v, HashMap::new()))
            .collect();
        let host_config = HostConfig {
            binds: Some(spec.binds.iter().map(|b| b.to_docker()).collect()),
            ..Default::default()
        };
        let config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.cmd.clone()),
            working_dir: Some(spec.working_dir.clone()),
            volumes: Some(volumes),
            host_config: Some(host_config),
            ..Default::default()
        };

        let response = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(|e| docker_error("Failed to create container", e))?;
        for warning in &response.warnings {
            tracing::warn!("Docker: {warning}");
        }
        Ok(response.id)
    }

    async fn start_container(&self, id: &str) -> miette::Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| docker_error(&format!("Failed to start container {id}"), e))
    }

    async fn follow_logs(
        &self,
        id: &str,
        tail: usize,
        on_frame: &mut dyn FnMut(LogFrame),
    ) -> miette::Result<()> {
        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));
        while let Some(item) = stream.next().await {
            match item.map_err(|e| docker_error(&format!("Failed to read logs of {id}"), e))? {
                LogOutput::StdOut { message } | LogOutput::Console { message } => {
                    on_frame(LogFrame::stdout(message.to_vec()));
                }
                LogOutput::StdErr { message } => on_frame(LogFrame::stderr(message.to_vec())),
                LogOutput::StdIn { .. } => {}
            }
        }
        Ok(())
    }

    async fn exit_code(&self, id: &str) -> miette::Result<Option<i64>> {
        let options = WaitContainerOptions {
            condition: "not-running",
        };
        let mut stream = self.docker.wait_container(id, Some(options));
        match stream.next().await {
            Some(Ok(response)) => Ok(Some(response.status_code)),
            // bollard reports a non-zero exit status as an error
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Ok(Some(code)),
            Some(Err(e)) => Err(docker_error(&format!("Failed to wait for container {id}"), e)),
            None => Ok(None),
        }
    }

    async fn remove_container(&self, id: &str) -> miette::Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(|e| docker_error(&format!("Failed to remove container {id}"), e))
    }
}
