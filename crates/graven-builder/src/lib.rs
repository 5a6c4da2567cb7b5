//! Builds Maven and Gradle projects inside throw-away Docker containers.
//!
//! [`GravenBuilder`] drives one build: pull the image, create a container
//! with the project bind-mounted at `/app`, stream its output, collect the
//! files it produced, and remove the container again. The Docker calls sit
//! behind [`ContainerEngine`] so the orchestration can run against any engine.

pub mod artifacts;
pub mod builder;
pub mod docker;
pub mod engine;
pub mod pull;

pub use builder::{BuildOutcome, GravenBuilder};
pub use docker::DockerEngine;
pub use engine::ContainerEngine;
