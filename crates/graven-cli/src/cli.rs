//! CLI argument definitions for Graven.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "graven",
    version,
    about = "Build JVM projects in Docker containers",
    long_about = "Graven builds Gradle and Maven projects inside throwaway Docker containers, \
                  collects the artifacts they produce, and publishes them to Maven repositories."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a project in a Docker container
    Build(BuildArgs),

    /// Print the detected project type
    Detect {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Publish built artifacts to a Maven repository
    Publish(PublishArgs),

    /// Remove the host-side Maven and Gradle caches
    CleanCache,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Java version of the build image
    #[arg(long)]
    pub java: Option<u32>,

    /// Project type: gradle or maven (skips detection)
    #[arg(long = "type", value_name = "TYPE", conflicts_with = "cmd")]
    pub project_type: Option<String>,

    /// Custom build command, run in the project directory
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "ARG")]
    pub cmd: Option<Vec<String>>,

    /// Image template; `{java}` is replaced with the Java version
    #[arg(long)]
    pub image: Option<String>,

    /// Docker daemon URL (tcp://, http:// or unix://)
    #[arg(long, env = "GRAVEN_DOCKER_HOST")]
    pub docker_host: Option<String>,

    /// Build timeout, e.g. `10m` or `90s`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Artifact glob, repeatable [default: *.jar]
    #[arg(long = "artifact", value_name = "GLOB")]
    pub artifacts: Vec<String>,

    /// Print the build outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// File to publish, repeatable [default: jars under build/libs or target]
    #[arg(long = "file", value_name = "JAR")]
    pub files: Vec<PathBuf>,

    /// Maven group id
    #[arg(long)]
    pub group: Option<String>,

    /// Maven artifact id
    #[arg(long)]
    pub artifact: Option<String>,

    /// Version; `*SNAPSHOT` versions go to the snapshot repository
    #[arg(long)]
    pub version: Option<String>,

    /// Show what would be uploaded without uploading
    #[arg(long)]
    pub dry_run: bool,
}

/// Parse CLI arguments from `std::env::args`.
pub fn parse() -> Cli {
    Cli::parse()
}
