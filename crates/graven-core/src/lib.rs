//! Core data types for Graven.
//!
//! This crate defines what a containerized build is made of: the project
//! type (which image and command to run), the builder configuration (Docker
//! host, timeout, output sinks, artifact filter), the global user config,
//! the optional per-project `graven.toml`, and `.graven.env` properties.
//!
//! This crate is intentionally free of async code, Docker, and network I/O.

/// Java version used when neither the CLI nor any config file names one.
pub const DEFAULT_JAVA_VERSION: u32 = 17;

pub mod builder_config;
pub mod config;
pub mod manifest;
pub mod project_type;
pub mod properties;
