use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Graven operations.
#[derive(Debug, Error, Diagnostic)]
pub enum GravenError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value (global config, graven.toml, or builder setting).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.graven/config.toml and graven.toml for invalid values"))]
    Config { message: String },

    /// The project type could not be determined from the project directory.
    #[error("Could not detect project type: {message}")]
    #[diagnostic(help("Pass --type gradle, --type maven, or --cmd to choose explicitly"))]
    Detection { message: String },

    /// Talking to the Docker daemon failed.
    #[error("Docker error: {message}")]
    Docker { message: String },

    /// The containerized build itself failed.
    #[error("Build failed: {message}")]
    Build { message: String },

    /// Network request or upload failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Publishing to a Maven repository could not proceed.
    #[error("Publish error: {message}")]
    Publish { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
