//! Operation: remove the host-side Maven/Gradle caches mounted into build
//! containers.

use std::path::{Path, PathBuf};

use graven_core::config::GlobalConfig;
use graven_util::errors::GravenError;

/// Remove the cache directories named in the global configuration.
pub fn clean_cache(config: &GlobalConfig) -> miette::Result<Vec<CleanResult>> {
    [&config.cache.maven_home, &config.cache.gradle_home]
        .into_iter()
        .map(|dir| clean_dir(dir))
        .collect()
}

fn clean_dir(dir: &Path) -> miette::Result<CleanResult> {
    if !dir.exists() {
        return Ok(CleanResult::NotFound(dir.to_path_buf()));
    }
    std::fs::remove_dir_all(dir).map_err(|e| GravenError::Generic {
        message: format!(
            "Failed to remove {}: {e} (files written by the container may be owned by root)",
            dir.display()
        ),
    })?;
    tracing::debug!("Removed cache directory {}", dir.display());
    Ok(CleanResult::Removed(dir.to_path_buf()))
}

/// Result of cleaning one cache directory.
#[derive(Debug, PartialEq, Eq)]
pub enum CleanResult {
    Removed(PathBuf),
    NotFound(PathBuf),
}
