//! Picking the build's output files out of the project directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Files below `dir` modified strictly after `since` and accepted by `is_artifact`,
/// sorted by path. `is_artifact` sees each path relative to `dir`.
pub fn collect_artifacts(
    dir: &Path,
    since: SystemTime,
    is_artifact: impl Fn(&Path) -> bool,
) -> Vec<PathBuf> {
    let mut artifacts: Vec<PathBuf> = graven_util::fs::find_all_files(dir)
        .into_iter()
        .filter(|file| modified_after(file, since))
        .filter(|file| is_artifact(file.strip_prefix(dir).unwrap_or(file)))
        .collect();
    artifacts.sort();
    artifacts
}

fn modified_after(file: &Path, since: SystemTime) -> bool {
    match std::fs::metadata(file).and_then(|m| m.modified()) {
        Ok(mtime) => mtime > since,
        Err(e) => {
            tracing::debug!("Cannot read mtime of {}: {e}", file.display());
            false
        }
    }
}
