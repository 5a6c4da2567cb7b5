//! Checksum sidecars written next to every uploaded file.

use graven_util::hash::{md5_bytes, sha1_bytes, sha256_bytes};

/// Sidecar extensions in upload order.
pub const SIDECAR_EXTENSIONS: [&str; 3] = ["md5", "sha1", "sha256"];

/// `(file name, hex digest)` for each sidecar of `name`.
///
/// `app-1.0.jar` yields `app-1.0.jar.md5`, `app-1.0.jar.sha1` and
/// `app-1.0.jar.sha256`.
pub fn sidecars(name: &str, data: &[u8]) -> Vec<(String, String)> {
    SIDECAR_EXTENSIONS
        .iter()
        .map(|ext| {
            let digest = match *ext {
                "md5" => md5_bytes(data),
                "sha1" => sha1_bytes(data),
                _ => sha256_bytes(data),
            };
            (format!("{name}.{ext}"), digest)
        })
        .collect()
}
