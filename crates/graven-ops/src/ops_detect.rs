//! Operation: determine the project type of a directory.

use std::path::Path;

use graven_core::manifest::Manifest;
use graven_core::project_type::ProjectType;

/// Resolve the project type for `project_dir`.
///
/// An explicit `explicit` type wins, then `[build]` in `graven.toml`, then
/// detection from `gradlew` / `pom.xml`. An image template from `image`, or
/// else from the manifest, replaces the type's default image.
pub fn resolve_project_type(
    project_dir: &Path,
    manifest: &Manifest,
    explicit: Option<ProjectType>,
    image: Option<&str>,
) -> miette::Result<ProjectType> {
    let project_type = match explicit {
        Some(t) => t,
        None => match manifest.build.project_type()? {
            Some(t) => t,
            None => ProjectType::detect(project_dir)?,
        },
    };

    let image = image.or(manifest.build.image.as_deref());
    Ok(match image {
        Some(template) => project_type.with_image(template),
        None => project_type,
    })
}

/// Detect the project type of `project_dir`, honouring its `graven.toml`.
pub fn detect(project_dir: &Path) -> miette::Result<ProjectType> {
    let manifest = Manifest::load(project_dir)?;
    resolve_project_type(project_dir, &manifest, None, None)
}
