//! Publishing build outputs to a Maven repository.
//!
//! The repository is chosen by version: `*SNAPSHOT` versions go to the
//! snapshot repository, everything else to the release repository.
//! Snapshots are deployed with unique timestamped file names and a
//! version-level `maven-metadata.xml`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use graven_util::errors::GravenError;
use reqwest::Client;

use crate::checksum;
use crate::metadata::{ArtifactMetadata, SnapshotMetadata, SnapshotVersion};
use crate::pom;
use crate::repository::{MavenRepository, METADATA_FILE};
use crate::transport;

/// Classifiers recognized from file name suffixes (`app-1.0-sources.jar`).
const KNOWN_CLASSIFIERS: [&str; 2] = ["sources", "javadoc"];

/// Maven coordinates of what is being published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Publication {
    pub fn new(group: &str, artifact: &str, version: &str) -> miette::Result<Self> {
        for (field, value) in [("group", group), ("artifact", artifact), ("version", version)] {
            if value.is_empty() || value.contains(['/', '\\', ' ', ':']) {
                return Err(GravenError::Config {
                    message: format!("Invalid publication {field}: '{value}'"),
                }
                .into());
            }
        }
        if group.split('.').any(str::is_empty) {
            return Err(GravenError::Config {
                message: format!("Invalid publication group: '{group}' has an empty segment"),
            }
            .into());
        }
        Ok(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
        })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("SNAPSHOT")
    }

    /// Version used in file names of this deployment.
    ///
    /// `1.0-SNAPSHOT` with timestamp `20240101.120000` and build 3 becomes
    /// `1.0-20240101.120000-3`; release versions are returned unchanged.
    pub fn file_version(&self, timestamp: &str, build_number: u32) -> String {
        match self.version.strip_suffix("SNAPSHOT") {
            Some(base) => format!("{base}{timestamp}-{build_number}"),
            None => self.version.clone(),
        }
    }
}

impl std::fmt::Display for Publication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Snapshot and release deploy targets.
#[derive(Debug, Clone, Default)]
pub struct PublishRepositories {
    pub snapshot: Option<MavenRepository>,
    pub release: Option<MavenRepository>,
}

impl PublishRepositories {
    /// Pick the repository for `version`.
    pub fn select(&self, version: &str) -> miette::Result<&MavenRepository> {
        let (repo, key) = if version.ends_with("SNAPSHOT") {
            (&self.snapshot, "deploySnapshotURL")
        } else {
            (&self.release, "deployReleasesURL")
        };
        repo.as_ref().ok_or_else(|| {
            GravenError::Publish {
                message: format!(
                    "No repository to publish version {version} to: set {key} \
                     (or the matching url in graven.toml [publish])"
                ),
            }
            .into()
        })
    }
}

/// A local file to publish and the classifier it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFile {
    pub path: PathBuf,
    pub classifier: Option<String>,
    pub extension: String,
}

impl PublishFile {
    /// Name of this file in the repository for the given file version.
    pub fn remote_name(&self, artifact: &str, file_version: &str) -> String {
        match &self.classifier {
            Some(c) => format!("{artifact}-{file_version}-{c}.{}", self.extension),
            None => format!("{artifact}-{file_version}.{}", self.extension),
        }
    }
}

/// Work out classifiers from file names.
///
/// Exactly one file must be without classifier; it becomes the main
/// artifact.
pub fn classify(files: &[PathBuf]) -> miette::Result<Vec<PublishFile>> {
    let mut out: Vec<PublishFile> = Vec::new();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (stem, extension) = name.rsplit_once('.').ok_or_else(|| GravenError::Publish {
            message: format!("Cannot publish {}: file has no extension", path.display()),
        })?;
        let classifier = KNOWN_CLASSIFIERS
            .iter()
            .find(|c| stem.ends_with(&format!("-{c}")))
            .map(|c| c.to_string());

        if out
            .iter()
            .any(|f| f.classifier == classifier && f.extension == extension)
        {
            let what = classifier.as_deref().unwrap_or("main artifact");
            return Err(GravenError::Publish {
                message: format!(
                    "More than one {what} ({extension}) to publish, including {}; \
                     pass --file to choose",
                    path.display()
                ),
            }
            .into());
        }
        out.push(PublishFile {
            path: path.clone(),
            classifier,
            extension: extension.to_string(),
        });
    }

    if !out.iter().any(|f| f.classifier.is_none()) {
        return Err(GravenError::Publish {
            message: "No main artifact to publish (only classified files were given)".into(),
        }
        .into());
    }
    // main artifact first
    out.sort_by_key(|f| f.classifier.is_some());
    Ok(out)
}

/// One file to PUT.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub url: String,
    pub data: Vec<u8>,
}

/// Everything a deployment will upload, in order.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub publication: Publication,
    pub repository: MavenRepository,
    /// Version used in uploaded file names (timestamped for snapshots).
    pub file_version: String,
    pub uploads: Vec<Upload>,
}

/// Remote state a plan is built on.
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    pub artifact_metadata: Option<ArtifactMetadata>,
    pub snapshot_metadata: Option<SnapshotMetadata>,
}

/// Fetch the remote metadata for `publication` and plan the uploads.
pub async fn prepare(
    client: &Client,
    repos: &PublishRepositories,
    publication: &Publication,
    files: &[PublishFile],
    now: DateTime<Utc>,
) -> miette::Result<PublishPlan> {
    let repo = repos.select(&publication.version)?;
    let contents = files
        .iter()
        .map(|f| read_file(&f.path).map(|data| (f.clone(), data)))
        .collect::<miette::Result<Vec<_>>>()?;

    let mut remote = RemoteState::default();
    let url = repo.metadata_url(&publication.group, &publication.artifact);
    if let Some(xml) = transport::fetch_text(client, repo, &url).await? {
        remote.artifact_metadata = Some(ArtifactMetadata::parse(&xml)?);
    }
    if publication.is_snapshot() {
        let url = repo.version_metadata_url(
            &publication.group,
            &publication.artifact,
            &publication.version,
        );
        if let Some(xml) = transport::fetch_text(client, repo, &url).await? {
            remote.snapshot_metadata = Some(SnapshotMetadata::parse(&xml)?);
        }
    }

    assemble(publication, repo, &contents, remote, now)
}

/// Build the upload list from local files and remote state.
///
/// Order: artifacts (main first), POM, version metadata (snapshots only),
/// artifact metadata. Each is followed by its checksum sidecars.
pub fn assemble(
    publication: &Publication,
    repo: &MavenRepository,
    files: &[(PublishFile, Vec<u8>)],
    remote: RemoteState,
    now: DateTime<Utc>,
) -> miette::Result<PublishPlan> {
    let timestamp = now.format("%Y%m%d.%H%M%S").to_string();
    let last_updated = now.format("%Y%m%d%H%M%S").to_string();
    let build_number = remote
        .snapshot_metadata
        .as_ref()
        .map_or(0, |m| m.build_number)
        + 1;
    let file_version = publication.file_version(&timestamp, build_number);

    let (group, artifact, version) = (
        publication.group.as_str(),
        publication.artifact.as_str(),
        publication.version.as_str(),
    );
    let mut uploads = Vec::new();
    let mut push = |name: String, url: String, data: Vec<u8>| {
        let sums = checksum::sidecars(&name, &data);
        let base_url = url.clone();
        let base_len = name.len();
        uploads.push(Upload { name, url, data });
        for (sidecar, digest) in sums {
            uploads.push(Upload {
                url: format!("{base_url}{}", &sidecar[base_len..]),
                name: sidecar,
                data: digest.into_bytes(),
            });
        }
    };

    let mut snapshot_versions = Vec::new();
    for (file, data) in files {
        let name = file.remote_name(artifact, &file_version);
        let url = repo.file_url(group, artifact, version, &name);
        snapshot_versions.push(SnapshotVersion {
            classifier: file.classifier.clone(),
            extension: file.extension.clone(),
            value: file_version.clone(),
            updated: last_updated.clone(),
        });
        push(name, url, data.clone());
    }

    let pom_name = format!("{artifact}-{file_version}.pom");
    let pom_url = repo.file_url(group, artifact, version, &pom_name);
    push(pom_name, pom_url, pom::render(publication)?);
    snapshot_versions.push(SnapshotVersion {
        classifier: None,
        extension: "pom".to_string(),
        value: file_version.clone(),
        updated: last_updated.clone(),
    });

    if publication.is_snapshot() {
        let meta = SnapshotMetadata {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            version: version.to_string(),
            timestamp: Some(timestamp),
            build_number,
            last_updated: Some(last_updated.clone()),
            snapshot_versions,
        };
        push(
            METADATA_FILE.to_string(),
            repo.version_metadata_url(group, artifact, version),
            meta.render()?,
        );
    }

    let mut meta = remote
        .artifact_metadata
        .unwrap_or_else(|| ArtifactMetadata::new(group, artifact));
    if meta.group_id.is_empty() {
        meta.group_id = group.to_string();
    }
    if meta.artifact_id.is_empty() {
        meta.artifact_id = artifact.to_string();
    }
    meta.merge_version(version, &last_updated);
    push(
        METADATA_FILE.to_string(),
        repo.metadata_url(group, artifact),
        meta.render()?,
    );

    Ok(PublishPlan {
        publication: publication.clone(),
        repository: repo.clone(),
        file_version,
        uploads,
    })
}

/// Upload every file of `plan` in order, calling `on_upload` before each.
pub async fn execute(
    client: &Client,
    plan: &PublishPlan,
    mut on_upload: impl FnMut(&Upload),
) -> miette::Result<()> {
    tracing::info!(
        "Publishing {} to {} ({})",
        plan.publication,
        plan.repository.name,
        plan.repository.url
    );
    for upload in &plan.uploads {
        on_upload(upload);
        transport::upload(client, &plan.repository, &upload.url, &upload.data).await?;
    }
    Ok(())
}

fn read_file(path: &Path) -> miette::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        GravenError::Publish {
            message: format!("Failed to read {}: {e}", path.display()),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn repos() -> PublishRepositories {
        PublishRepositories {
            snapshot: Some(MavenRepository::new("snapshots", "https://repo.example/snapshots")),
            release: Some(MavenRepository::new("releases", "https://repo.example/releases")),
        }
    }

    fn main_jar() -> (PublishFile, Vec<u8>) {
        (
            PublishFile {
                path: PathBuf::from("build/libs/app-1.0.jar"),
                classifier: None,
                extension: "jar".into(),
            },
            b"PK".to_vec(),
        )
    }

    fn names(plan: &PublishPlan) -> Vec<&str> {
        plan.uploads.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn select_routes_by_snapshot_suffix() {
        let repos = repos();
        assert_eq!(repos.select("1.0-SNAPSHOT").unwrap().name, "snapshots");
        assert_eq!(repos.select("1.0").unwrap().name, "releases");
    }

    #[test]
    fn select_names_missing_property() {
        let repos = PublishRepositories {
            release: None,
            ..repos()
        };
        let err = repos.select("2.0").unwrap_err();
        assert!(err.to_string().contains("deployReleasesURL"));

        let repos = PublishRepositories::default();
        let err = repos.select("2.0-SNAPSHOT").unwrap_err();
        assert!(err.to_string().contains("deploySnapshotURL"));
    }

    #[test]
    fn publication_rejects_bad_coordinates() {
        assert!(Publication::new("net.azisaba", "", "1.0").is_err());
        assert!(Publication::new("net/azisaba", "app", "1.0").is_err());
        assert!(Publication::new("net.azisaba", "app", "1.0").is_ok());
    }

    #[test]
    fn group_with_empty_segment_is_rejected() {
        for group in ["net..azisaba", ".net", "net.", "."] {
            let err = Publication::new(group, "app", "1.0").unwrap_err();
            assert!(err.to_string().contains("empty segment"), "{group}");
        }
    }

    #[test]
    fn file_version_for_snapshots_and_releases() {
        let snap = Publication::new("g", "a", "1.0-SNAPSHOT").unwrap();
        assert_eq!(snap.file_version("20240101.120000", 3), "1.0-20240101.120000-3");
        let release = Publication::new("g", "a", "1.0").unwrap();
        assert_eq!(release.file_version("20240101.120000", 3), "1.0");
    }

    #[test]
    fn classify_detects_classifiers_and_orders_main_first() {
        let files = classify(&[
            PathBuf::from("app-1.0-sources.jar"),
            PathBuf::from("app-1.0.jar"),
            PathBuf::from("app-1.0-javadoc.jar"),
        ])
        .unwrap();
        assert_eq!(files[0].classifier, None);
        assert_eq!(files[0].path, PathBuf::from("app-1.0.jar"));
        let classifiers: Vec<_> = files.iter().map(|f| f.classifier.clone()).collect();
        assert!(classifiers.contains(&Some("sources".to_string())));
        assert!(classifiers.contains(&Some("javadoc".to_string())));
    }

    #[test]
    fn classify_rejects_two_main_jars() {
        let err = classify(&[PathBuf::from("app.jar"), PathBuf::from("app-all.jar")]).unwrap_err();
        assert!(err.to_string().contains("More than one main artifact"));
    }

    #[test]
    fn classify_requires_main_artifact() {
        let err = classify(&[PathBuf::from("app-sources.jar")]).unwrap_err();
        assert!(err.to_string().contains("No main artifact"));
    }

    #[test]
    fn release_plan_uploads_jar_pom_and_metadata_with_sidecars() {
        let publication = Publication::new("net.azisaba", "app", "1.0").unwrap();
        let repos = repos();
        let repo = repos.select(&publication.version).unwrap();

        let plan = assemble(&publication, repo, &[main_jar()], RemoteState::default(), now())
            .unwrap();

        assert_eq!(plan.file_version, "1.0");
        assert_eq!(
            names(&plan),
            vec![
                "app-1.0.jar",
                "app-1.0.jar.md5",
                "app-1.0.jar.sha1",
                "app-1.0.jar.sha256",
                "app-1.0.pom",
                "app-1.0.pom.md5",
                "app-1.0.pom.sha1",
                "app-1.0.pom.sha256",
                "maven-metadata.xml",
                "maven-metadata.xml.md5",
                "maven-metadata.xml.sha1",
                "maven-metadata.xml.sha256",
            ]
        );
        assert_eq!(
            plan.uploads[0].url,
            "https://repo.example/releases/net/azisaba/app/1.0/app-1.0.jar"
        );
        assert_eq!(
            plan.uploads[2].url,
            "https://repo.example/releases/net/azisaba/app/1.0/app-1.0.jar.sha1"
        );
        assert_eq!(
            plan.uploads[2].data,
            graven_util::hash::sha1_bytes(b"PK").into_bytes()
        );

        let metadata = String::from_utf8(plan.uploads[8].data.clone()).unwrap();
        assert_eq!(
            plan.uploads[8].url,
            "https://repo.example/releases/net/azisaba/app/maven-metadata.xml"
        );
        assert!(metadata.contains("<release>1.0</release>"));
        assert!(metadata.contains("<lastUpdated>20240309140507</lastUpdated>"));
    }

    #[test]
    fn snapshot_plan_uses_next_build_number() {
        let publication = Publication::new("net.azisaba", "app", "1.1-SNAPSHOT").unwrap();
        let repos = repos();
        let repo = repos.select(&publication.version).unwrap();
        let remote = RemoteState {
            artifact_metadata: Some(ArtifactMetadata {
                group_id: "net.azisaba".into(),
                artifact_id: "app".into(),
                latest: Some("1.0".into()),
                release: Some("1.0".into()),
                versions: vec!["1.0".into(), "1.1-SNAPSHOT".into()],
                last_updated: None,
            }),
            snapshot_metadata: Some(SnapshotMetadata {
                build_number: 4,
                ..Default::default()
            }),
        };

        let plan = assemble(&publication, repo, &[main_jar()], remote, now()).unwrap();

        assert_eq!(plan.repository.name, "snapshots");
        assert_eq!(plan.file_version, "1.1-20240309.140507-5");
        assert_eq!(plan.uploads[0].name, "app-1.1-20240309.140507-5.jar");
        assert!(plan.uploads[0]
            .url
            .ends_with("/net/azisaba/app/1.1-SNAPSHOT/app-1.1-20240309.140507-5.jar"));

        let version_meta = plan
            .uploads
            .iter()
            .find(|u| u.url.ends_with("/1.1-SNAPSHOT/maven-metadata.xml"))
            .unwrap();
        let parsed =
            SnapshotMetadata::parse(&String::from_utf8(version_meta.data.clone()).unwrap())
                .unwrap();
        assert_eq!(parsed.build_number, 5);
        assert_eq!(parsed.timestamp.as_deref(), Some("20240309.140507"));
        assert_eq!(parsed.snapshot_versions.len(), 2);

        let artifact_meta = plan.uploads.iter().rev().nth(3).unwrap();
        let parsed =
            ArtifactMetadata::parse(&String::from_utf8(artifact_meta.data.clone()).unwrap())
                .unwrap();
        assert_eq!(parsed.versions, vec!["1.0", "1.1-SNAPSHOT"]);
        assert_eq!(parsed.latest.as_deref(), Some("1.1-SNAPSHOT"));
        assert_eq!(parsed.release.as_deref(), Some("1.0"));
    }

    #[test]
    fn first_snapshot_starts_at_build_one() {
        let publication = Publication::new("g", "app", "0.1-SNAPSHOT").unwrap();
        let repos = repos();
        let repo = repos.select(&publication.version).unwrap();

        let plan =
            assemble(&publication, repo, &[main_jar()], RemoteState::default(), now()).unwrap();

        assert_eq!(plan.file_version, "0.1-20240309.140507-1");
    }
}
