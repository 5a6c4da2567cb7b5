//! `maven-metadata.xml` at artifact level (version listing) and at version
//! level (timestamped snapshot builds).

use crate::xml::{walk, XmlDoc};

/// Artifact-level metadata listing published versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub group_id: String,
    pub artifact_id: String,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
}

impl ArtifactMetadata {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            ..Default::default()
        }
    }

    pub fn parse(xml: &str) -> miette::Result<Self> {
        let mut meta = Self::default();
        walk(xml, "maven-metadata.xml", |path, text| {
            let Some(text) = text else { return };
            match path {
                "metadata>groupId" => meta.group_id = text,
                "metadata>artifactId" => meta.artifact_id = text,
                "metadata>versioning>latest" => meta.latest = Some(text),
                "metadata>versioning>release" => meta.release = Some(text),
                "metadata>versioning>lastUpdated" => meta.last_updated = Some(text),
                "metadata>versioning>versions>version" => meta.versions.push(text),
                _ => {}
            }
        })?;
        Ok(meta)
    }

    /// Record a newly published version.
    ///
    /// The version is appended once, `latest` always moves to it and
    /// `release` only moves for non-SNAPSHOT versions.
    pub fn merge_version(&mut self, version: &str, last_updated: &str) {
        if !self.versions.iter().any(|v| v == version) {
            self.versions.push(version.to_string());
        }
        self.latest = Some(version.to_string());
        if !version.ends_with("SNAPSHOT") {
            self.release = Some(version.to_string());
        }
        self.last_updated = Some(last_updated.to_string());
    }

    pub fn render(&self) -> miette::Result<Vec<u8>> {
        let mut doc = XmlDoc::new()?;
        doc.open("metadata")?;
        doc.leaf("groupId", &self.group_id)?;
        doc.leaf("artifactId", &self.artifact_id)?;
        doc.open("versioning")?;
        doc.leaf_opt("latest", self.latest.as_deref())?;
        doc.leaf_opt("release", self.release.as_deref())?;
        doc.open("versions")?;
        for version in &self.versions {
            doc.leaf("version", version)?;
        }
        doc.close("versions")?;
        doc.leaf_opt("lastUpdated", self.last_updated.as_deref())?;
        doc.close("versioning")?;
        doc.close("metadata")?;
        Ok(doc.finish())
    }
}

/// One `<snapshotVersion>` entry: which file a timestamped build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub classifier: Option<String>,
    pub extension: String,
    /// e.g. `1.0-20240101.120000-3`
    pub value: String,
    pub updated: String,
}

impl SnapshotVersion {
    fn empty() -> Self {
        Self {
            classifier: None,
            extension: String::new(),
            value: String::new(),
            updated: String::new(),
        }
    }
}

/// Version-level metadata of a `-SNAPSHOT` version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// `yyyyMMdd.HHmmss` of the latest build.
    pub timestamp: Option<String>,
    pub build_number: u32,
    pub last_updated: Option<String>,
    pub snapshot_versions: Vec<SnapshotVersion>,
}

impl SnapshotMetadata {
    pub fn parse(xml: &str) -> miette::Result<Self> {
        const ENTRY: &str = "metadata>versioning>snapshotVersions>snapshotVersion";

        let mut meta = Self::default();
        let mut entry = SnapshotVersion::empty();

        walk(xml, "snapshot maven-metadata.xml", |path, text| {
            if path == ENTRY {
                meta.snapshot_versions
                    .push(std::mem::replace(&mut entry, SnapshotVersion::empty()));
                return;
            }
            let Some(text) = text else { return };
            if let Some(field) = path.strip_prefix(ENTRY).and_then(|f| f.strip_prefix('>')) {
                match field {
                    "classifier" => entry.classifier = Some(text),
                    "extension" => entry.extension = text,
                    "value" => entry.value = text,
                    "updated" => entry.updated = text,
                    _ => {}
                }
                return;
            }
            match path {
                "metadata>groupId" => meta.group_id = text,
                "metadata>artifactId" => meta.artifact_id = text,
                "metadata>version" => meta.version = text,
                "metadata>versioning>snapshot>timestamp" => meta.timestamp = Some(text),
                "metadata>versioning>snapshot>buildNumber" => {
                    meta.build_number = text.parse().unwrap_or(0);
                }
                "metadata>versioning>lastUpdated" => meta.last_updated = Some(text),
                _ => {}
            }
        })?;

        Ok(meta)
    }

    pub fn render(&self) -> miette::Result<Vec<u8>> {
        let mut doc = XmlDoc::new()?;
        doc.open("metadata")?;
        doc.leaf("groupId", &self.group_id)?;
        doc.leaf("artifactId", &self.artifact_id)?;
        doc.leaf("version", &self.version)?;
        doc.open("versioning")?;
        doc.open("snapshot")?;
        doc.leaf_opt("timestamp", self.timestamp.as_deref())?;
        doc.leaf("buildNumber", &self.build_number.to_string())?;
        doc.close("snapshot")?;
        doc.leaf_opt("lastUpdated", self.last_updated.as_deref())?;
        doc.open("snapshotVersions")?;
        for sv in &self.snapshot_versions {
            doc.open("snapshotVersion")?;
            doc.leaf_opt("classifier", sv.classifier.as_deref())?;
            doc.leaf("extension", &sv.extension)?;
            doc.leaf("value", &sv.value)?;
            doc.leaf("updated", &sv.updated)?;
            doc.close("snapshotVersion")?;
        }
        doc.close("snapshotVersions")?;
        doc.close("versioning")?;
        doc.close("metadata")?;
        Ok(doc.finish())
    }
}
