//! Maven repository abstraction: URL layout and credentials.

use reqwest::RequestBuilder;

/// Name of the metadata file at artifact and version level.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// A deploy target with optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl MavenRepository {
    pub fn new(name: impl Into<String>, url: &str) -> Self {
        Self {
            name: name.into(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        }
    }

    /// Attach credentials. Empty strings count as absent.
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username.filter(|u| !u.is_empty());
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    /// Standard Maven layout path for a given coordinate.
    ///
    /// `net.azisaba:gravenbuilder:1.0` becomes `net/azisaba/gravenbuilder/1.0`
    pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
        format!("{}/{artifact}/{version}", group.replace('.', "/"))
    }

    /// Full URL to a file inside a version directory.
    pub fn file_url(&self, group: &str, artifact: &str, version: &str, filename: &str) -> String {
        format!(
            "{}/{}/{filename}",
            self.url,
            Self::coordinate_path(group, artifact, version)
        )
    }

    /// Artifact-level `maven-metadata.xml` (version listing).
    pub fn metadata_url(&self, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{artifact}/{METADATA_FILE}",
            self.url,
            group.replace('.', "/")
        )
    }

    /// Version-level `maven-metadata.xml` (snapshot build numbers).
    pub fn version_metadata_url(&self, group: &str, artifact: &str, version: &str) -> String {
        self.file_url(group, artifact, version, METADATA_FILE)
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// Add credentials to a request: basic auth when a username is set,
    /// bearer auth when only a password (token) is set.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.username, &self.password) {
            (Some(user), pass) => request.basic_auth(user, pass.as_deref()),
            (None, Some(token)) => request.bearer_auth(token),
            (None, None) => request,
        }
    }
}
