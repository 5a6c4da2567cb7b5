//! Project types: which image to pull and which command runs the build.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use graven_util::errors::GravenError;

/// Placeholder substituted with the Java version in image templates.
pub const JAVA_PLACEHOLDER: &str = "{java}";

const GRADLE_BUILD: &str =
    "./gradlew --project-cache-dir /tmp/.gradle_cache build --stacktrace --info";
const MAVEN_BUILD: &str = "mvn package";

const TEMURIN_IMAGE: &str = "eclipse-temurin:{java}";
const MAVEN_IMAGE: &str = "maven:3-eclipse-temurin-{java}";

/// How a project is built inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectType {
    name: String,
    cmd: Vec<String>,
    image: String,
}

impl ProjectType {
    /// Gradle wrapper build (`./gradlew build`). The wrapper brings its own
    /// Gradle, so a plain JDK image is enough.
    pub fn gradle() -> Self {
        Self::new("gradle", shell(GRADLE_BUILD), TEMURIN_IMAGE)
    }

    /// Maven build (`mvn package`) on the official Maven image.
    pub fn maven() -> Self {
        Self::new("maven", shell(MAVEN_BUILD), MAVEN_IMAGE)
    }

    /// Arbitrary command run in a plain JDK image.
    pub fn custom(cmd: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: "custom".to_string(),
            cmd: cmd.into_iter().map(Into::into).collect(),
            image: TEMURIN_IMAGE.to_string(),
        }
    }

    fn new(name: &str, cmd: Vec<String>, image: &str) -> Self {
        Self {
            name: name.to_string(),
            cmd,
            image: image.to_string(),
        }
    }

    /// Replace the image template. `{java}` is substituted at build time.
    pub fn with_image(mut self, template: impl Into<String>) -> Self {
        self.image = template.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cmd(&self) -> &[String] {
        &self.cmd
    }

    pub fn image_template(&self) -> &str {
        &self.image
    }

    /// The concrete image reference for `java_version`.
    pub fn image_for(&self, java_version: u32) -> String {
        self.image
            .replace(JAVA_PLACEHOLDER, &java_version.to_string())
    }

    /// Determine the project type from marker files in `base_dir`.
    ///
    /// A regular `gradlew` file means Gradle, a regular `pom.xml` means Maven.
    /// Having both, or neither, is an error.
    pub fn detect(base_dir: &Path) -> miette::Result<Self> {
        let gradlew = base_dir.join("gradlew").is_file();
        let pom = base_dir.join("pom.xml").is_file();
        let shown = graven_util::fs::absolute(base_dir).unwrap_or_else(|_| base_dir.to_path_buf());

        match (gradlew, pom) {
            (true, true) => Err(GravenError::Detection {
                message: format!(
                    "Both gradlew and pom.xml are found in {} (please specify the project type explicitly)",
                    shown.display()
                ),
            }
            .into()),
            (true, false) => Ok(Self::gradle()),
            (false, true) => Ok(Self::maven()),
            (false, false) => Err(GravenError::Detection {
                message: format!(
                    "Neither gradlew nor pom.xml is found in {}",
                    shown.display()
                ),
            }
            .into()),
        }
    }
}

fn shell(script: &str) -> Vec<String> {
    vec!["/bin/bash".to_string(), "-c".to_string(), script.to_string()]
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectType{{name={}, cmd=[{}]}}", self.name, self.cmd.join(", "))
    }
}

impl FromStr for ProjectType {
    type Err = GravenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gradle" => Ok(Self::gradle()),
            "maven" => Ok(Self::maven()),
            other => Err(GravenError::Config {
                message: format!("Unknown project type '{other}' (expected gradle or maven)"),
            }),
        }
    }
}
