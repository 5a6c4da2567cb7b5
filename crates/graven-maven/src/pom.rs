//! Minimal POM generated for published artifacts.

use crate::publish::Publication;
use crate::xml::XmlDoc;

const POM_NS: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_XSD: &str = "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";

/// Render a POM declaring only coordinates and `jar` packaging. No
/// dependencies are listed.
pub fn render(publication: &Publication) -> miette::Result<Vec<u8>> {
    let mut doc = XmlDoc::new()?;
    doc.open_with(
        "project",
        &[
            ("xmlns", POM_NS),
            ("xmlns:xsi", XSI_NS),
            ("xsi:schemaLocation", POM_XSD),
        ],
    )?;
    doc.leaf("modelVersion", "4.0.0")?;
    doc.leaf("groupId", &publication.group)?;
    doc.leaf("artifactId", &publication.artifact)?;
    doc.leaf("version", &publication.version)?;
    doc.leaf("packaging", "jar")?;
    doc.close("project")?;
    Ok(doc.finish())
}
