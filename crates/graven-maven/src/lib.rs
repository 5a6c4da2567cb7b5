//! Publishing build artifacts to Maven repositories: repository layout,
//! snapshot/release routing, `maven-metadata.xml`, POM generation, checksum
//! sidecars, and authenticated uploads.

pub mod checksum;
pub mod metadata;
pub mod pom;
pub mod publish;
pub mod repository;
pub mod transport;

mod xml;
