//! Versiones semánticas y tags de versión de componentes.

mod semver;
mod tag;

pub use semver::Version;
pub use tag::VersionTag;
