//! Domain logic - pure versioning rules independent of git and npm

pub mod prerelease;
pub mod version;

pub use prerelease::{is_dev_version, Channel, PreRelease};
pub use version::{BumpType, ManifestVersion};
