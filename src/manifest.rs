//! Access to the package manifest (`package.json`)
//!
//! The manifest is only read here. The new version is written back by
//! `npm version`, which also keeps the lockfile in sync.

use crate::domain::is_dev_version;
use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of the version a release starts from
pub trait ManifestSource {
    /// Version string currently recorded in the manifest.
    fn current_version(&self) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: Option<String>,
}

/// `package.json` on disk
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
}

impl PackageManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PackageManifest { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for PackageManifest {
    fn current_version(&self) -> Result<String> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ReleaseError::manifest(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        let package: PackageJson = serde_json::from_str(&raw).map_err(|e| {
            ReleaseError::manifest(format!("Cannot parse {}: {}", self.path.display(), e))
        })?;

        package.version.ok_or_else(|| {
            ReleaseError::manifest(format!("{} has no \"version\" field", self.path.display()))
        })
    }
}

/// Fixed version, for driving workflows without a file
#[derive(Debug, Clone)]
pub struct StaticManifest(pub String);

impl ManifestSource for StaticManifest {
    fn current_version(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Reject a manifest that still carries a dev build version.
///
/// Used as a merge guard so dev versions never reach the mainline.
pub fn verify_not_dev(manifest: &dyn ManifestSource) -> Result<String> {
    let version = manifest.current_version()?;
    if is_dev_version(&version) {
        return Err(ReleaseError::DevVersionInManifest(version));
    }
    Ok(version)
}
