use crate::error::{ReleaseError, Result};
use regex::Regex;
use semver::Version;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Version bump requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl BumpType {
    /// Apply the bump to a release triple, resetting lower components.
    ///
    /// Any prerelease or build metadata on `base` is dropped.
    pub fn apply(&self, base: &Version) -> Version {
        match self {
            BumpType::Major => Version::new(base.major + 1, 0, 0),
            BumpType::Minor => Version::new(base.major, base.minor + 1, 0),
            BumpType::Patch => Version::new(base.major, base.minor, base.patch + 1),
        }
    }
}

impl FromStr for BumpType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpType::Major),
            "minor" => Ok(BumpType::Minor),
            "patch" => Ok(BumpType::Patch),
            other => Err(ReleaseError::InvalidBumpType(other.to_string())),
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpType::Major => write!(f, "major"),
            BumpType::Minor => write!(f, "minor"),
            BumpType::Patch => write!(f, "patch"),
        }
    }
}

/// A version string as found in the manifest, split into its release triple
/// and the raw prerelease text.
///
/// The prerelease is kept verbatim: manifests in the wild carry tags that are
/// not valid semver prereleases and the resolver only needs to recognise its
/// own markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestVersion {
    pub base: Version,
    pub prerelease: Option<String>,
}

fn manifest_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-(.+))?$").expect("manifest version pattern compiles")
    })
}

impl ManifestVersion {
    /// Parse `major.minor.patch[-prerelease]`.
    ///
    /// # Returns
    /// * `Ok(ManifestVersion)` - The release triple and optional prerelease
    /// * `Err(InvalidVersionFormat)` - If the string does not match `^\d+\.\d+\.\d+(-.+)?$`
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = manifest_version_pattern()
            .captures(raw)
            .ok_or_else(|| ReleaseError::InvalidVersionFormat(raw.to_string()))?;

        let component = |idx: usize| -> Result<u64> {
            captures[idx]
                .parse::<u64>()
                .map_err(|_| ReleaseError::InvalidVersionFormat(raw.to_string()))
        };

        Ok(ManifestVersion {
            base: Version::new(component(1)?, component(2)?, component(3)?),
            prerelease: captures.get(4).map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for ManifestVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_compiled_once() {
        assert!(std::ptr::eq(
            manifest_version_pattern(),
            manifest_version_pattern()
        ));
    }

    #[test]
    fn test_parse_plain_version() {
        let v = ManifestVersion::parse("1.2.3").unwrap();
        assert_eq!(v.base, Version::new(1, 2, 3));
        assert_eq!(v.prerelease, None);
    }

    #[test]
    fn test_parse_with_prerelease() {
        let v = ManifestVersion::parse("1.3.0-dev.20240101010101").unwrap();
        assert_eq!(v.base, Version::new(1, 3, 0));
        assert_eq!(v.prerelease.as_deref(), Some("dev.20240101010101"));
    }

    #[test]
    fn test_parse_keeps_non_semver_prerelease() {
        let v = ManifestVersion::parse("0.4.1-rc..weird").unwrap();
        assert_eq!(v.prerelease.as_deref(), Some("rc..weird"));
        assert_eq!(v.to_string(), "0.4.1-rc..weird");
    }

    #[test]
    fn test_parse_invalid() {
        for raw in ["1.2", "v1.2.3", "1.2.3.4", "", "1.2.3-", "a.b.c"] {
            assert!(
                matches!(
                    ManifestVersion::parse(raw),
                    Err(ReleaseError::InvalidVersionFormat(_))
                ),
                "expected '{}' to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_bump_major() {
        let bumped = BumpType::Major.apply(&Version::new(1, 2, 3));
        assert_eq!(bumped, Version::new(2, 0, 0));
    }

    #[test]
    fn test_bump_minor_resets_patch() {
        let bumped = BumpType::Minor.apply(&Version::new(1, 2, 3));
        assert_eq!(bumped, Version::new(1, 3, 0));
    }

    #[test]
    fn test_bump_patch_keeps_minor() {
        let bumped = BumpType::Patch.apply(&Version::new(1, 2, 3));
        assert_eq!(bumped, Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_type_from_str() {
        assert_eq!("minor".parse::<BumpType>().unwrap(), BumpType::Minor);
        assert!(matches!(
            "Minor".parse::<BumpType>(),
            Err(ReleaseError::InvalidBumpType(_))
        ));
        assert!("prerelease".parse::<BumpType>().is_err());
    }
}
