//! Release channels and the prerelease suffixes they produce
//!
//! - dev: `-dev.<qualifier>` where the qualifier is a timestamp or short commit hash
//! - beta: `-beta.<n>`
//! - stable: always restarts at `-beta.0` on the newly bumped version

use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release channel selecting the prerelease shape and npm dist-tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Dev,
    Beta,
    Stable,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Dev => "dev",
            Channel::Beta => "beta",
            Channel::Stable => "stable",
        }
    }

    /// npm dist-tag used when nothing is configured
    pub fn default_dist_tag(&self) -> &'static str {
        match self {
            Channel::Dev => "dev",
            Channel::Beta => "beta",
            Channel::Stable => "latest",
        }
    }

    /// Verb used in the release commit message.
    pub fn commit_verb(&self) -> &'static str {
        match self {
            Channel::Dev => "Publish",
            Channel::Beta | Channel::Stable => "Release",
        }
    }
}

impl FromStr for Channel {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Channel::Dev),
            "beta" => Ok(Channel::Beta),
            "stable" | "main" => Ok(Channel::Stable),
            _ => Err(ReleaseError::InvalidChannel(s.to_string())),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Prerelease identifiers this tool writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreRelease {
    /// `dev.<qualifier>`
    Dev(String),
    /// `beta.<iteration>`
    Beta(u64),
}

impl PreRelease {
    /// Recognise a prerelease previously written for `channel`.
    ///
    /// Returns `None` when the raw prerelease belongs to another channel or
    /// is not one of ours. Stable never matches: it always starts over.
    pub fn detect(channel: Channel, raw: &str) -> Option<Self> {
        match channel {
            Channel::Dev => raw
                .strip_prefix("dev.")
                .filter(|q| !q.is_empty())
                .map(|q| PreRelease::Dev(q.to_string())),
            Channel::Beta => raw
                .strip_prefix("beta.")
                .and_then(|n| n.parse::<u64>().ok())
                .map(PreRelease::Beta),
            Channel::Stable => None,
        }
    }

    /// Next beta iteration. Anything that is not a beta restarts at `beta.0`.
    pub fn next_beta(&self) -> Result<Self> {
        match self {
            PreRelease::Beta(n) => n.checked_add(1).map(PreRelease::Beta).ok_or_else(|| {
                ReleaseError::InvalidVersionFormat(format!("-beta.{} cannot be incremented", n))
            }),
            PreRelease::Dev(_) => Ok(PreRelease::Beta(0)),
        }
    }

    /// Convert into a semver prerelease, validating identifier syntax.
    pub fn to_semver(&self) -> Result<semver::Prerelease> {
        let raw = self.to_string();
        semver::Prerelease::new(&raw)
            .map_err(|e| ReleaseError::InvalidVersionFormat(format!("-{} ({})", raw, e)))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Dev(qualifier) => write!(f, "dev.{}", qualifier),
            PreRelease::Beta(n) => write!(f, "beta.{}", n),
        }
    }
}

/// True when a manifest version still carries a dev build marker.
///
/// Both the current `-dev.` form and the older `.dev-` form are recognised.
pub fn is_dev_version(version: &str) -> bool {
    version.contains("-dev.") || version.contains(".dev-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!(Channel::from_str("dev").unwrap(), Channel::Dev);
        assert_eq!(Channel::from_str("BETA").unwrap(), Channel::Beta);
        assert_eq!(Channel::from_str("main").unwrap(), Channel::Stable);
        assert_eq!(Channel::from_str("Main").unwrap(), Channel::Stable);
        assert_eq!(Channel::from_str("stable").unwrap(), Channel::Stable);
        assert!(matches!(
            Channel::from_str("nightly"),
            Err(ReleaseError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_channel_dist_tags() {
        assert_eq!(Channel::Dev.default_dist_tag(), "dev");
        assert_eq!(Channel::Beta.default_dist_tag(), "beta");
        assert_eq!(Channel::Stable.default_dist_tag(), "latest");
    }

    #[test]
    fn test_detect_dev() {
        assert_eq!(
            PreRelease::detect(Channel::Dev, "dev.20240101010101"),
            Some(PreRelease::Dev("20240101010101".to_string()))
        );
        assert_eq!(PreRelease::detect(Channel::Dev, "dev."), None);
        assert_eq!(PreRelease::detect(Channel::Dev, "beta.1"), None);
    }

    #[test]
    fn test_detect_beta() {
        assert_eq!(
            PreRelease::detect(Channel::Beta, "beta.4"),
            Some(PreRelease::Beta(4))
        );
        assert_eq!(PreRelease::detect(Channel::Beta, "beta.x"), None);
        assert_eq!(PreRelease::detect(Channel::Beta, "dev.abc"), None);
    }

    #[test]
    fn test_detect_stable_never_matches() {
        assert_eq!(PreRelease::detect(Channel::Stable, "beta.0"), None);
    }

    #[test]
    fn test_next_beta() {
        assert_eq!(PreRelease::Beta(0).next_beta().unwrap(), PreRelease::Beta(1));
        assert_eq!(
            PreRelease::Dev("a".to_string()).next_beta().unwrap(),
            PreRelease::Beta(0)
        );
    }

    #[test]
    fn test_next_beta_overflow() {
        let err = PreRelease::Beta(u64::MAX).next_beta().unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersionFormat(_)));
    }

    #[test]
    fn test_to_semver_rejects_leading_zero_numeric() {
        assert!(PreRelease::Dev("0123456".to_string()).to_semver().is_err());
        assert!(PreRelease::Dev("0a1b2c3".to_string()).to_semver().is_ok());
    }

    #[test]
    fn test_is_dev_version() {
        assert!(is_dev_version("1.2.0-dev.20240101010101"));
        assert!(is_dev_version("1.2.0.dev-3"));
        assert!(!is_dev_version("1.2.0-beta.0"));
        assert!(!is_dev_version("1.2.0"));
    }
}
