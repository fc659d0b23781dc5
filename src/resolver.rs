use crate::domain::{BumpType, Channel, ManifestVersion, PreRelease};
use crate::error::{ReleaseError, Result};
use crate::process::{CommandLine, ProcessRunner};
use chrono::{Local, NaiveDateTime};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Where the variable part of a dev version comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QualifierStrategy {
    /// Local time as `YYYYMMDDHHMMSS`
    #[default]
    Timestamp,
    /// Short hash of HEAD's parent commit
    CommitHash,
}

/// Time source for timestamp qualifiers
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Format an instant as a 14 digit `YYYYMMDDHHMMSS` qualifier.
pub fn timestamp_qualifier(at: NaiveDateTime) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Produce the qualifier for a dev version using the given strategy.
///
/// The commit hash strategy asks git for `HEAD^`, so it needs a repository
/// with at least two commits.
pub fn compute_qualifier(
    strategy: QualifierStrategy,
    clock: &dyn Clock,
    runner: &ProcessRunner,
) -> Result<String> {
    match strategy {
        QualifierStrategy::Timestamp => Ok(timestamp_qualifier(clock.now())),
        QualifierStrategy::CommitHash => {
            let command = CommandLine::new("git", ["rev-parse", "--short", "HEAD^"]).read_only();
            let output = runner.run(&command)?;
            let hash = output.stdout.trim();
            if hash.is_empty() {
                return Err(ReleaseError::command_failed(
                    command.to_string(),
                    "empty commit hash",
                ));
            }
            Ok(hash.to_string())
        }
    }
}

/// Computes the next version for a channel
pub struct VersionResolver;

impl VersionResolver {
    /// Compute the version to release.
    ///
    /// - dev: an existing `-dev.` version only gets a fresh qualifier;
    ///   otherwise the release triple is bumped and `-dev.<qualifier>` appended
    /// - beta: an existing `-beta.<n>` becomes `-beta.<n+1>`; otherwise bump
    ///   and start at `-beta.0`
    /// - stable: always bump and restart at `-beta.0`
    ///
    /// # Arguments
    /// * `current` - Version string from the manifest
    /// * `bump` - Requested bump, required unless a refresh applies
    /// * `channel` - Target channel
    /// * `qualifier` - Dev qualifier (timestamp or short hash); unused for beta/stable
    ///
    /// # Returns
    /// * `Ok(Version)` - The new version
    /// * `Err(InvalidVersionFormat)` - Unparsable current version or invalid qualifier
    /// * `Err(MissingBumpType)` - No bump given and nothing to refresh
    pub fn resolve(
        current: &str,
        bump: Option<BumpType>,
        channel: Channel,
        qualifier: &str,
    ) -> Result<Version> {
        let parsed = ManifestVersion::parse(current)?;
        let existing = parsed
            .prerelease
            .as_deref()
            .and_then(|raw| PreRelease::detect(channel, raw));

        let (base, prerelease) = match (channel, existing) {
            (Channel::Dev, Some(PreRelease::Dev(_))) => {
                (parsed.base, PreRelease::Dev(qualifier.to_string()))
            }
            (Channel::Beta, Some(beta @ PreRelease::Beta(_))) => {
                let next = beta.next_beta()?;
                (parsed.base, next)
            }
            (Channel::Dev, _) => {
                let bump = bump.ok_or(ReleaseError::MissingBumpType)?;
                (bump.apply(&parsed.base), PreRelease::Dev(qualifier.to_string()))
            }
            (Channel::Beta, _) | (Channel::Stable, _) => {
                let bump = bump.ok_or(ReleaseError::MissingBumpType)?;
                (bump.apply(&parsed.base), PreRelease::Beta(0))
            }
        };

        let mut version = base;
        version.pre = prerelease.to_semver()?;
        Ok(version)
    }

    /// True when `resolve` would only refresh the prerelease of `current`.
    pub fn is_refresh(current: &str, channel: Channel) -> bool {
        ManifestVersion::parse(current)
            .ok()
            .and_then(|parsed| parsed.prerelease)
            .and_then(|raw| PreRelease::detect(channel, &raw))
            .is_some()
    }
}
