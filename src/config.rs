use crate::domain::Channel;
use crate::error::{ReleaseError, Result};
use crate::resolver::QualifierStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "npmrelease.toml";

/// Represents the complete configuration for npm-release.
///
/// Contains manifest locations, git settings, workflow policies, npm publish
/// options and push behavior per channel.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub npm: NpmConfig,

    #[serde(default)]
    pub push: PushConfig,
}

fn default_manifest_path() -> String {
    "package.json".to_string()
}

fn default_lockfile() -> Option<String> {
    Some("package-lock.json".to_string())
}

fn default_changelog() -> String {
    "CHANGELOG.md".to_string()
}

/// Files touched by a release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: String,

    /// Lockfile staged with the manifest; set to `""` to skip it.
    #[serde(default = "default_lockfile")]
    pub lockfile: Option<String>,

    #[serde(default = "default_changelog")]
    pub changelog: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        ManifestConfig {
            path: default_manifest_path(),
            lockfile: default_lockfile(),
            changelog: default_changelog(),
        }
    }
}

impl ManifestConfig {
    /// Files staged in the release commit for a channel.
    pub fn release_files(&self, channel: Channel) -> Vec<String> {
        let mut files = vec![self.path.clone()];
        if let Some(lockfile) = self.lockfile.as_ref().filter(|l| !l.is_empty()) {
            files.push(lockfile.clone());
        }
        if channel == Channel::Stable {
            files.push(self.changelog.clone());
        }
        files
    }

    /// Split off the directory holding the manifest.
    ///
    /// npm and git run inside that directory, so the manifest path becomes a
    /// bare file name and lockfile/changelog paths under the same directory
    /// are made relative to it. Returns `None` when the manifest already sits
    /// in the current directory.
    pub fn split_working_dir(&mut self) -> Option<PathBuf> {
        let path = Path::new(&self.path);
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty())?.to_path_buf();
        let name = path.file_name()?.to_string_lossy().to_string();

        self.path = name;
        if let Some(lockfile) = self.lockfile.as_mut() {
            *lockfile = relative_to(&dir, lockfile);
        }
        self.changelog = relative_to(&dir, &self.changelog);
        Some(dir)
    }
}

fn relative_to(dir: &Path, file: &str) -> String {
    Path::new(file)
        .strip_prefix(dir)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| file.to_string())
}

fn default_mainline_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_mainline_branch")]
    pub mainline_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            mainline_branch: default_mainline_branch(),
            remote: default_remote(),
        }
    }
}

/// What to do when the operator rejects the generated changelog.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogDeclinePolicy {
    /// Check out the manifest, lockfile and changelog again
    #[default]
    Revert,
    /// Print the revert command and leave the files alone
    Instruct,
}

fn default_true() -> bool {
    true
}

/// Workflow policies.
///
/// `require_branch_check` and `verify_npm_auth` default to on for the stable
/// channel only when left unset.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub qualifier: QualifierStrategy,

    #[serde(default = "default_true")]
    pub auto_revert_on_publish_failure: bool,

    #[serde(default = "default_true")]
    pub require_clean_tree: bool,

    #[serde(default)]
    pub require_branch_check: Option<bool>,

    #[serde(default)]
    pub changelog_decline: ChangelogDeclinePolicy,

    #[serde(default)]
    pub verify_npm_auth: Option<bool>,

    /// Stop after the release commit instead of publishing.
    #[serde(default)]
    pub skip_publish: Vec<Channel>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            qualifier: QualifierStrategy::default(),
            auto_revert_on_publish_failure: true,
            require_clean_tree: true,
            require_branch_check: None,
            changelog_decline: ChangelogDeclinePolicy::default(),
            verify_npm_auth: None,
            skip_publish: Vec::new(),
        }
    }
}

fn default_access() -> String {
    "public".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NpmConfig {
    #[serde(default = "default_access")]
    pub access: String,

    #[serde(default)]
    pub dist_tags: DistTagsConfig,
}

impl Default for NpmConfig {
    fn default() -> Self {
        NpmConfig {
            access: default_access(),
            dist_tags: DistTagsConfig::default(),
        }
    }
}

/// Overrides for the npm dist-tag used per channel.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct DistTagsConfig {
    pub dev: Option<String>,
    pub beta: Option<String>,
    pub stable: Option<String>,
}

impl DistTagsConfig {
    pub fn for_channel(&self, channel: Channel) -> String {
        let configured = match channel {
            Channel::Dev => &self.dev,
            Channel::Beta => &self.beta,
            Channel::Stable => &self.stable,
        };
        configured
            .clone()
            .unwrap_or_else(|| channel.default_dist_tag().to_string())
    }
}

/// What gets pushed after the release commit and tag.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PushPolicy {
    None,
    /// `git push <remote> --tags`
    Tags,
    /// `git push` followed by `git push <remote> --tags`
    All,
}

fn default_dev_push() -> PushPolicy {
    PushPolicy::None
}

fn default_stable_push() -> PushPolicy {
    PushPolicy::Tags
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PushConfig {
    #[serde(default = "default_dev_push")]
    pub dev: PushPolicy,

    #[serde(default = "default_dev_push")]
    pub beta: PushPolicy,

    #[serde(default = "default_stable_push")]
    pub stable: PushPolicy,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            dev: default_dev_push(),
            beta: default_dev_push(),
            stable: default_stable_push(),
        }
    }
}

impl PushConfig {
    pub fn for_channel(&self, channel: Channel) -> PushPolicy {
        match channel {
            Channel::Dev => self.dev,
            Channel::Beta => self.beta,
            Channel::Stable => self.stable,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `npmrelease.toml` in current directory
/// 3. `.npmrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err(Config)` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let (source, config_str) = if let Some(path) = config_path {
        (path.to_string(), read(Path::new(path))?)
    } else if local.exists() {
        (local.display().to_string(), read(&local)?)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_path.exists() {
            (user_path.display().to_string(), read(&user_path)?)
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", source, e)))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ReleaseError::config(format!("Cannot read {}: {}", path.display(), e)))
}
