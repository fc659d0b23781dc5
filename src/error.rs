use thiserror::Error;

/// Unified error type for npm-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid version format: '{0}' - expected X.Y.Z[-prerelease]")]
    InvalidVersionFormat(String),

    #[error("Missing bump type: pass one of patch, minor or major")]
    MissingBumpType,

    #[error("Invalid bump type: '{0}' - expected patch, minor or major")]
    InvalidBumpType(String),

    #[error("Invalid channel: '{0}' - expected dev, beta or stable")]
    InvalidChannel(String),

    #[error("There are uncommitted changes in the working tree. Please commit or revert them and try again.\n{status}")]
    DirtyWorkingTree { status: String },

    #[error("You are at '{actual}' instead of '{expected}' branch")]
    WrongBranch { expected: String, actual: String },

    #[error("Command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Publishing {version} was rejected: {stderr}")]
    PublishRejected { version: String, stderr: String },

    #[error("Manifest version {0} contains a dev prerelease. Please revert to the original version and try again.")]
    DevVersionInManifest(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input closed while waiting for an answer")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in npm-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create a command failure for the given command line
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        ReleaseError::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// True for errors raised before anything was mutated.
    pub fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            ReleaseError::DirtyWorkingTree { .. }
                | ReleaseError::WrongBranch { .. }
                | ReleaseError::InvalidVersionFormat(_)
                | ReleaseError::MissingBumpType
                | ReleaseError::InvalidBumpType(_)
                | ReleaseError::InvalidChannel(_)
        )
    }
}
