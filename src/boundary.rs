use std::fmt;

/// Non-fatal conditions met while releasing.
/// These are reported to the operator but do not stop the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// A successful command wrote to stderr
    CommandStderr { command: String, stderr: String },
    /// The compensating `git reset` after a rejected publish failed too
    RevertFailed { command: String, reason: String },
    /// Automatic revert is disabled; the operator has to undo the commit
    ManualRevertRequired { command: String },
    /// The tag (and possibly pushed refs) survive a rolled back publish
    RemoteStateNotCleaned { tag: String, pushed: bool },
    /// The changelog review was declined and changes must be reverted by hand
    ManualChangelogRevert { command: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::CommandStderr { command, stderr } => {
                write!(f, "'{}' wrote to stderr: {}", command, stderr)
            }
            ReleaseWarning::RevertFailed { command, reason } => {
                write!(
                    f,
                    "Could not revert the release commit with '{}': {}",
                    command, reason
                )
            }
            ReleaseWarning::ManualRevertRequired { command } => {
                write!(f, "Revert the release commit manually with '{}'", command)
            }
            ReleaseWarning::RemoteStateNotCleaned { tag, pushed } => {
                if *pushed {
                    write!(
                        f,
                        "Tag '{}' was created and pushed; check the remote and delete it if needed",
                        tag
                    )
                } else {
                    write!(
                        f,
                        "Tag '{}' still exists locally; delete it with 'git tag -d {}' if needed",
                        tag, tag
                    )
                }
            }
            ReleaseWarning::ManualChangelogRevert { command } => {
                write!(f, "Revert the version bump and changelog with '{}'", command)
            }
        }
    }
}
