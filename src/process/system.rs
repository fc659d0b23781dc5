use crate::process::{CommandExecutor, CommandLine, CommandResult};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs commands as child processes of this tool
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    working_dir: Option<PathBuf>,
}

impl SystemExecutor {
    pub fn new() -> Self {
        SystemExecutor { working_dir: None }
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        SystemExecutor {
            working_dir: Some(dir.into()),
        }
    }
}

impl CommandExecutor for SystemExecutor {
    fn execute(&self, command: &CommandLine) -> std::io::Result<CommandResult> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::null());

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status.code(),
        })
    }
}
