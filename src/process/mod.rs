//! External command execution
//!
//! Every git and npm invocation goes through [ProcessRunner], which logs the
//! command line, delegates the actual spawn to a [CommandExecutor] and turns
//! non-zero exits into [ReleaseError::CommandFailed].
//!
//! The executor is a trait so workflows can be driven without spawning
//! anything:
//!
//! - [system::SystemExecutor]: runs the program with `std::process::Command`
//! - [mock::ScriptedExecutor]: replays canned results and records every call

pub mod mock;
pub mod system;

pub use mock::ScriptedExecutor;
pub use system::SystemExecutor;

use crate::boundary::ReleaseWarning;
use crate::error::{ReleaseError, Result};
use crate::ui;
use std::fmt;

/// A program invocation with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Whether the command changes the repository, manifest or registry
    pub mutating: bool,
}

impl CommandLine {
    /// Create a mutating command.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            mutating: true,
        }
    }

    /// Mark the command as a query that is safe to run in dry-run mode.
    pub fn read_only(mut self) -> Self {
        self.mutating = false;
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
}

impl CommandResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        CommandResult {
            stdout: stdout.into(),
            stderr: String::new(),
            status: Some(0),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        CommandResult {
            stdout: String::new(),
            stderr: stderr.into(),
            status: Some(code),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Spawns a command and waits for it to finish
pub trait CommandExecutor {
    /// Run the command to completion.
    ///
    /// # Returns
    /// * `Ok(CommandResult)` - The process ran, whatever its exit status
    /// * `Err` - The process could not be started
    fn execute(&self, command: &CommandLine) -> std::io::Result<CommandResult>;
}

/// Logs, executes and checks external commands.
pub struct ProcessRunner {
    executor: Box<dyn CommandExecutor>,
    dry_run: bool,
}

impl ProcessRunner {
    pub fn new(executor: impl CommandExecutor + 'static) -> Self {
        ProcessRunner {
            executor: Box::new(executor),
            dry_run: false,
        }
    }

    /// Skip mutating commands, printing them instead.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a command, failing on spawn errors and non-zero exits.
    ///
    /// Output on stderr from a successful command is reported as a warning
    /// and does not fail the call.
    pub fn run(&self, command: &CommandLine) -> Result<CommandResult> {
        if self.dry_run && command.mutating {
            ui::display_dry_run_command(&command.to_string());
            return Ok(CommandResult::success(""));
        }

        let rendered = command.to_string();
        ui::display_command(&rendered);

        let result = self
            .executor
            .execute(command)
            .map_err(|e| ReleaseError::command_failed(&rendered, e.to_string()))?;

        if !result.is_success() {
            let stderr = if result.stderr.trim().is_empty() {
                result.stdout.trim().to_string()
            } else {
                result.stderr.trim().to_string()
            };
            return Err(ReleaseError::command_failed(rendered, stderr));
        }

        if !result.stderr.trim().is_empty() {
            ui::display_warning(&ReleaseWarning::CommandStderr {
                command: rendered,
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(result)
    }
}
