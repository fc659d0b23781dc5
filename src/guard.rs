use crate::error::{ReleaseError, Result};
use crate::process::{CommandLine, ProcessRunner};

/// Repository checks run once before anything is mutated
pub struct GitGuard<'a> {
    runner: &'a ProcessRunner,
}

impl<'a> GitGuard<'a> {
    pub fn new(runner: &'a ProcessRunner) -> Self {
        GitGuard { runner }
    }

    /// Fail with `DirtyWorkingTree` when `git status --porcelain` reports anything.
    pub fn check_clean_tree(&self) -> Result<()> {
        let status = self
            .runner
            .run(&CommandLine::new("git", ["status", "--porcelain"]).read_only())?;

        let changes = status.stdout.trim_end();
        if !changes.trim().is_empty() {
            return Err(ReleaseError::DirtyWorkingTree {
                status: changes.to_string(),
            });
        }
        Ok(())
    }

    /// Fail with `WrongBranch` unless the checked out branch is `expected`.
    pub fn check_branch(&self, expected: &str) -> Result<()> {
        let actual = self.current_branch()?;
        if actual != expected {
            return Err(ReleaseError::WrongBranch {
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Name of the checked out branch, empty on a detached HEAD.
    pub fn current_branch(&self) -> Result<String> {
        let output = self
            .runner
            .run(&CommandLine::new("git", ["branch", "--show-current"]).read_only())?;
        Ok(output.stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandResult, ScriptedExecutor};

    #[test]
    fn test_clean_tree_passes() {
        let exec = ScriptedExecutor::new();
        exec.respond("git status --porcelain", CommandResult::success("\n"));
        let runner = ProcessRunner::new(exec);

        assert!(GitGuard::new(&runner).check_clean_tree().is_ok());
    }

    #[test]
    fn test_dirty_tree_rejected() {
        let exec = ScriptedExecutor::new();
        exec.respond("git status --porcelain", CommandResult::success(" M file.txt\n"));
        let runner = ProcessRunner::new(exec);

        match GitGuard::new(&runner).check_clean_tree() {
            Err(ReleaseError::DirtyWorkingTree { status }) => assert_eq!(status, " M file.txt"),
            other => panic!("expected DirtyWorkingTree, got {:?}", other),
        }
    }

    #[test]
    fn test_branch_matches() {
        let exec = ScriptedExecutor::new();
        exec.respond("git branch --show-current", CommandResult::success("main\n"));
        let runner = ProcessRunner::new(exec);

        assert!(GitGuard::new(&runner).check_branch("main").is_ok());
    }

    #[test]
    fn test_wrong_branch_rejected() {
        let exec = ScriptedExecutor::new();
        exec.respond(
            "git branch --show-current",
            CommandResult::success("feature/login\n"),
        );
        let runner = ProcessRunner::new(exec);

        match GitGuard::new(&runner).check_branch("main") {
            Err(ReleaseError::WrongBranch { expected, actual }) => {
                assert_eq!(expected, "main");
                assert_eq!(actual, "feature/login");
            }
            other => panic!("expected WrongBranch, got {:?}", other),
        }
    }

    #[test]
    fn test_detached_head_is_wrong_branch() {
        let exec = ScriptedExecutor::new();
        exec.respond("git branch --show-current", CommandResult::success(""));
        let runner = ProcessRunner::new(exec);

        assert!(matches!(
            GitGuard::new(&runner).check_branch("main"),
            Err(ReleaseError::WrongBranch { .. })
        ));
    }
}
