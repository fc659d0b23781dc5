//! Release workflow orchestration
//!
//! One state machine drives every channel:
//!
//! `Idle → Guarded → VersionComputed → Confirmed → Bumped → [ChangelogUpdated]
//! → Committed → Published | RolledBack → Done`, with `Aborted` reachable from
//! the guard and confirmation steps.
//!
//! Channel differences (branch check, changelog review, dist-tag, push) are
//! carried by [WorkflowOptions] rather than separate code paths.

use semver::Version;

use crate::boundary::ReleaseWarning;
use crate::config::{ChangelogDeclinePolicy, Config, PushPolicy};
use crate::domain::{BumpType, Channel};
use crate::error::{ReleaseError, Result};
use crate::guard::GitGuard;
use crate::manifest::{ManifestSource, PackageManifest};
use crate::process::{CommandLine, ProcessRunner, SystemExecutor};
use crate::resolver::{compute_qualifier, Clock, QualifierStrategy, SystemClock, VersionResolver};
use crate::ui::{self, Answer, Prompter, TerminalPrompt};

/// Arguments for the release workflow
///
/// Mirrors the CLI arguments in a form that does not depend on clap, so the
/// workflow can be started programmatically.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseArgs {
    /// Manifest path overriding the configured one
    pub manifest_path: Option<String>,

    pub channel: Channel,

    pub bump: Option<BumpType>,

    /// One-time password for `npm publish`; asked interactively when absent
    pub otp: Option<String>,

    /// Answer yes to every confirmation
    pub assume_yes: bool,

    /// Print mutating commands instead of running them
    pub dry_run: bool,

    /// Stop after the release commit
    pub no_publish: bool,
}

/// Everything one workflow run needs to know, resolved from config and CLI
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowOptions {
    pub channel: Channel,
    pub bump: Option<BumpType>,
    pub qualifier: QualifierStrategy,
    pub auto_revert_on_publish_failure: bool,
    pub require_clean_tree: bool,
    pub require_branch_check: bool,
    pub mainline_branch: String,
    pub remote: String,
    pub verify_npm_auth: bool,
    pub changelog_decline: ChangelogDeclinePolicy,
    /// Changelog file regenerated and reviewed before committing; stable only
    pub changelog: Option<String>,
    /// Files staged in the release commit
    pub release_files: Vec<String>,
    pub push: PushPolicy,
    pub publish: bool,
    pub access: String,
    pub dist_tag: String,
    pub otp: Option<String>,
    pub assume_yes: bool,
}

impl WorkflowOptions {
    /// Resolve channel defaults against the loaded configuration.
    pub fn from_config(config: &Config, channel: Channel, bump: Option<BumpType>) -> Self {
        let stable = channel == Channel::Stable;
        let workflow = &config.workflow;

        WorkflowOptions {
            channel,
            bump,
            qualifier: workflow.qualifier,
            auto_revert_on_publish_failure: workflow.auto_revert_on_publish_failure,
            require_clean_tree: workflow.require_clean_tree,
            require_branch_check: workflow.require_branch_check.unwrap_or(stable),
            mainline_branch: config.git.mainline_branch.clone(),
            remote: config.git.remote.clone(),
            verify_npm_auth: workflow.verify_npm_auth.unwrap_or(stable),
            changelog_decline: workflow.changelog_decline,
            changelog: stable.then(|| config.manifest.changelog.clone()),
            release_files: config.manifest.release_files(channel),
            push: config.push.for_channel(channel),
            publish: !workflow.skip_publish.contains(&channel),
            access: config.npm.access.clone(),
            dist_tag: config.npm.dist_tags.for_channel(channel),
            otp: None,
            assume_yes: false,
        }
    }
}

/// Workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Idle,
    Guarded,
    VersionComputed,
    Confirmed,
    Bumped,
    ChangelogUpdated,
    Committed,
    Published,
    RolledBack,
    Done,
    Aborted,
}

/// The versions involved in one release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseAttempt {
    pub previous_version: String,
    pub new_version: Version,
    pub channel: Channel,
}

impl ReleaseAttempt {
    pub fn tag(&self) -> String {
        format!("v{}", self.new_version)
    }
}

/// How a run ended without error
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Published to the registry
    Published(ReleaseAttempt),
    /// Committed and tagged, publishing left to the operator
    Committed(ReleaseAttempt),
    /// Dry run: every mutating command was printed, none was executed
    Previewed(ReleaseAttempt),
    /// Stopped by the operator before anything irreversible happened
    Aborted { at: ReleaseState, reason: String },
}

/// Sequences guards, version resolution, prompts and commands.
pub struct ReleaseOrchestrator<'a> {
    runner: &'a ProcessRunner,
    prompter: &'a mut dyn Prompter,
    manifest: &'a dyn ManifestSource,
    clock: &'a dyn Clock,
    options: WorkflowOptions,
    history: Vec<ReleaseState>,
}

impl<'a> ReleaseOrchestrator<'a> {
    pub fn new(
        runner: &'a ProcessRunner,
        prompter: &'a mut dyn Prompter,
        manifest: &'a dyn ManifestSource,
        clock: &'a dyn Clock,
        options: WorkflowOptions,
    ) -> Self {
        ReleaseOrchestrator {
            runner,
            prompter,
            manifest,
            clock,
            options,
            history: vec![ReleaseState::Idle],
        }
    }

    /// Current state
    pub fn state(&self) -> ReleaseState {
        self.history
            .last()
            .copied()
            .unwrap_or(ReleaseState::Idle)
    }

    /// Every state visited so far, starting with `Idle`
    pub fn history(&self) -> &[ReleaseState] {
        &self.history
    }

    fn transition(&mut self, next: ReleaseState) {
        self.history.push(next);
    }

    /// Run the workflow to completion.
    ///
    /// # Returns
    /// * `Ok(WorkflowOutcome)` - Published, committed only, previewed, or aborted by the operator
    /// * `Err` - Guard failure, invalid input, a failed command, or `PublishRejected`
    pub fn run(&mut self) -> Result<WorkflowOutcome> {
        if let Err(e) = self.check_guards() {
            self.transition(ReleaseState::Aborted);
            return Err(e);
        }
        self.transition(ReleaseState::Guarded);

        let attempt = match self.compute_version() {
            Ok(attempt) => attempt,
            Err(e) => {
                self.transition(ReleaseState::Aborted);
                return Err(e);
            }
        };
        self.transition(ReleaseState::VersionComputed);

        if self.confirm("Is this version correct?")? == Answer::No {
            return Ok(self.abort("Version rejected, nothing was changed"));
        }
        self.transition(ReleaseState::Confirmed);

        if self.options.verify_npm_auth {
            self.runner
                .run(&CommandLine::new("npm", ["whoami"]).read_only())?;
        }

        self.bump_version(&attempt)?;
        self.transition(ReleaseState::Bumped);

        if let Some(changelog) = self.options.changelog.clone() {
            if !self.update_changelog(&changelog)? {
                return Ok(self.abort("Changelog rejected"));
            }
        }

        let pushed = self.commit(&attempt)?;
        self.transition(ReleaseState::Committed);

        if !self.options.publish {
            if self.runner.is_dry_run() {
                return Ok(self.preview(attempt));
            }
            ui::display_success(&format!(
                "All ready for {} publish. Run 'npm publish --access={} --tag={}'",
                attempt.channel, self.options.access, self.options.dist_tag
            ));
            self.transition(ReleaseState::Done);
            return Ok(WorkflowOutcome::Committed(attempt));
        }

        let otp = self.collect_otp()?;
        match self.publish(&otp) {
            Ok(()) if self.runner.is_dry_run() => Ok(self.preview(attempt)),
            Ok(()) => {
                self.transition(ReleaseState::Published);
                ui::display_success(&format!("🎉 Version {} published!", attempt.new_version));
                self.transition(ReleaseState::Done);
                Ok(WorkflowOutcome::Published(attempt))
            }
            Err(e) => {
                self.roll_back(&attempt, pushed);
                let stderr = match e {
                    ReleaseError::CommandFailed { stderr, .. } => stderr,
                    other => other.to_string(),
                };
                Err(ReleaseError::PublishRejected {
                    version: attempt.new_version.to_string(),
                    stderr,
                })
            }
        }
    }

    fn preview(&mut self, attempt: ReleaseAttempt) -> WorkflowOutcome {
        ui::display_status(&format!(
            "Dry run finished. {} was not committed or published",
            attempt.new_version
        ));
        self.transition(ReleaseState::Done);
        WorkflowOutcome::Previewed(attempt)
    }

    fn check_guards(&self) -> Result<()> {
        let guard = GitGuard::new(self.runner);
        if self.options.require_branch_check {
            guard.check_branch(&self.options.mainline_branch)?;
        }
        if self.options.require_clean_tree {
            guard.check_clean_tree()?;
        }
        Ok(())
    }

    fn compute_version(&self) -> Result<ReleaseAttempt> {
        let channel = self.options.channel;
        let previous_version = self.manifest.current_version()?;

        let qualifier = if channel == Channel::Dev {
            compute_qualifier(self.options.qualifier, self.clock, self.runner)?
        } else {
            String::new()
        };

        if VersionResolver::is_refresh(&previous_version, channel) {
            ui::display_status(&format!("Bumping existing {} version...", channel));
        } else {
            ui::display_status(&format!("Creating a new {} version...", channel));
        }

        let new_version =
            VersionResolver::resolve(&previous_version, self.options.bump, channel, &qualifier)?;

        ui::display_version_change(&previous_version, &new_version.to_string(), channel.name());

        Ok(ReleaseAttempt {
            previous_version,
            new_version,
            channel,
        })
    }

    fn confirm(&mut self, question: &str) -> Result<Answer> {
        if self.options.assume_yes {
            ui::display_status(&format!("{} yes", question));
            return Ok(Answer::Yes);
        }
        self.prompter.confirm(question)
    }

    fn abort(&mut self, reason: &str) -> WorkflowOutcome {
        let at = self.state();
        self.transition(ReleaseState::Aborted);
        ui::display_status(&format!("Okay, aborted. {}", reason));
        WorkflowOutcome::Aborted {
            at,
            reason: reason.to_string(),
        }
    }

    fn bump_version(&self, attempt: &ReleaseAttempt) -> Result<()> {
        let version = attempt.new_version.to_string();
        self.runner
            .run(&CommandLine::new(
                "npm",
                ["version", "--no-git-tag-version", version.as_str()],
            ))
            .map_err(|e| {
                ui::display_manual_instruction(
                    "The manifest may be partially updated. Inspect it and restore it with:",
                    &format!("git checkout -- {}", self.options.release_files.join(" ")),
                );
                e
            })?;
        Ok(())
    }

    /// Regenerate the changelog and let the operator review it.
    ///
    /// Returns `false` when the operator rejects it.
    fn update_changelog(&mut self, changelog: &str) -> Result<bool> {
        ui::display_status("Updating changelog...");
        self.runner
            .run(&CommandLine::new("npx", ["generate-changelog"]))?;
        self.transition(ReleaseState::ChangelogUpdated);

        let question = format!(
            "{} is updated. You may tweak it as needed. Once ready, press Y to continue.",
            changelog
        );
        if self.confirm(&question)? == Answer::Yes {
            return Ok(true);
        }

        let revert = self.changelog_revert_commands(changelog)?;
        match self.options.changelog_decline {
            ChangelogDeclinePolicy::Revert => {
                ui::display_status("Reverting version bump and changelog...");
                for command in &revert {
                    self.runner.run(command)?;
                }
            }
            ChangelogDeclinePolicy::Instruct => {
                let command = revert
                    .iter()
                    .map(CommandLine::to_string)
                    .collect::<Vec<_>>()
                    .join(" && ");
                ui::display_warning(&ReleaseWarning::ManualChangelogRevert { command });
            }
        }
        Ok(false)
    }

    /// Commands undoing the bump and changelog generation.
    ///
    /// Tracked release files are checked out again. A changelog git does not
    /// know yet was created by the generator and is removed instead, since
    /// `git checkout` rejects untracked paths.
    fn changelog_revert_commands(&self, changelog: &str) -> Result<Vec<CommandLine>> {
        let mut ls_files = vec!["ls-files".to_string(), "--".to_string()];
        ls_files.extend(self.options.release_files.iter().cloned());
        let listed = self
            .runner
            .run(&CommandLine::new("git", ls_files).read_only())?;
        let tracked: Vec<&str> = listed.stdout.lines().map(str::trim).collect();

        let (known, unknown): (Vec<String>, Vec<String>) = self
            .options
            .release_files
            .iter()
            .cloned()
            .partition(|file| tracked.contains(&file.as_str()));

        let mut commands = Vec::new();
        if !known.is_empty() {
            let mut checkout = vec!["checkout".to_string(), "--".to_string()];
            checkout.extend(known);
            commands.push(CommandLine::new("git", checkout));
        }
        if unknown.iter().any(|file| file == changelog) {
            commands.push(CommandLine::new("git", ["clean", "-f", "--", changelog]));
        }
        Ok(commands)
    }

    /// Stage, commit, tag and push. Returns whether anything was pushed.
    fn commit(&self, attempt: &ReleaseAttempt) -> Result<bool> {
        ui::display_status("Committing new version...");

        let message = format!("{} {}", attempt.channel.commit_verb(), attempt.new_version);
        let tag = attempt.tag();

        let mut add = vec!["add".to_string()];
        add.extend(self.options.release_files.iter().cloned());

        let mut steps = vec![
            CommandLine::new("git", add),
            CommandLine::new("git", ["commit", "-m", message.as_str()]),
            CommandLine::new("git", ["tag", tag.as_str()]),
        ];
        match self.options.push {
            PushPolicy::None => {}
            PushPolicy::Tags => {
                steps.push(CommandLine::new(
                    "git",
                    ["push", self.options.remote.as_str(), "--tags"],
                ));
            }
            PushPolicy::All => {
                steps.push(CommandLine::new("git", ["push"]));
                steps.push(CommandLine::new(
                    "git",
                    ["push", self.options.remote.as_str(), "--tags"],
                ));
            }
        }

        for step in &steps {
            if let Err(e) = self.runner.run(step) {
                ui::display_manual_instruction(
                    "The release commit is incomplete. Inspect the repository and undo it with:",
                    "git reset HEAD~1",
                );
                return Err(e);
            }
        }

        Ok(self.options.push != PushPolicy::None)
    }

    fn collect_otp(&mut self) -> Result<String> {
        if let Some(otp) = self.options.otp.clone() {
            return Ok(otp);
        }
        if self.runner.is_dry_run() {
            return Ok("<otp>".to_string());
        }
        self.prompter.ask_text("🔐 What is the npm OTP? ")
    }

    fn publish(&self, otp: &str) -> Result<()> {
        ui::display_status("Publishing new version...");
        let access = format!("--access={}", self.options.access);
        let tag = format!("--tag={}", self.options.dist_tag);
        let otp = format!("--otp={}", otp);
        self.runner.run(&CommandLine::new(
            "npm",
            ["publish", access.as_str(), tag.as_str(), otp.as_str()],
        ))?;
        Ok(())
    }

    /// Undo the local release commit after a rejected publish.
    ///
    /// Best effort: a failing revert is reported, never raised. The tag and
    /// anything pushed are left for the operator.
    fn roll_back(&mut self, attempt: &ReleaseAttempt, pushed: bool) {
        self.transition(ReleaseState::RolledBack);
        ui::display_error(&format!("Publishing {} failed", attempt.new_version));

        let reset = CommandLine::new("git", ["reset", "HEAD~1"]);
        if self.options.auto_revert_on_publish_failure {
            ui::display_status("Reverting release commit...");
            if let Err(e) = self.runner.run(&reset) {
                ui::display_warning(&ReleaseWarning::RevertFailed {
                    command: reset.to_string(),
                    reason: e.to_string(),
                });
            }
        } else {
            ui::display_warning(&ReleaseWarning::ManualRevertRequired {
                command: reset.to_string(),
            });
        }

        ui::display_warning(&ReleaseWarning::RemoteStateNotCleaned {
            tag: attempt.tag(),
            pushed,
        });
    }
}

/// Main release workflow
///
/// Wires the real process runner, terminal prompt, manifest file and clock
/// into a [ReleaseOrchestrator] and runs it.
///
/// # Arguments
/// * `args` - Workflow arguments (channel, bump, flags)
/// * `config` - Loaded configuration
pub fn run_release_workflow(args: ReleaseArgs, mut config: Config) -> Result<WorkflowOutcome> {
    if let Some(path) = args.manifest_path {
        config.manifest.path = path;
    }
    let manifest = PackageManifest::new(config.manifest.path.clone());
    let executor = match config.manifest.split_working_dir() {
        Some(dir) => SystemExecutor::in_dir(dir),
        None => SystemExecutor::new(),
    };

    let mut options = WorkflowOptions::from_config(&config, args.channel, args.bump);
    options.otp = args.otp;
    options.assume_yes = args.assume_yes;
    if args.no_publish {
        options.publish = false;
    }

    let runner = ProcessRunner::new(executor).with_dry_run(args.dry_run);
    let mut prompt = TerminalPrompt::stdio();
    let clock = SystemClock;

    let mut orchestrator =
        ReleaseOrchestrator::new(&runner, &mut prompt, &manifest, &clock, options);
    orchestrator.run()
}
