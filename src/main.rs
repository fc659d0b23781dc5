use anyhow::Result;
use clap::Parser;

use npm_release::cli::{run_release_workflow, ReleaseArgs, WorkflowOutcome};
use npm_release::config;
use npm_release::domain::{BumpType, Channel};
use npm_release::manifest::{self, PackageManifest};
use npm_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "npm-release",
    about = "Bump, tag and publish npm packages on dev, beta and stable channels"
)]
struct Args {
    #[arg(help = "Version bump: patch, minor or major")]
    bump: Option<String>,

    #[arg(long, default_value = "dev", help = "Release channel: dev, beta or stable")]
    channel: String,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Path to package.json")]
    manifest: Option<String>,

    #[arg(long, help = "npm one-time password (asked interactively when omitted)")]
    otp: Option<String>,

    #[arg(short, long, help = "Answer yes to every confirmation")]
    yes: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Stop after the release commit and tag")]
    no_publish: bool,

    #[arg(
        long,
        help = "Fail if the manifest still carries a dev version, then exit"
    )]
    verify_manifest: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("npm-release {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    if args.verify_manifest {
        let path = args
            .manifest
            .clone()
            .unwrap_or_else(|| config.manifest.path.clone());
        match manifest::verify_not_dev(&PackageManifest::new(path)) {
            Ok(version) => {
                ui::display_success(&format!("Package version {} is valid. Continuing...", version));
                return Ok(());
            }
            Err(e) => {
                ui::display_error(&format!("This PR cannot be merged. {}", e));
                std::process::exit(1);
            }
        }
    }

    let channel: Channel = match args.channel.parse() {
        Ok(channel) => channel,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let bump = match args.bump.as_deref().map(str::parse::<BumpType>).transpose() {
        Ok(bump) => bump,
        Err(e) => {
            ui::display_error(&format!(
                "{}. Make sure to run the script through package.json.",
                e
            ));
            std::process::exit(1);
        }
    };

    let release_args = ReleaseArgs {
        manifest_path: args.manifest,
        channel,
        bump,
        otp: args.otp,
        assume_yes: args.yes,
        dry_run: args.dry_run,
        no_publish: args.no_publish,
    };

    match run_release_workflow(release_args, config) {
        Ok(WorkflowOutcome::Published(attempt)) => {
            println!(
                "\n{} Released {} on channel {}\n",
                console::style("✓").green(),
                attempt.new_version,
                attempt.channel
            );
            Ok(())
        }
        Ok(WorkflowOutcome::Committed(attempt)) => {
            println!(
                "\n{} Committed and tagged {} (not published)\n",
                console::style("✓").green(),
                attempt.tag()
            );
            Ok(())
        }
        Ok(WorkflowOutcome::Previewed(attempt)) => {
            println!(
                "\n{} Dry run of {} on channel {} complete, nothing was changed\n",
                console::style("✓").green(),
                attempt.new_version,
                attempt.channel
            );
            Ok(())
        }
        Ok(WorkflowOutcome::Aborted { .. }) => Ok(()),
        Err(e) => {
            if e.is_guard_failure() {
                ui::display_error(&format!("{} Nothing was changed.", e));
            } else {
                ui::display_error(&e.to_string());
            }
            std::process::exit(1);
        }
    }
}
