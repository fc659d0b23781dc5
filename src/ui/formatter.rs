//! Pure formatting functions for terminal output.
//!
//! This module contains all display logic separated from user interaction.

use crate::boundary::ReleaseWarning;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print a command line right before it is executed.
pub fn display_command(command: &str) {
    println!("{} {}", style("Exec:").dim(), style(command).cyan());
}

/// Print a mutating command skipped by dry-run mode.
pub fn display_dry_run_command(command: &str) {
    println!("{} {}", style("Would exec:").dim(), style(command).cyan());
}

/// Display the current and proposed manifest versions.
///
/// # Arguments
/// * `current` - Version read from the manifest
/// * `new` - Version computed for this release
/// * `channel` - Channel name shown next to the new version
pub fn display_version_change(current: &str, new: &str, channel: &str) {
    println!("\n{}", style("Version Change:").bold());
    println!("  Current: {}", style(current).red());
    println!("  New:     {} ({})", style(new).green(), channel);
}

/// Display a command the operator has to run by hand.
pub fn display_manual_instruction(message: &str, command: &str) {
    println!(
        "\n{} {}\n  {}",
        style("→").yellow(),
        message,
        style(command).cyan()
    );
}
