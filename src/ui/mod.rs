//! User interface module.
//!
//! - `formatter` - Pure formatting functions
//! - This module - Printing to the terminal

pub mod formatter;

use console::style;

use crate::release::ReleasePlan;

pub use formatter::{format_change, format_error_banner, format_rejection};

/// Print an error banner to stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error_banner(message));
}

/// Print the commit rejection banner to stderr.
pub fn display_rejection(message: &str) {
    for line in format_rejection(message) {
        eprintln!("{}", line);
    }
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print every version change of a release run.
///
/// `dry_run` only changes the heading; the plan is the same.
pub fn display_release_plan(plan: &ReleasePlan, dry_run: bool) {
    if plan.is_empty() {
        display_status("No unreleased changes, nothing to bump.");
        return;
    }

    let heading = if dry_run {
        "Versions that would be set:"
    } else {
        "Versions set:"
    };
    println!("\n{}", style(heading).bold());
    for change in &plan.changes {
        println!("{}", format_change(change));
    }
    println!();
}
