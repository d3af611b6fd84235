//! Pure formatting functions for UI output.
//!
//! Every function here builds a string and never prints, so the layout can
//! be tested. Styling goes through `console`, which drops the escape codes
//! when the output is not a terminal.

use console::style;

use crate::release::{Reason, VersionChange};

/// Error banner: red cross, red ` Error ` badge, then the message
pub fn format_error_banner(message: &str) -> String {
    format!(
        "{} {} {}",
        style("✘").red(),
        style(" Error ").white().on_red(),
        message
    )
}

/// Lines printed when a commit message is rejected
pub fn format_rejection(message: &str) -> Vec<String> {
    vec![
        format_error_banner(message),
        String::new(),
        "   Commit rejected.".to_string(),
        String::new(),
    ]
}

/// One line of the release summary
pub fn format_change(change: &VersionChange) -> String {
    let reason = match change.reason {
        Reason::Direct => style(change.reason.to_string()).green(),
        Reason::Dependent => style(change.reason.to_string()).yellow(),
    };
    format!(
        "  {}: {} -> {} ({}, {})",
        style(&change.package).bold(),
        change.from,
        style(&change.to).green(),
        change.level,
        reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Bump;

    #[test]
    fn test_error_banner_contains_message() {
        let line = console::strip_ansi_codes(&format_error_banner("Invalid scope: nope")).to_string();
        assert_eq!(line, "✘  Error  Invalid scope: nope");
    }

    #[test]
    fn test_rejection_layout() {
        let lines = format_rejection("Invalid type: feat");
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Invalid type: feat"));
        assert_eq!(lines[2], "   Commit rejected.");
    }

    #[test]
    fn test_format_change() {
        let change = VersionChange {
            package: "zrx-graph".to_string(),
            from: "0.3.1".to_string(),
            to: "0.4.0".to_string(),
            level: Bump::Minor,
            reason: Reason::Dependent,
        };
        let line = console::strip_ansi_codes(&format_change(&change)).to_string();
        assert_eq!(line, "  zrx-graph: 0.3.1 -> 0.4.0 (minor, dependent)");
    }
}
