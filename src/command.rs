use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{RepoToolsError, Result};

/// Runs an external tool in `cwd` and returns its standard output.
///
/// A non-zero exit is an error carrying the tool's standard error.
pub fn run(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    debug!(command = %command_line, cwd = %cwd.display(), "running");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| RepoToolsError::command(&command_line, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RepoToolsError::command(
            &command_line,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
