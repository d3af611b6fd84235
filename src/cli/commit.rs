//! Commit message linter entry point

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::config::{self, CommitConfig};
use crate::git::{Git2Repository, Repository};
use crate::message::{self, Message};
use crate::scope;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "commit-lint",
    about = "Validate a commit message against <scope>:<type> - <description>"
)]
pub struct CommitArgs {
    #[arg(help = "Commit message, or path to a file containing it")]
    pub message: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<String>,
}

/// Read the commit message from a file if `arg` names one, else use it
/// verbatim.
pub fn read_message(arg: &str) -> std::io::Result<String> {
    let path = Path::new(arg);
    let raw = if path.is_file() {
        fs::read_to_string(path)?
    } else {
        arg.to_string()
    };
    Ok(message::clean(&raw))
}

/// Parse and validate `raw` against the scopes of the repository at `root`.
pub fn lint<R>(raw: &str, root: &Path, config: &CommitConfig, repo: &R) -> crate::Result<Message>
where
    R: Repository + ?Sized,
{
    let scopes = scope::resolve_scopes(root, &config.workspace_scope)?;
    debug!(scopes = ?scopes.keys().collect::<Vec<_>>(), "resolved scopes");

    let msg = Message::parse(raw)?;
    msg.validate(&scopes, repo)?;
    Ok(msg)
}

/// Run the linter. Success is silent; a rejected message prints the
/// rejection banner and yields exit code 1.
pub fn run(args: CommitArgs) -> Result<ExitCode> {
    let Some(arg) = args.message else {
        println!("No commit message provided.");
        return Ok(ExitCode::FAILURE);
    };

    let config = config::load_config(args.config.as_deref())?;
    let raw = read_message(&arg)?;
    let root = Path::new(".");
    let repo = Git2Repository::open(root)?;

    match lint(&raw, root, &config.commit, &repo) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_rejection() => {
            ui::display_rejection(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
