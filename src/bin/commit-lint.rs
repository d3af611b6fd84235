use std::process::ExitCode;

use clap::Parser;
use repo_tools::cli::{self, CommitArgs};
use repo_tools::ui;

fn main() -> ExitCode {
    cli::init_tracing();

    let args = CommitArgs::parse();
    match cli::commit::run(args) {
        Ok(code) => code,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
