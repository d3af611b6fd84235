use std::process::ExitCode;

use clap::Parser;
use repo_tools::cli::{self, ReleaseArgs};
use repo_tools::ui;

fn main() -> ExitCode {
    cli::init_tracing();

    let args = ReleaseArgs::parse();
    match cli::release::run(args) {
        Ok(code) => code,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
