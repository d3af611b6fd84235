//! Release helper entry point

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::config;
use crate::error::RepoToolsError;
use crate::git::Git2Repository;
use crate::history::{BumpClassifier, GitCliff};
use crate::manifest::{CargoManifestWriter, RecordingSetter};
use crate::metadata::CargoMetadata;
use crate::release;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "release-bump",
    about = "Bump versions of changed workspace packages and their dependents"
)]
pub struct ReleaseArgs {
    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(long, help = "Compute and print new versions without writing manifests")]
    pub dry_run: bool,
}

/// Run the release helper in the current directory.
///
/// A dirty working tree prints an abort message and yields exit code 1
/// before any manifest is read or written.
pub fn run(args: ReleaseArgs) -> Result<ExitCode> {
    let config = config::load_config(args.config.as_deref())?;
    let root = Path::new(".");

    let repo = Git2Repository::open(root)?;
    let metadata = CargoMetadata::new(root);
    let classifier = BumpClassifier::new(
        GitCliff::new(root, config.release.clone()),
        config.release.feature_group_suffix.clone(),
    );

    let result = if args.dry_run {
        release::run(&repo, &metadata, &classifier, |_| RecordingSetter::new())
    } else {
        release::run(&repo, &metadata, &classifier, |graph| {
            CargoManifestWriter::new(root, graph.manifests.clone())
        })
    };

    match result {
        Ok(plan) => {
            ui::display_release_plan(&plan, args.dry_run);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ RepoToolsError::UncommittedChanges) => {
            println!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
