//! Unreleased commit history and bump classification

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::command;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::version::Bump;

/// A commit as classified by the changelog tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangeRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub breaking: bool,
    /// Changelog group label, e.g. `Features` or `Bug Fixes`
    #[serde(default)]
    pub group: Option<String>,
}

impl ChangeRecord {
    pub fn new(group: impl Into<String>) -> Self {
        ChangeRecord {
            group: Some(group.into()),
            ..Default::default()
        }
    }

    pub fn breaking(mut self) -> Self {
        self.breaking = true;
        self
    }
}

/// Source of unreleased commits for a package
pub trait CommitHistory {
    /// Commits touching `package` that are not covered by a release yet
    fn unreleased(&self, package: &str) -> Result<Vec<ChangeRecord>>;
}

/// Classifies the bump a set of unreleased commits requires.
///
/// No commits means no release. A breaking commit means a major bump,
/// regardless of anything else. A commit whose group ends with
/// `feature_suffix` means at least a minor bump. Anything else is a patch.
pub fn classify(commits: &[ChangeRecord], feature_suffix: &str) -> Option<Bump> {
    if commits.is_empty() {
        return None;
    }

    let mut level = Bump::Patch;
    for commit in commits {
        if commit.breaking {
            return Some(Bump::Major);
        }
        if commit
            .group
            .as_deref()
            .is_some_and(|g| g.ends_with(feature_suffix))
        {
            level = level.max(Bump::Minor);
        }
    }
    Some(level)
}

/// Classifies packages by querying a [CommitHistory]
pub struct BumpClassifier<H> {
    history: H,
    feature_suffix: String,
}

impl<H: CommitHistory> BumpClassifier<H> {
    pub fn new(history: H, feature_suffix: impl Into<String>) -> Self {
        BumpClassifier {
            history,
            feature_suffix: feature_suffix.into(),
        }
    }

    /// Bump required by the unreleased commits of `package`, if any
    pub fn classify(&self, package: &str) -> Result<Option<Bump>> {
        let commits = self.history.unreleased(package)?;
        let level = classify(&commits, &self.feature_suffix);
        debug!(package, commits = commits.len(), ?level, "classified");
        Ok(level)
    }
}

#[derive(Debug, Deserialize)]
struct CliffRelease {
    #[serde(default)]
    commits: Vec<ChangeRecord>,
}

/// Unreleased commits from `git cliff --unreleased --context`
#[derive(Debug, Clone)]
pub struct GitCliff {
    root: PathBuf,
    config: ReleaseConfig,
}

impl GitCliff {
    pub fn new(root: &Path, config: ReleaseConfig) -> Self {
        GitCliff {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Parse the release context JSON printed by git-cliff
    pub fn parse(json: &str) -> Result<Vec<ChangeRecord>> {
        let releases: Vec<CliffRelease> = serde_json::from_str(json)?;
        Ok(releases.into_iter().flat_map(|r| r.commits).collect())
    }
}

impl CommitHistory for GitCliff {
    fn unreleased(&self, package: &str) -> Result<Vec<ChangeRecord>> {
        let include_path = self.config.include_path_for(package);
        let output = command::run(
            "git",
            &[
                "cliff",
                "-c",
                &self.config.cliff_config,
                "--include-path",
                &include_path,
                "--unreleased",
                "--context",
            ],
            &self.root,
        )?;
        Self::parse(&output)
    }
}
