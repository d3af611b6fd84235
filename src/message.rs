//! Commit message grammar and validation
//!
//! Messages follow `<scope>:<type> - <description>`, a variation of
//! Conventional Commits where the scope comes first:
//!
//! ```text
//! zrx-graph:fix - handle empty topology
//! workspace:docs - update contribution guide
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use tracing::debug;

use crate::error::{RepoToolsError, Result};
use crate::git::Repository;
use crate::scope::{self, ScopeMap};

/// Commit types accepted by the linter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
    Feature,
    Fix,
    Refactor,
    Docs,
    Perf,
    Test,
    Build,
    Style,
    Chore,
    Release,
}

impl CommitType {
    pub const ALL: [CommitType; 10] = [
        CommitType::Feature,
        CommitType::Fix,
        CommitType::Refactor,
        CommitType::Docs,
        CommitType::Perf,
        CommitType::Test,
        CommitType::Build,
        CommitType::Style,
        CommitType::Chore,
        CommitType::Release,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feature => "feature",
            CommitType::Fix => "fix",
            CommitType::Refactor => "refactor",
            CommitType::Docs => "docs",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Style => "style",
            CommitType::Chore => "chore",
            CommitType::Release => "release",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = RepoToolsError;

    fn from_str(s: &str) -> Result<Self> {
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RepoToolsError::r#type(format!("Invalid type: {}", s)))
    }
}

/// Parsed commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub scope: String,
    pub r#type: String,
    pub description: String,
}

impl Message {
    /// Parse a commit message into scope, type and description.
    ///
    /// The scope runs up to the first `:`, the type up to the literal
    /// ` - ` and may not contain whitespace. Nothing is validated beyond
    /// the shape of the message.
    ///
    /// # Errors
    /// Fails with a format error when the message does not match.
    pub fn parse(message: &str) -> Result<Self> {
        let captures = Regex::new(r"^([^:]+):(\S+) - (.+)$")
            .ok()
            .and_then(|re| re.captures(message))
            .ok_or_else(|| {
                RepoToolsError::format("Required format: <scope>:<type> - <description>")
            })?;

        let group = |i: usize| {
            captures
                .get(i)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Ok(Message {
            scope: group(1),
            r#type: group(2),
            description: group(3),
        })
    }

    /// The commit type, if it is one of the known types
    pub fn commit_type(&self) -> Option<CommitType> {
        self.r#type.parse().ok()
    }

    /// Validate the message against known scopes and the staged files.
    ///
    /// Checks, in order: the scope is known, the type is known, the
    /// description is lower-case, and every staged file lies inside the
    /// scope's directory.
    ///
    /// # Errors
    /// Scope, type or value error for the first failed check.
    pub fn validate<R>(&self, scopes: &ScopeMap, repo: &R) -> Result<()>
    where
        R: Repository + ?Sized,
    {
        let directory = scopes
            .get(&self.scope)
            .ok_or_else(|| RepoToolsError::scope(format!("Invalid scope: {}", self.scope)))?;

        self.r#type.parse::<CommitType>()?;

        if self.description != self.description.to_lowercase() {
            return Err(RepoToolsError::value("Commit message must be lowercased."));
        }

        let staged = repo.staged_files()?;
        debug!(scope = %self.scope, count = staged.len(), "checking staged files against scope");
        for file in staged.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
            if !scope::contains(directory, Path::new(file)) {
                return Err(RepoToolsError::value(format!(
                    "Invalid scope for file: {} not in {}",
                    file,
                    directory.display()
                )));
            }
        }

        Ok(())
    }
}

/// Normalise a raw commit message before parsing.
///
/// Git comment lines (starting with `#`) are dropped and surrounding
/// whitespace trimmed.
pub fn clean(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
