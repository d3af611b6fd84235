use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for repo-tools operations
#[derive(Error, Debug)]
pub enum RepoToolsError {
    /// Commit message does not match `<scope>:<type> - <description>`
    #[error("{0}")]
    Format(String),

    /// Commit scope is not a known package
    #[error("{0}")]
    Scope(String),

    /// Commit type is not one of the known types
    #[error("{0}")]
    Type(String),

    /// Casing violation, out-of-scope file or malformed version
    #[error("{0}")]
    Value(String),

    #[error("Uncommitted changes detected, aborting release.")]
    UncommittedChanges,

    #[error("Manifest error: {message}{}", located(.path))]
    Manifest {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Convenience type alias for Results in repo-tools
pub type Result<T> = std::result::Result<T, RepoToolsError>;

impl RepoToolsError {
    /// Create a format error with context
    pub fn format(msg: impl Into<String>) -> Self {
        RepoToolsError::Format(msg.into())
    }

    /// Create a scope error with context
    pub fn scope(msg: impl Into<String>) -> Self {
        RepoToolsError::Scope(msg.into())
    }

    /// Create a type error with context
    pub fn r#type(msg: impl Into<String>) -> Self {
        RepoToolsError::Type(msg.into())
    }

    /// Create a value error with context
    pub fn value(msg: impl Into<String>) -> Self {
        RepoToolsError::Value(msg.into())
    }

    /// Create a manifest error, optionally pointing at the offending file
    pub fn manifest(msg: impl Into<String>, path: Option<PathBuf>) -> Self {
        RepoToolsError::Manifest {
            message: msg.into(),
            path,
        }
    }

    /// Create an external command error
    pub fn command(command: impl Into<String>, msg: impl Into<String>) -> Self {
        RepoToolsError::Command {
            command: command.into(),
            message: msg.into(),
        }
    }

    /// Whether this error is a commit message rejection rather than an
    /// environment failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RepoToolsError::Format(_)
                | RepoToolsError::Scope(_)
                | RepoToolsError::Type(_)
                | RepoToolsError::Value(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RepoToolsError::scope("Invalid scope: nope");
        assert_eq!(err.to_string(), "Invalid scope: nope");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RepoToolsError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_uncommitted_changes_message() {
        assert_eq!(
            RepoToolsError::UncommittedChanges.to_string(),
            "Uncommitted changes detected, aborting release."
        );
    }

    #[test]
    fn test_manifest_error_with_path() {
        let err = RepoToolsError::manifest("missing [package]", Some(PathBuf::from("a/Cargo.toml")));
        assert_eq!(
            err.to_string(),
            "Manifest error: missing [package] (a/Cargo.toml)"
        );

        let err = RepoToolsError::manifest("missing [package]", None);
        assert_eq!(err.to_string(), "Manifest error: missing [package]");
    }

    #[test]
    fn test_command_error() {
        let err = RepoToolsError::command("cargo metadata", "exit status 101");
        assert_eq!(
            err.to_string(),
            "Command `cargo metadata` failed: exit status 101"
        );
    }

    #[test]
    fn test_rejection_classification() {
        let rejections = vec![
            RepoToolsError::format("x"),
            RepoToolsError::scope("x"),
            RepoToolsError::r#type("x"),
            RepoToolsError::value("x"),
        ];
        for err in rejections {
            assert!(err.is_rejection(), "{:?} should be a rejection", err);
        }

        assert!(!RepoToolsError::UncommittedChanges.is_rejection());
        assert!(!RepoToolsError::command("git", "boom").is_rejection());
    }
}
