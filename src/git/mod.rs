//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only Git
//! queries repo-tools needs, allowing the commit linter and the release
//! helper to run against a real repository or a mock.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! # Usage
//!
//! ```rust
//! # use repo_tools::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> repo_tools::Result<()> {
//! for file in repo.staged_files()? {
//!     println!("staged: {}", file);
//! }
//! if repo.has_uncommitted_changes()? {
//!     println!("working tree is dirty");
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Common git query trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to
/// [crate::error::RepoToolsError] variants.
pub trait Repository {
    /// Get the paths of all files staged for commit
    ///
    /// Paths are relative to the repository root and use `/` separators,
    /// in the same form `git diff --cached --name-only` prints them.
    /// Deleted files are reported under their old path, renamed files under
    /// their new path only.
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Staged paths, possibly empty
    /// * `Err` - If the index or HEAD cannot be read
    fn staged_files(&self) -> Result<Vec<String>>;

    /// Check whether the working tree has uncommitted changes
    ///
    /// Staged, unstaged and untracked (non-ignored) files all count, the
    /// same set `git status --porcelain` reports.
    ///
    /// # Returns
    /// * `Ok(true)` - There is at least one uncommitted change
    /// * `Ok(false)` - The working tree is clean
    /// * `Err` - If the status cannot be computed
    fn has_uncommitted_changes(&self) -> Result<bool>;
}
