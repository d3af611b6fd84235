use crate::error::Result;
use crate::git::Repository;

/// Mock repository for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    staged: Vec<String>,
    dirty: bool,
}

impl MockRepository {
    /// Create a new clean mock repository with nothing staged
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file path
    pub fn stage(&mut self, path: impl Into<String>) {
        self.staged.push(path.into());
    }

    /// Builder form of [MockRepository::stage]
    pub fn with_staged<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.staged.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Mark the working tree as having uncommitted changes
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}

impl Repository for MockRepository {
    fn staged_files(&self) -> Result<Vec<String>> {
        Ok(self.staged.clone())
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.dirty || !self.staged.is_empty())
    }
}
