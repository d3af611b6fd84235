use crate::error::Result;
use git2::{Delta, DiffDelta, DiffFindOptions, Repository as Git2Repo, StatusOptions};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }
}

/// Deleted files are reported by their old path, everything else (renames
/// included) by the new one.
fn delta_path(delta: &DiffDelta<'_>) -> Option<String> {
    let file = match delta.status() {
        Delta::Deleted => delta.old_file(),
        _ => delta.new_file(),
    };
    file.path()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
}

impl super::Repository for Git2Repository {
    fn staged_files(&self) -> Result<Vec<String>> {
        // An unborn HEAD diffs the index against the empty tree
        let head_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_tree()?),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => return Err(e.into()),
        };

        let index = self.repo.index()?;
        let mut diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        // Pair deletions with additions the way `git diff --cached` does
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let files: Vec<String> = diff.deltas().filter_map(|d| delta_path(&d)).collect();
        debug!(count = files.len(), "staged files");
        Ok(files)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        debug!(count = statuses.len(), "working tree status entries");
        Ok(!statuses.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repo) {
        let temp_dir = TempDir::new().expect("Could not create temp dir");
        let repo = Git2Repo::init(temp_dir.path()).expect("Could not init git repo");
        {
            let mut config = repo.config().expect("Could not get config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (temp_dir, repo)
    }

    fn commit_all(repo: &Git2Repo, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = repo.signature().unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    #[test]
    fn test_staged_files_on_unborn_head() {
        let (dir, repo) = init_repo();
        fs::create_dir_all(dir.path().join("crates/a")).unwrap();
        fs::write(dir.path().join("crates/a/lib.rs"), "").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("crates/a/lib.rs")).unwrap();
        index.write().unwrap();

        let wrapped = Git2Repository::from_git2(repo);
        assert_eq!(wrapped.staged_files().unwrap(), vec!["crates/a/lib.rs"]);
        assert!(wrapped.has_uncommitted_changes().unwrap());
    }

    #[test]
    fn test_clean_tree_after_commit() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        commit_all(&repo, "workspace:docs - add readme");

        let wrapped = Git2Repository::open(dir.path()).unwrap();
        assert!(wrapped.staged_files().unwrap().is_empty());
        assert!(!wrapped.has_uncommitted_changes().unwrap());
    }

    #[test]
    fn test_staged_rename_reports_new_path_only() {
        let (dir, repo) = init_repo();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(
            dir.path().join("a/x.rs"),
            "pub fn visit() {\n    println!(\"visiting\");\n}\n",
        )
        .unwrap();
        commit_all(&repo, "a:feature - add visitor");

        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::rename(dir.path().join("a/x.rs"), dir.path().join("b/x.rs")).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new("a/x.rs")).unwrap();
        index.add_path(Path::new("b/x.rs")).unwrap();
        index.write().unwrap();

        let wrapped = Git2Repository::from_git2(repo);
        assert_eq!(wrapped.staged_files().unwrap(), vec!["b/x.rs"]);
    }

    #[test]
    fn test_staged_deletion_reports_old_path() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        commit_all(&repo, "workspace:docs - add readme");

        fs::remove_file(dir.path().join("README.md")).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new("README.md")).unwrap();
        index.write().unwrap();

        let wrapped = Git2Repository::from_git2(repo);
        assert_eq!(wrapped.staged_files().unwrap(), vec!["README.md"]);
    }

    #[test]
    fn test_untracked_file_is_uncommitted() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("README.md"), "hello\n").unwrap();
        commit_all(&repo, "workspace:docs - add readme");
        fs::write(dir.path().join("notes.txt"), "scratch\n").unwrap();

        let wrapped = Git2Repository::from_git2(repo);
        assert!(wrapped.staged_files().unwrap().is_empty());
        assert!(wrapped.has_uncommitted_changes().unwrap());
    }
}
