// src/vcs.rs

use crate::error::{MonitorError, Result};
use crate::model::FileStatus;
use git2::{Delta, DiffDelta, DiffOptions, Repository, Status, StatusOptions, Tree};
use std::fs;
use std::path::{Path, PathBuf};

/// One path reported by a snapshot-to-snapshot diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: FileStatus,
}

impl ChangedPath {
    /// The old path when there is one, the new path otherwise
    pub fn path(&self) -> Option<&str> {
        self.old_path.as_deref().or(self.new_path.as_deref())
    }

    /// The path the current content lives under
    pub fn current_path(&self) -> Option<&str> {
        self.new_path.as_deref().or(self.old_path.as_deref())
    }

    fn from_delta(delta: &DiffDelta<'_>) -> Self {
        let old_path = delta.old_file().path().and_then(|p| p.to_str()).map(String::from);
        let new_path = delta.new_file().path().and_then(|p| p.to_str()).map(String::from);
        let status = match delta.status() {
            Delta::Added => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            _ => FileStatus::Modified,
        };
        Self { old_path, new_path, status }
    }
}

/// What the change analyzer needs from version control.
///
/// Enumeration methods may fail; content lookups degrade to `None`.
pub trait VersionControl {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Last commit vs. the index
    fn staged_changes(&self) -> Result<Vec<ChangedPath>>;

    /// Index vs. the working tree
    fn unstaged_changes(&self) -> Result<Vec<ChangedPath>>;

    /// Files in the working tree that are neither tracked nor ignored
    fn untracked_files(&self) -> Result<Vec<String>>;

    /// Content of `path` as of the last commit
    fn file_at_head(&self, path: &str) -> Option<Vec<u8>>;

    /// Current content of `path` in the working tree
    fn read_workdir(&self, path: &str) -> Option<String> {
        fs::read(self.workdir().join(path))
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Opens the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| MonitorError::NotARepository {
            path: path.to_path_buf(),
            source: Some(e),
        })?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| MonitorError::NotARepository { path: path.to_path_buf(), source: None })?;

        tracing::debug!(workdir = %workdir.display(), "opened repository");
        Ok(Self { repo, workdir })
    }

    /// Tree of the last commit; `None` while HEAD is unborn
    fn head_tree(&self) -> Option<Tree<'_>> {
        self.repo.head().ok().and_then(|head| head.peel_to_tree().ok())
    }

    fn diff_options() -> DiffOptions {
        let mut opts = DiffOptions::new();
        opts.include_untracked(false);
        opts
    }
}

impl VersionControl for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn staged_changes(&self) -> Result<Vec<ChangedPath>> {
        let head = self.head_tree();
        let mut opts = Self::diff_options();
        let diff = self.repo.diff_tree_to_index(head.as_ref(), None, Some(&mut opts))?;
        Ok(diff.deltas().map(|d| ChangedPath::from_delta(&d)).collect())
    }

    fn unstaged_changes(&self) -> Result<Vec<ChangedPath>> {
        let mut opts = Self::diff_options();
        let diff = self.repo.diff_index_to_workdir(None, Some(&mut opts))?;
        Ok(diff.deltas().map(|d| ChangedPath::from_delta(&d)).collect())
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status().contains(Status::WT_NEW))
            .filter_map(|entry| entry.path().map(String::from))
            .collect())
    }

    fn file_at_head(&self, path: &str) -> Option<Vec<u8>> {
        let tree = self.head_tree()?;
        let entry = tree.get_path(Path::new(path)).ok()?;
        let blob = self.repo.find_blob(entry.id()).ok()?;
        Some(blob.content().to_vec())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScratchRepo;
    use super::*;

    #[test]
    fn discover_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitRepository::discover(dir.path()).err().unwrap();
        assert!(matches!(err, MonitorError::NotARepository { .. }));
    }

    #[test]
    fn discover_searches_parents() {
        let scratch = ScratchRepo::new();
        scratch.write("pkg/sub/mod.py", "x = 1\n");
        let repo = GitRepository::discover(&scratch.path().join("pkg/sub")).unwrap();
        assert_eq!(
            repo.workdir().canonicalize().unwrap(),
            scratch.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn unborn_head_treats_index_as_additions() {
        let scratch = ScratchRepo::new();
        scratch.write("a.py", "def a(): pass\n");
        scratch.stage("a.py");

        let repo = GitRepository::discover(scratch.path()).unwrap();
        let staged = repo.staged_changes().unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].status, FileStatus::Added);
        assert_eq!(staged[0].path(), Some("a.py"));
        assert!(repo.file_at_head("a.py").is_none());
    }

    #[test]
    fn staged_unstaged_and_untracked_are_separate() {
        let scratch = ScratchRepo::new();
        scratch.write("a.py", "def a(): pass\n");
        scratch.write("b.py", "def b(): pass\n");
        scratch.stage("a.py");
        scratch.stage("b.py");
        scratch.commit("init");

        scratch.write("a.py", "def a():\n    pass\n");
        scratch.stage("a.py");
        scratch.delete("b.py");
        scratch.write("new/c.py", "class C: pass\n");

        let repo = GitRepository::discover(scratch.path()).unwrap();

        let staged = repo.staged_changes().unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!((staged[0].path(), staged[0].status), (Some("a.py"), FileStatus::Modified));

        let unstaged = repo.unstaged_changes().unwrap();
        assert_eq!(unstaged.len(), 1);
        assert_eq!((unstaged[0].path(), unstaged[0].status), (Some("b.py"), FileStatus::Deleted));

        assert_eq!(repo.untracked_files().unwrap(), vec!["new/c.py".to_string()]);
        assert_eq!(repo.file_at_head("a.py").as_deref(), Some(b"def a(): pass\n".as_slice()));
        assert_eq!(repo.read_workdir("b.py"), None);
    }
}
