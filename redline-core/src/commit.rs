//! Version-control commit detection.
//!
//! A commit rewrites the repository's index file. We locate that file once
//! with git2 and then only watch its mtime: a strict increase since the last
//! observation is treated as a commit. Checks run on focus regain, on a
//! filesystem event for the index file, and on a slow poll.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use git2::Repository;

use crate::error::Result;

#[derive(Debug)]
pub struct CommitWatcher {
    index_path: PathBuf,
    last_mtime: Option<SystemTime>,
}

impl CommitWatcher {
    /// Finds the repository containing `root` and records its index mtime.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Git`](crate::EngineError::Git) when `root` is not
    /// inside a git repository.
    pub fn discover(root: &Path) -> Result<Self> {
        let repo = Repository::discover(root)?;
        let index_path = crate::source::normalize_path(&repo.path().join("index"));
        tracing::debug!(index = %index_path.display(), "commit detection enabled");
        Ok(Self::for_index(index_path))
    }

    /// Watches an explicit index file.
    pub fn for_index(index_path: PathBuf) -> Self {
        let last_mtime = mtime(&index_path);
        Self { index_path, last_mtime }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Returns `true` if the index mtime strictly increased since the last
    /// check. A missing or unreadable index is never a commit.
    pub fn check(&mut self) -> bool {
        let Some(current) = mtime(&self.index_path) else {
            return false;
        };
        match self.last_mtime {
            Some(last) if current > last => {
                self.last_mtime = Some(current);
                true
            }
            Some(_) => false,
            None => {
                self.last_mtime = Some(current);
                false
            }
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
