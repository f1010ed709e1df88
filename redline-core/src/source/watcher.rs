//! Filesystem watch source.
//!
//! notify delivers events on its own thread. The callback only filters and
//! forwards paths to a sink (normally a channel into the control thread); it
//! never touches engine state.
//!
//! Files are watched through their parent directory, non-recursively. Agents
//! commonly write via rename-over, which drops an inode watch on the file
//! itself; a directory watch survives that. Directories are reference counted
//! so several tracked files can share one watch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::Result;

/// A batch of raw paths reported by one notify event.
///
/// Paths are as notify reported them; the control thread canonicalises and
/// filters them against the tracked set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFsEvent {
    pub paths: Vec<PathBuf>,
}

pub struct FsWatcher {
    inner: RecommendedWatcher,
    dirs: HashMap<PathBuf, usize>,
}

impl FsWatcher {
    /// Starts a watcher whose events are handed to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Watch`](crate::EngineError::Watch) if the
    /// platform watcher cannot be created.
    pub fn new<F>(sink: F) -> Result<Self>
    where
        F: Fn(RawFsEvent) + Send + 'static,
    {
        let inner = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if is_content_change(&event.kind) && !event.paths.is_empty() {
                        sink(RawFsEvent { paths: event.paths });
                    }
                }
                Err(e) => tracing::warn!("notify error: {e}"),
            }
        })?;
        Ok(Self { inner, dirs: HashMap::new() })
    }

    /// Watches `file` by watching its parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be watched (for
    /// example because it does not exist).
    pub fn watch_file(&mut self, file: &Path) -> Result<()> {
        let Some(dir) = file.parent() else {
            return Ok(());
        };
        if let Some(count) = self.dirs.get_mut(dir) {
            *count += 1;
            return Ok(());
        }
        self.inner.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(dir = %dir.display(), "watching directory");
        self.dirs.insert(dir.to_path_buf(), 1);
        Ok(())
    }

    /// Releases one reference on `file`'s parent directory.
    pub fn unwatch_file(&mut self, file: &Path) {
        let Some(dir) = file.parent() else {
            return;
        };
        let Some(count) = self.dirs.get_mut(dir) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.dirs.remove(dir);
            if let Err(e) = self.inner.unwatch(dir) {
                tracing::debug!(dir = %dir.display(), "unwatch failed: {e}");
            }
        }
    }

    pub fn watched_dirs(&self) -> usize {
        self.dirs.len()
    }
}

/// Drops access and metadata-only noise (atime, chmod) which would otherwise
/// look like writes.
fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Any => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        EventKind::Access(_) | EventKind::Other => false,
    }
}
