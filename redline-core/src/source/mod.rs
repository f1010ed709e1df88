//! Change sources.
//!
//! Three producers feed the engine: notify events on watched paths, the
//! agent's marker file, and explicit announcements from an RPC caller. Each
//! adapter normalises its input into canonical paths (and, for
//! announcements, optional hunks); the engine turns those into
//! [`ChangeEvent`](crate::types::ChangeEvent)s and feeds the debouncer.
//!
//! Producers running on other threads never touch engine state: they hand
//! typed events to the control thread through a channel.

pub mod announce;
pub mod marker;
pub mod watcher;

use std::path::{Component, Path, PathBuf};

pub use announce::{convert_hunks, AnnouncedHunk, AnnouncedKind, Announcement};
pub use marker::{MarkerBatch, MarkerFile};
pub use watcher::{FsWatcher, RawFsEvent};

/// Canonicalises `path` to an absolute form for map lookups.
///
/// The parent directory is resolved through the filesystem (following
/// symlinks) when it exists, so a file that was just deleted or not yet
/// created still maps to the same key as its live counterpart. Otherwise
/// `.` and `..` are folded lexically against the current directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };
    let lexical = lexical_clean(&absolute);

    if let Ok(full) = lexical.canonicalize() {
        return full;
    }
    match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(lexical),
        _ => lexical,
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
