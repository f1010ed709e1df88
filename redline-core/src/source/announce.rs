//! Explicit announcements from an external RPC caller.
//!
//! The wire framing belongs to the caller; this module only defines the
//! decoded messages. They deserialize from
//! `{"method": "notifyChange", "params": {"path": "...", "hunks": [...]}}`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{normalize_hunks, ChangeHunk, HunkKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncedKind {
    Add,
    Modify,
    Delete,
}

/// A hunk as precomputed by the announcing agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncedHunk {
    pub start_line: usize,
    pub end_line: usize,
    pub kind: AnnouncedKind,
}

impl AnnouncedHunk {
    /// Maps to an engine hunk. Deletions have nothing to mark and map to `None`.
    pub fn to_change_hunk(&self) -> Option<ChangeHunk> {
        let kind = match self.kind {
            AnnouncedKind::Add => HunkKind::Added,
            AnnouncedKind::Modify => HunkKind::Modified,
            AnnouncedKind::Delete => return None,
        };
        Some(ChangeHunk::new(self.start_line.max(1), self.end_line.max(1), kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Announcement {
    /// A file was changed; hunks are optional.
    NotifyChange {
        path: PathBuf,
        #[serde(default)]
        hunks: Option<Vec<AnnouncedHunk>>,
    },
    /// Seed the snapshot for `path` before an external mutation begins.
    SaveBaseline { path: PathBuf },
    /// Reconcile `path` now, skipping the debounce.
    ReloadRequest { path: PathBuf },
    ClearHighlights,
}

/// Converts announced hunks, dropping deletions and merging overlaps. An
/// empty result means the engine must diff.
///
/// Bounds are not checked here; the engine clamps them to the content the
/// hunks are applied to.
pub fn convert_hunks(hunks: &[AnnouncedHunk]) -> Vec<ChangeHunk> {
    normalize_hunks(hunks.iter().filter_map(AnnouncedHunk::to_change_hunk).collect())
}
