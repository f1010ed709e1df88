//! Owned data types shared by every engine component.
//!
//! All types here are plain owned values (no borrowed lifetimes) so they can
//! travel through the engine's event queue and be stored in its maps without
//! arena allocation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use tokio::time::Instant;

/// The last trusted content of a tracked path.
///
/// Owned exclusively by [`ContentStore`](crate::store::ContentStore). A snapshot
/// is replaced only around a successful reconciliation, never speculatively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// File content split into lines, without line terminators.
    pub lines: Vec<String>,
    /// When the content was captured.
    pub captured_at: Instant,
}

impl Snapshot {
    pub fn new(lines: Vec<String>, captured_at: Instant) -> Self {
        Self { lines, captured_at }
    }
}

/// Whether a hunk introduced new lines or rewrote existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
    /// Lines that have no counterpart in the old content.
    Added,
    /// Lines that replaced old content.
    Modified,
}

/// A contiguous line range that changed between two versions of a file.
///
/// Lines are 1-based and `end_line` is inclusive. The constructor enforces
/// `start_line <= end_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeHunk {
    pub start_line: usize,
    pub end_line: usize,
    pub kind: HunkKind,
}

impl ChangeHunk {
    /// Builds a hunk, swapping the bounds if they arrive reversed.
    pub fn new(start_line: usize, end_line: usize, kind: HunkKind) -> Self {
        let (start_line, end_line) = if start_line <= end_line {
            (start_line, end_line)
        } else {
            (end_line, start_line)
        };
        Self { start_line, end_line, kind }
    }

    /// Iterates every line number covered by the hunk.
    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start_line..=self.end_line
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Sorts `hunks` and folds overlapping ranges together, so the result is
/// ordered and non-overlapping.
///
/// Touching ranges merge only when their kinds agree. Overlapping ranges of
/// different kinds become one `Modified` hunk.
pub fn normalize_hunks(mut hunks: Vec<ChangeHunk>) -> Vec<ChangeHunk> {
    hunks.sort_by_key(|h| (h.start_line, h.end_line));
    let mut out: Vec<ChangeHunk> = Vec::with_capacity(hunks.len());
    for hunk in hunks {
        if let Some(last) = out.last_mut() {
            let overlaps = hunk.start_line <= last.end_line;
            let touches = last.kind == hunk.kind && last.end_line.checked_add(1) == Some(hunk.start_line);
            if overlaps || touches {
                if last.kind != hunk.kind {
                    last.kind = HunkKind::Modified;
                }
                last.end_line = last.end_line.max(hunk.end_line);
                continue;
            }
        }
        out.push(hunk);
    }
    out
}

/// Restricts `hunks` to a document of `line_count` lines.
///
/// Hunks starting past the last line are dropped and the rest are cut at it.
pub fn clamp_hunks(hunks: &[ChangeHunk], line_count: usize) -> Vec<ChangeHunk> {
    normalize_hunks(
        hunks
            .iter()
            .filter(|h| h.start_line <= line_count)
            .map(|h| ChangeHunk::new(h.start_line, h.end_line.min(line_count), h.kind))
            .collect(),
    )
}

/// Where a change notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// A notify event on the path itself.
    FsWatch,
    /// A line in the marker file written by the agent.
    MarkerFile,
    /// An explicit `notifyChange` announcement.
    Announcement,
}

/// A producer-agnostic change notification for one canonical path.
///
/// When `hunks` is `None` the engine derives them by diffing against the
/// stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub hunks: Option<Vec<ChangeHunk>>,
    pub origin: EventOrigin,
    pub observed_at: Instant,
}

impl ChangeEvent {
    pub fn new(path: PathBuf, origin: EventOrigin, observed_at: Instant) -> Self {
        Self { path, hunks: None, origin, observed_at }
    }

    pub fn with_hunks(mut self, hunks: Vec<ChangeHunk>) -> Self {
        self.hunks = if hunks.is_empty() { None } else { Some(hunks) };
        self
    }

    /// Folds a newer event for the same path into this one.
    ///
    /// The newer event's timestamp and origin win. Hunks survive only when both
    /// events carry them; otherwise the merged event falls back to diffing.
    pub fn absorb(&mut self, newer: ChangeEvent) {
        self.hunks = match (self.hunks.take(), newer.hunks) {
            (Some(mut old), Some(new)) => {
                old.extend(new);
                Some(normalize_hunks(old))
            }
            _ => None,
        };
        self.origin = newer.origin;
        self.observed_at = newer.observed_at;
    }
}

/// Per-path accumulator for changes that could not be reconciled right away.
///
/// `hunks` only grows by union until the entry is consumed. `pending` marks
/// the "whole file changed, no line detail" state used when the file changed
/// while closed and no snapshot existed. `baseline` holds the document content
/// captured at the first touch of an agent session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChange {
    pub hunks: BTreeSet<usize>,
    pub pending: bool,
    pub baseline: Option<Vec<String>>,
    pub last_touched: Option<Instant>,
}

impl PendingChange {
    /// Unions the line numbers of `hunks` into the accumulator.
    pub fn absorb_hunks(&mut self, hunks: &[ChangeHunk], now: Instant) {
        for hunk in hunks {
            self.hunks.extend(hunk.lines());
        }
        self.last_touched = Some(now);
    }

    pub fn mark_whole_file(&mut self, now: Instant) {
        self.pending = true;
        self.last_touched = Some(now);
    }
}

/// One entry of the `listOpenDocuments` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenDocument {
    pub path: PathBuf,
    pub dirty: bool,
}

/// Splits file content into lines, accepting both `\n` and `\r\n`.
///
/// A trailing newline does not produce an empty final line.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_crlf_and_trailing_newline() {
        assert_eq!(split_lines("a\r\nb\nc\n"), vec!["a", "b", "c"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn absorb_drops_hunks_when_either_side_lacks_them() {
        let now = Instant::now();
        let hunk = ChangeHunk::new(1, 2, HunkKind::Modified);
        let mut first = ChangeEvent::new("/a".into(), EventOrigin::Announcement, now)
            .with_hunks(vec![hunk]);
        first.absorb(ChangeEvent::new("/a".into(), EventOrigin::FsWatch, now));
        assert_eq!(first.hunks, None);
        assert_eq!(first.origin, EventOrigin::FsWatch);
    }

    #[test]
    fn absorb_merges_overlapping_hunks() {
        let now = Instant::now();
        let mut first = ChangeEvent::new("/a".into(), EventOrigin::Announcement, now)
            .with_hunks(vec![ChangeHunk::new(4, 6, HunkKind::Added)]);
        first.absorb(
            ChangeEvent::new("/a".into(), EventOrigin::Announcement, now)
                .with_hunks(vec![ChangeHunk::new(5, 8, HunkKind::Added), ChangeHunk::new(1, 1, HunkKind::Modified)]),
        );
        assert_eq!(
            first.hunks,
            Some(vec![ChangeHunk::new(1, 1, HunkKind::Modified), ChangeHunk::new(4, 8, HunkKind::Added)])
        );
    }

    #[test]
    fn overlapping_kinds_merge_as_modified_and_touching_kinds_stay_apart() {
        let hunks = normalize_hunks(vec![
            ChangeHunk::new(3, 4, HunkKind::Added),
            ChangeHunk::new(1, 2, HunkKind::Modified),
            ChangeHunk::new(4, 5, HunkKind::Modified),
        ]);
        assert_eq!(
            hunks,
            vec![ChangeHunk::new(1, 2, HunkKind::Modified), ChangeHunk::new(3, 5, HunkKind::Modified)]
        );

        let touching = normalize_hunks(vec![ChangeHunk::new(1, 1, HunkKind::Modified), ChangeHunk::new(2, 2, HunkKind::Added)]);
        assert_eq!(touching.len(), 2);
    }

    #[test]
    fn clamping_cuts_at_the_last_line_and_drops_what_lies_beyond() {
        let hunks = [
            ChangeHunk::new(2, usize::MAX, HunkKind::Modified),
            ChangeHunk::new(7, 9, HunkKind::Added),
        ];
        assert_eq!(clamp_hunks(&hunks, 3), vec![ChangeHunk::new(2, 3, HunkKind::Modified)]);
        assert!(clamp_hunks(&hunks, 0).is_empty());
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let hunk = ChangeHunk::new(5, 3, HunkKind::Added);
        assert_eq!((hunk.start_line, hunk.end_line), (3, 5));
    }
}
