//! Line diffing between two content versions.
//!
//! Pure functions, no I/O and no state. Aligned diffs go through `similar`;
//! the positional fallback compares index by index in O(n).
//!
//! Every strategy guarantees:
//! - identical inputs produce no hunks;
//! - hunks are sorted, non-overlapping, and measured against the new content;
//! - pure deletions produce nothing (there is no line left to mark).

use similar::{Algorithm, DiffOp};

use crate::config::DiffAlgorithm;
use crate::types::{ChangeHunk, HunkKind};

/// Diffs `old` against `new` with the default (patience) algorithm.
pub fn diff(old: &[String], new: &[String]) -> Vec<ChangeHunk> {
    diff_with(DiffAlgorithm::default(), old, new)
}

/// Diffs `old` against `new` with the chosen strategy.
pub fn diff_with(algorithm: DiffAlgorithm, old: &[String], new: &[String]) -> Vec<ChangeHunk> {
    let algorithm = match algorithm {
        DiffAlgorithm::Positional => return positional_diff(old, new),
        DiffAlgorithm::Patience => Algorithm::Patience,
        DiffAlgorithm::Myers => Algorithm::Myers,
        DiffAlgorithm::Lcs => Algorithm::Lcs,
    };
    if old == new {
        return Vec::new();
    }

    let ops = similar::capture_diff_slices(algorithm, old, new);
    let mut hunks: Vec<ChangeHunk> = Vec::new();
    for op in ops {
        let (new_index, new_len, kind) = match op {
            DiffOp::Equal { .. } | DiffOp::Delete { .. } => continue,
            DiffOp::Insert { new_index, new_len, .. } => (new_index, new_len, HunkKind::Added),
            DiffOp::Replace { new_index, new_len, .. } => (new_index, new_len, HunkKind::Modified),
        };
        if new_len == 0 {
            continue;
        }
        push_run(&mut hunks, new_index + 1, new_index + new_len, kind);
    }
    hunks
}

/// Index-by-index comparison used when no aligning diff is wanted.
///
/// Line `i` (1-based) is `Added` when it lies beyond the old content and
/// `Modified` when it differs from `old[i]`. Adjacent lines of the same kind
/// collapse into one hunk.
pub fn positional_diff(old: &[String], new: &[String]) -> Vec<ChangeHunk> {
    let mut hunks: Vec<ChangeHunk> = Vec::new();
    for (idx, line) in new.iter().enumerate() {
        let kind = match old.get(idx) {
            None => HunkKind::Added,
            Some(prev) if prev != line => HunkKind::Modified,
            Some(_) => continue,
        };
        push_run(&mut hunks, idx + 1, idx + 1, kind);
    }
    hunks
}

/// Appends `[start, end]`, extending the previous hunk when it is contiguous
/// and of the same kind.
fn push_run(hunks: &mut Vec<ChangeHunk>, start: usize, end: usize, kind: HunkKind) {
    if let Some(last) = hunks.last_mut() {
        if last.kind == kind && last.end_line + 1 == start {
            last.end_line = end;
            return;
        }
    }
    hunks.push(ChangeHunk::new(start, end, kind));
}

/// Total number of lines covered by `hunks`.
pub fn changed_line_count(hunks: &[ChangeHunk]) -> usize {
    hunks.iter().fold(0, |total: usize, h| total.saturating_add(h.end_line - h.start_line + 1))
}
