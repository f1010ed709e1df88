//! The per-path reconciliation state machine.
//!
//! For one debounced event:
//! 1. no open document: diff the disk content against the snapshot and
//!    accumulate the lines, or record a whole-file change if there is no
//!    snapshot;
//! 2. open but dirty: touch nothing;
//! 3. open, clean, session active: keep the pre-session baseline and defer;
//! 4. otherwise: reload, diff against the pre-reload content, highlight, and
//!    start the cooldown.

use std::path::{Path, PathBuf};

use tokio::time::Instant;

use super::{read_lines, Outcome, ReconciliationEngine};
use crate::diff::{changed_line_count, diff_with};
use crate::editor::{DocumentId, Editor, NoticeLevel};
use crate::error::{EngineError, Result};
use crate::source::normalize_path;
use crate::types::{clamp_hunks, ChangeEvent, ChangeHunk, EventOrigin, Snapshot};

impl ReconciliationEngine {
    /// Runs the state machine for one debounced event.
    pub(super) fn reconcile<E: Editor>(&mut self, editor: &mut E, event: ChangeEvent, now: Instant) -> Outcome {
        let path = event.path.clone();
        if self.reconciling.contains(&path) {
            return Outcome::Busy { path };
        }

        let Some(doc) = editor.document(&path) else {
            return self.reconcile_closed(event, now);
        };

        if editor.is_dirty(doc) {
            tracing::warn!(path = %path.display(), "unsaved edits, not reloading");
            editor.notify(
                NoticeLevel::Warn,
                &format!("{} changed on disk but has unsaved edits; not reloaded", path.display()),
            );
            return Outcome::SkippedDirty { path };
        }

        if self.session.is_active() {
            let entry = self.pending.entry(path.clone()).or_default();
            if entry.baseline.is_none() {
                entry.baseline = editor.lines(doc);
            }
            entry.last_touched = Some(now);
            tracing::debug!(path = %path.display(), "deferred until session ends");
            return Outcome::Deferred { path };
        }

        // A baseline left over from a session (e.g. the flush found the
        // document dirty) still spans the whole session.
        let baseline = self.pending.remove(&path).and_then(|p| p.baseline);
        self.reload_and_diff(editor, doc, &path, baseline, event.hunks, true, now)
    }

    /// Reconciles `path` immediately, skipping debounce and cooldown.
    pub(super) fn reconcile_now<E: Editor>(
        &mut self,
        editor: &mut E,
        path: &Path,
        hunks: Option<Vec<ChangeHunk>>,
        now: Instant,
    ) -> Outcome {
        let path = normalize_path(path);
        self.tracked.insert(path.clone());
        let mut event = ChangeEvent::new(path.clone(), EventOrigin::Announcement, now);
        if let Some(queued) = self.debouncer.cancel(&path) {
            event = queued;
        }
        if let Some(hunks) = hunks {
            event = event.with_hunks(hunks);
        }
        self.debouncer.clear_cooldown(&path);
        self.reconcile(editor, event, now)
    }

    /// Step 1: the file is not open in the editor.
    fn reconcile_closed(&mut self, event: ChangeEvent, now: Instant) -> Outcome {
        let path = event.path;
        let current = match read_lines(&path) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("transient read failure, waiting for the next event: {e}");
                return Outcome::Failed { path };
            }
        };
        let announced = event.hunks.map(|h| clamp_hunks(&h, current.len())).filter(|h| !h.is_empty());

        let Some(snapshot) = self.store.get(&path) else {
            // No trustworthy "before": only announced hunks can say more than
            // "the whole file changed".
            let entry = self.pending.entry(path.clone()).or_default();
            let outcome = match announced {
                Some(hunks) => {
                    entry.absorb_hunks(&hunks, now);
                    Outcome::Accumulated { path: path.clone(), lines: changed_line_count(&hunks) }
                }
                None => {
                    entry.mark_whole_file(now);
                    Outcome::MarkedWholeFile { path: path.clone() }
                }
            };
            // Seed a baseline so the next change has line-level detail.
            self.store.put(path, Snapshot::new(current, now));
            return outcome;
        };

        let hunks = match announced {
            Some(hunks) => hunks,
            None => diff_with(self.config.diff_algorithm, &snapshot.lines, &current),
        };
        self.store.put(path.clone(), Snapshot::new(current, now));
        if hunks.is_empty() {
            return Outcome::Accumulated { path, lines: 0 };
        }
        self.pending.entry(path.clone()).or_default().absorb_hunks(&hunks, now);
        tracing::debug!(path = %path.display(), hunks = hunks.len(), "closed-file change accumulated");
        Outcome::Accumulated { path, lines: changed_line_count(&hunks) }
    }

    /// Step 4: reload `doc` and diff against `baseline` (or the pre-reload
    /// buffer when `None`).
    ///
    /// The per-path reconciling flag, the highlight reload guard, and the
    /// cooldown are released on every path out, failure included.
    #[allow(clippy::too_many_arguments)]
    fn reload_and_diff<E: Editor>(
        &mut self,
        editor: &mut E,
        doc: DocumentId,
        path: &Path,
        baseline: Option<Vec<String>>,
        announced: Option<Vec<ChangeHunk>>,
        highlight: bool,
        now: Instant,
    ) -> Outcome {
        let path_buf: PathBuf = path.to_path_buf();
        let before = baseline.or_else(|| editor.lines(doc));

        self.reconciling.insert(path_buf.clone());
        if let Some(hl) = self.highlights.as_mut() {
            hl.begin_reload(doc);
        }
        let result = reload_preserving_cursors(editor, doc, path);
        if let Some(hl) = self.highlights.as_mut() {
            hl.finish_reload(doc, now);
        }
        self.reconciling.remove(&path_buf);

        if let Err(e) = result {
            tracing::warn!("{e}");
            editor.notify(NoticeLevel::Warn, &e.to_string());
            self.debouncer.clear_cooldown(path);
            return Outcome::Failed { path: path_buf };
        }
        self.debouncer.start_cooldown(path, now);

        let after = editor.lines(doc).unwrap_or_default();
        let outcome = match before {
            Some(before) if highlight => {
                // Announced ranges are only trusted within the reloaded content.
                let announced = announced.map(|h| clamp_hunks(&h, after.len())).filter(|h| !h.is_empty());
                let hunks = match announced {
                    Some(hunks) => hunks,
                    None => diff_with(self.config.diff_algorithm, &before, &after),
                };
                if !hunks.is_empty() {
                    if let Some(hl) = self.highlights.as_mut() {
                        hl.apply(editor, doc, &hunks);
                    }
                }
                tracing::info!(path = %path.display(), hunks = hunks.len(), "reconciled");
                Outcome::Reloaded { path: path_buf.clone(), hunks }
            }
            _ => {
                tracing::info!(path = %path.display(), "reloaded without diff");
                Outcome::ReloadedWithoutDiff { path: path_buf.clone() }
            }
        };
        self.store.put(path_buf, Snapshot::new(after, now));
        outcome
    }

    /// Flushes every deferred change whose document is open and clean.
    ///
    /// Entries for closed documents stay pending until the document opens.
    pub(super) fn flush_session<E: Editor>(&mut self, editor: &mut E, now: Instant) -> Vec<Outcome> {
        let mut paths: Vec<PathBuf> = self.pending.keys().cloned().collect();
        paths.sort();

        let mut outcomes = Vec::new();
        for path in paths {
            let Some(doc) = editor.document(&path) else {
                continue;
            };
            if editor.is_dirty(doc) {
                tracing::warn!(path = %path.display(), "unsaved edits at session end, flush skipped");
                editor.notify(
                    NoticeLevel::Warn,
                    &format!("{} changed during the session but has unsaved edits", path.display()),
                );
                outcomes.push(Outcome::SkippedDirty { path });
                continue;
            }
            let Some(entry) = self.pending.remove(&path) else {
                continue;
            };
            let outcome = match entry.baseline {
                Some(baseline) => self.reload_and_diff(editor, doc, &path, Some(baseline), None, true, now),
                None => {
                    let outcome = self.reload_and_diff(editor, doc, &path, None, None, false, now);
                    if matches!(outcome, Outcome::ReloadedWithoutDiff { .. }) {
                        editor.notify(NoticeLevel::Info, &format!("{} was changed by the agent", path.display()));
                    }
                    outcome
                }
            };
            outcomes.push(outcome);
        }
        tracing::info!(flushed = outcomes.len(), "session flush complete");
        outcomes
    }
}

/// Reloads `doc`, then restores every viewport's cursor clamped to the new
/// content: line to the new line count, column to that line's length.
fn reload_preserving_cursors<E: Editor>(editor: &mut E, doc: DocumentId, path: &Path) -> Result<()> {
    let viewports = editor.viewports(doc);
    editor
        .reload_from_disk(doc)
        .map_err(|e| EngineError::Reload { path: path.to_path_buf(), reason: e.to_string() })?;

    let lines = editor.lines(doc).unwrap_or_default();
    for viewport in viewports {
        let line = viewport.line.clamp(1, lines.len().max(1));
        let width = lines.get(line - 1).map_or(0, |l| l.chars().count());
        editor.set_cursor(viewport.id, line, viewport.col.min(width));
    }
    Ok(())
}
