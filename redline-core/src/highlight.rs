//! Transient highlights for reconciled hunks.
//!
//! Highlights expire on any of: a user edit to the document, a detected VCS
//! commit, the start of a new agent session, or an explicit clear. The first
//! is the subtle one: the engine's own reload looks like an edit to most
//! editors, so edits are ignored while a reload is in flight and for a guard
//! period after it completes, long enough for the reload's own change
//! notifications to have been dispatched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::editor::{DocumentId, Editor, HighlightTag};
use crate::types::{ChangeHunk, HunkKind};

#[derive(Debug)]
pub struct HighlightLifecycle {
    spans: HashMap<DocumentId, BTreeMap<usize, HighlightTag>>,
    reloading: HashSet<DocumentId>,
    guard_until: HashMap<DocumentId, Instant>,
    guard: Duration,
}

impl HighlightLifecycle {
    pub fn new(guard: Duration) -> Self {
        Self {
            spans: HashMap::new(),
            reloading: HashSet::new(),
            guard_until: HashMap::new(),
            guard,
        }
    }

    /// Replaces `doc`'s highlights with the union of `hunks`.
    ///
    /// A line covered by both an added and a modified hunk is marked modified.
    /// Returns the number of lines marked.
    pub fn apply<E: Editor>(&mut self, editor: &mut E, doc: DocumentId, hunks: &[ChangeHunk]) -> usize {
        self.clear(editor, doc);

        let mut lines: BTreeMap<usize, HighlightTag> = BTreeMap::new();
        for hunk in hunks {
            let tag = match hunk.kind {
                HunkKind::Added => HighlightTag::Added,
                HunkKind::Modified => HighlightTag::Modified,
            };
            for line in hunk.lines() {
                lines
                    .entry(line)
                    .and_modify(|t| {
                        if tag == HighlightTag::Modified {
                            *t = tag;
                        }
                    })
                    .or_insert(tag);
            }
        }
        if lines.is_empty() {
            return 0;
        }
        for (&line, &tag) in &lines {
            editor.apply_line_highlight(doc, line, tag);
        }
        let count = lines.len();
        self.spans.insert(doc, lines);
        count
    }

    /// Highlights bare line numbers, all tagged modified.
    pub fn apply_lines<E: Editor>(
        &mut self,
        editor: &mut E,
        doc: DocumentId,
        lines: impl IntoIterator<Item = usize>,
    ) -> usize {
        let hunks: Vec<ChangeHunk> =
            lines.into_iter().map(|l| ChangeHunk::new(l, l, HunkKind::Modified)).collect();
        self.apply(editor, doc, &hunks)
    }

    pub fn clear<E: Editor>(&mut self, editor: &mut E, doc: DocumentId) {
        if self.spans.remove(&doc).is_some() {
            editor.clear_highlights(doc);
        }
    }

    pub fn clear_all<E: Editor>(&mut self, editor: &mut E) {
        for (doc, _) in self.spans.drain() {
            editor.clear_highlights(doc);
        }
    }

    /// Marks `doc` as being reloaded by the engine. Edits are ignored until
    /// the guard set by [`HighlightLifecycle::finish_reload`] expires.
    pub fn begin_reload(&mut self, doc: DocumentId) {
        self.reloading.insert(doc);
    }

    /// Ends the reload and starts the post-reload guard. Always called, even
    /// when the reload failed, so the document never stays guarded forever.
    pub fn finish_reload(&mut self, doc: DocumentId, now: Instant) {
        self.reloading.remove(&doc);
        self.guard_until.insert(doc, now + self.guard);
    }

    pub fn is_guarded(&self, doc: DocumentId, now: Instant) -> bool {
        self.reloading.contains(&doc) || self.guard_until.get(&doc).is_some_and(|until| now < *until)
    }

    /// Handles a text-modifying edit on `doc`.
    ///
    /// Returns `true` when the edit was the user's and highlights were cleared.
    pub fn on_user_edit<E: Editor>(&mut self, editor: &mut E, doc: DocumentId, now: Instant) -> bool {
        if self.is_guarded(doc, now) {
            return false;
        }
        self.guard_until.remove(&doc);
        if !self.spans.contains_key(&doc) {
            return false;
        }
        self.clear(editor, doc);
        true
    }

    /// Forgets a document the editor closed.
    pub fn forget(&mut self, doc: DocumentId) {
        self.spans.remove(&doc);
        self.reloading.remove(&doc);
        self.guard_until.remove(&doc);
    }

    pub fn lines(&self, doc: DocumentId) -> Option<&BTreeMap<usize, HighlightTag>> {
        self.spans.get(&doc)
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
