//! The reconciliation engine.
//!
//! One explicit state object per editor session owns every table: snapshots,
//! pending changes, the debouncer, the highlight lifecycle, the watcher
//! handles. It is driven from a single control thread through typed
//! [`EngineEvent`]s plus periodic [`ReconciliationEngine::tick`] calls; nothing
//! else mutates it. Producers on other threads (notify, RPC) go through an
//! [`EngineHandle`].
//!
//! ```text
//! ChangeSource → Debouncer → reconcile() → {ContentStore, diff} → HighlightLifecycle
//!                               ↑
//!                            Session
//! ```

mod driver;
mod reconcile;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::commit::CommitWatcher;
use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::editor::{DocumentId, Editor, NoticeLevel};
use crate::error::{EngineError, Result};
use crate::highlight::HighlightLifecycle;
use crate::session::Session;
use crate::source::{convert_hunks, normalize_path, Announcement, FsWatcher, MarkerFile, RawFsEvent};
use crate::store::ContentStore;
use crate::types::{split_lines, ChangeEvent, ChangeHunk, EventOrigin, OpenDocument, PendingChange, Snapshot};

pub use driver::run;

/// Everything the control thread can be asked to do.
#[derive(Debug)]
#[non_exhaustive]
pub enum EngineEvent {
    /// Paths reported by the filesystem watcher.
    RawFs(RawFsEvent),
    Announce(Announcement),
    DocumentOpened(PathBuf),
    DocumentClosed(PathBuf),
    /// The user modified a document's text.
    DocumentEdited(PathBuf),
    /// The editor window regained focus.
    FocusGained,
    SessionStart,
    SessionEnd,
    ClearHighlights,
    /// Reconcile `path` now, bypassing debounce and cooldown.
    Recheck(PathBuf),
}

/// What one reconciliation attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The open document was reloaded; `hunks` were computed against the
    /// pre-reload baseline.
    Reloaded { path: PathBuf, hunks: Vec<ChangeHunk> },
    /// Reloaded with nothing trustworthy to diff against.
    ReloadedWithoutDiff { path: PathBuf },
    /// Closed file diffed against its snapshot; lines joined its pending set.
    Accumulated { path: PathBuf, lines: usize },
    /// Closed file without a snapshot: whole-file change recorded.
    MarkedWholeFile { path: PathBuf },
    /// Unsaved local edits; nothing was touched.
    SkippedDirty { path: PathBuf },
    /// Session active; baseline kept for the flush.
    Deferred { path: PathBuf },
    /// A reconciliation for this path is already running.
    Busy { path: PathBuf },
    /// Disk or editor failure; retried on the next event.
    Failed { path: PathBuf },
}

/// Cloneable sender into the engine's event queue.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    /// Creates the queue. The receiver belongs to whoever drives the engine.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues `event`. Returns `false` once the engine is gone.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// A sink suitable for [`FsWatcher::new`].
    pub fn fs_sink(&self) -> impl Fn(RawFsEvent) + Send + 'static {
        let tx = self.tx.clone();
        move |raw| {
            let _ = tx.send(EngineEvent::RawFs(raw));
        }
    }
}

pub struct ReconciliationEngine {
    config: EngineConfig,
    store: ContentStore,
    pending: HashMap<PathBuf, PendingChange>,
    debouncer: Debouncer,
    highlights: Option<HighlightLifecycle>,
    session: Session,
    tracked: HashSet<PathBuf>,
    open_docs: HashMap<PathBuf, DocumentId>,
    reconciling: HashSet<PathBuf>,
    watcher: Option<FsWatcher>,
    marker: Option<MarkerFile>,
    commits: Option<CommitWatcher>,
    next_marker_poll: Option<Instant>,
    next_commit_poll: Option<Instant>,
}

impl ReconciliationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let highlights = config.highlights.then(|| HighlightLifecycle::new(config.reload_guard()));
        Self {
            debouncer: Debouncer::new(config.debounce(), config.cooldown()),
            highlights,
            config,
            store: ContentStore::new(),
            pending: HashMap::new(),
            session: Session::default(),
            tracked: HashSet::new(),
            open_docs: HashMap::new(),
            reconciling: HashSet::new(),
            watcher: None,
            marker: None,
            commits: None,
            next_marker_poll: None,
            next_commit_poll: None,
        }
    }

    // ---------------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------------

    /// Starts the filesystem watcher and watches every open document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Watch`] if the platform watcher cannot start.
    pub fn start_watching<F>(&mut self, sink: F) -> Result<()>
    where
        F: Fn(RawFsEvent) + Send + 'static,
    {
        let mut watcher = FsWatcher::new(sink)?;
        for path in self.open_docs.keys() {
            if let Err(e) = watcher.watch_file(path) {
                tracing::warn!(path = %path.display(), "cannot watch: {e}");
            }
        }
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Enables the marker-file source, creating the file empty if needed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the marker file cannot be created, or
    /// [`EngineError::Watch`] if its directory cannot be watched.
    pub fn enable_marker_file(&mut self, path: &Path, now: Instant) -> Result<()> {
        let raw = normalize_path(path);
        if let Some(dir) = raw.parent() {
            std::fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        }
        // Re-normalise now that the directory exists and can be canonicalised.
        let mut marker = MarkerFile::new(normalize_path(&raw));
        marker.ensure_exists()?;
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.watch_file(marker.path())?;
        }
        tracing::info!(marker = %marker.path().display(), "marker file enabled");
        self.marker = Some(marker);
        self.next_marker_poll = Some(now + self.config.marker_poll());
        Ok(())
    }

    /// Enables commit detection for the repository containing `root`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Git`] when `root` is not inside a repository.
    pub fn enable_commit_detection(&mut self, root: &Path, now: Instant) -> Result<()> {
        let commits = CommitWatcher::discover(root)?;
        if let Some(watcher) = self.watcher.as_mut() {
            if let Err(e) = watcher.watch_file(commits.index_path()) {
                tracing::debug!("index not watched, relying on polling: {e}");
            }
        }
        self.commits = Some(commits);
        self.next_commit_poll = Some(now + self.config.commit_poll());
        Ok(())
    }

    /// Tears the engine down: watchers stop and all highlights are cleared.
    pub fn shutdown<E: Editor>(mut self, editor: &mut E) {
        if let Some(hl) = self.highlights.as_mut() {
            hl.clear_all(editor);
        }
        self.watcher = None;
        tracing::info!(tracked = self.tracked.len(), "engine shut down");
    }

    // ---------------------------------------------------------------------
    // Event entry points
    // ---------------------------------------------------------------------

    /// Consumes one event on the control thread.
    pub fn handle<E: Editor>(&mut self, editor: &mut E, event: EngineEvent, now: Instant) -> Vec<Outcome> {
        match event {
            EngineEvent::RawFs(raw) => {
                self.on_raw_fs(editor, raw, now);
                Vec::new()
            }
            EngineEvent::Announce(announcement) => self.on_announcement(editor, announcement, now),
            EngineEvent::DocumentOpened(path) => {
                self.on_document_opened(editor, &path, now);
                Vec::new()
            }
            EngineEvent::DocumentClosed(path) => {
                self.on_document_closed(editor, &path, now);
                Vec::new()
            }
            EngineEvent::DocumentEdited(path) => {
                self.on_document_edited(editor, &path, now);
                Vec::new()
            }
            EngineEvent::FocusGained => {
                self.check_commit(editor);
                Vec::new()
            }
            EngineEvent::SessionStart => {
                if self.session.start(now) {
                    tracing::info!("agent session started");
                    if let Some(hl) = self.highlights.as_mut() {
                        hl.clear_all(editor);
                    }
                }
                Vec::new()
            }
            EngineEvent::SessionEnd => {
                if self.session.end(now, self.config.session_settle()) {
                    tracing::info!(deferred = self.pending.len(), "agent session ended");
                }
                Vec::new()
            }
            EngineEvent::ClearHighlights => {
                if let Some(hl) = self.highlights.as_mut() {
                    hl.clear_all(editor);
                }
                Vec::new()
            }
            EngineEvent::Recheck(path) => vec![self.reconcile_now(editor, &path, None, now)],
        }
    }

    /// Fires everything that is due: the session flush, debounced events, and
    /// marker/commit polls.
    pub fn tick<E: Editor>(&mut self, editor: &mut E, now: Instant) -> Vec<Outcome> {
        let mut outcomes = Vec::new();

        if self.next_marker_poll.is_some_and(|at| at <= now) {
            self.poll_marker(now);
            self.next_marker_poll = Some(now + self.config.marker_poll());
        }
        if self.next_commit_poll.is_some_and(|at| at <= now) {
            self.check_commit(editor);
            self.next_commit_poll = Some(now + self.config.commit_poll());
        }
        if self.session.take_due_flush(now) {
            outcomes.extend(self.flush_session(editor, now));
        }
        for event in self.debouncer.take_due(now) {
            outcomes.push(self.reconcile(editor, event, now));
        }
        outcomes
    }

    /// When the host should call [`ReconciliationEngine::tick`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.debouncer.next_deadline(),
            self.session.flush_deadline(),
            self.next_marker_poll,
            self.next_commit_poll,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Answers the `listOpenDocuments` announcement.
    pub fn list_open_documents<E: Editor>(&self, editor: &E) -> Vec<OpenDocument> {
        editor.open_documents()
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn pending(&self, path: &Path) -> Option<&PendingChange> {
        self.pending.get(path)
    }

    pub fn highlights(&self) -> Option<&HighlightLifecycle> {
        self.highlights.as_ref()
    }

    pub fn session_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains(path)
    }

    // ---------------------------------------------------------------------
    // Routing
    // ---------------------------------------------------------------------

    fn on_raw_fs<E: Editor>(&mut self, editor: &mut E, raw: RawFsEvent, now: Instant) {
        let mut marker_touched = false;
        let mut index_touched = false;
        for path in raw.paths {
            let path = normalize_path(&path);
            if self.marker.as_ref().is_some_and(|m| m.path() == path) {
                marker_touched = true;
            } else if self.commits.as_ref().is_some_and(|c| c.index_path() == path) {
                index_touched = true;
            } else if self.tracked.contains(&path) {
                tracing::debug!(path = %path.display(), "raw fs event");
                self.debouncer.push(ChangeEvent::new(path, EventOrigin::FsWatch, now), now);
            }
        }
        if marker_touched {
            self.poll_marker(now);
        }
        if index_touched {
            self.check_commit(editor);
        }
    }

    fn poll_marker(&mut self, now: Instant) {
        let Some(marker) = self.marker.as_mut() else {
            return;
        };
        let batch = match marker.poll() {
            Ok(Some(batch)) => batch,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("marker file unreadable, retrying later: {e}");
                return;
            }
        };
        if batch.skipped > 0 {
            tracing::warn!(skipped = batch.skipped, "malformed marker lines ignored");
        }
        for path in batch.paths {
            let path = normalize_path(&path);
            self.tracked.insert(path.clone());
            self.debouncer.push(ChangeEvent::new(path, EventOrigin::MarkerFile, now), now);
        }
    }

    fn check_commit<E: Editor>(&mut self, editor: &mut E) {
        let Some(commits) = self.commits.as_mut() else {
            return;
        };
        if commits.check() {
            tracing::info!("commit detected, clearing highlights");
            if let Some(hl) = self.highlights.as_mut() {
                hl.clear_all(editor);
            }
        }
    }

    fn on_announcement<E: Editor>(
        &mut self,
        editor: &mut E,
        announcement: Announcement,
        now: Instant,
    ) -> Vec<Outcome> {
        match announcement {
            Announcement::NotifyChange { path, hunks } => {
                let path = normalize_path(&path);
                self.tracked.insert(path.clone());
                let hunks = hunks.as_deref().map(convert_hunks).unwrap_or_default();
                let event = ChangeEvent::new(path, EventOrigin::Announcement, now).with_hunks(hunks);
                self.debouncer.push(event, now);
                Vec::new()
            }
            Announcement::SaveBaseline { path } => {
                let path = normalize_path(&path);
                if let Err(e) = self.save_baseline(editor, &path, now) {
                    tracing::warn!("baseline not saved: {e}");
                }
                Vec::new()
            }
            Announcement::ReloadRequest { path } => vec![self.reconcile_now(editor, &path, None, now)],
            Announcement::ClearHighlights => {
                if let Some(hl) = self.highlights.as_mut() {
                    hl.clear_all(editor);
                }
                Vec::new()
            }
        }
    }

    /// Seeds the snapshot for `path` from the open document, else from disk.
    fn save_baseline<E: Editor>(&mut self, editor: &E, path: &Path, now: Instant) -> Result<()> {
        self.tracked.insert(path.to_path_buf());
        let lines = match editor.document(path).and_then(|doc| editor.lines(doc)) {
            Some(lines) => lines,
            None => read_lines(path)?,
        };
        tracing::debug!(path = %path.display(), lines = lines.len(), "baseline saved");
        self.store.put(path, Snapshot::new(lines, now));
        Ok(())
    }

    fn on_document_opened<E: Editor>(&mut self, editor: &mut E, path: &Path, now: Instant) {
        let path = normalize_path(path);
        let Some(doc) = editor.document(&path) else {
            return;
        };
        self.tracked.insert(path.clone());
        if self.open_docs.insert(path.clone(), doc).is_none() {
            if let Some(watcher) = self.watcher.as_mut() {
                if let Err(e) = watcher.watch_file(&path) {
                    tracing::warn!(path = %path.display(), "cannot watch: {e}");
                }
            }
        }
        if let Some(lines) = editor.lines(doc) {
            self.store.put(path.clone(), Snapshot::new(lines, now));
        }

        // Session baselines belong to the flush; everything else is shown now.
        if self.pending.get(&path).is_some_and(|p| p.baseline.is_some()) {
            return;
        }
        let Some(entry) = self.pending.remove(&path) else {
            return;
        };
        if entry.pending {
            editor.notify(
                NoticeLevel::Info,
                &format!("{} changed on disk while closed", path.display()),
            );
        } else if !entry.hunks.is_empty() {
            if let Some(hl) = self.highlights.as_mut() {
                hl.apply_lines(editor, doc, entry.hunks.iter().copied());
            }
        }
    }

    fn on_document_closed<E: Editor>(&mut self, editor: &mut E, path: &Path, now: Instant) {
        let path = normalize_path(path);
        let Some(doc) = self.open_docs.remove(&path) else {
            return;
        };
        // Keep the last trusted content as the baseline for out-of-editor
        // changes. Unsaved edits never reached disk and are not trusted.
        if editor.is_dirty(doc) {
            match read_lines(&path) {
                Ok(lines) => {
                    self.store.put(path.clone(), Snapshot::new(lines, now));
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), "keeping previous baseline: {e}");
                }
            }
        } else if let Some(lines) = editor.lines(doc) {
            self.store.put(path.clone(), Snapshot::new(lines, now));
        }
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.unwatch_file(&path);
        }
        if let Some(hl) = self.highlights.as_mut() {
            hl.forget(doc);
        }
        self.debouncer.clear_cooldown(&path);
    }

    fn on_document_edited<E: Editor>(&mut self, editor: &mut E, path: &Path, now: Instant) {
        let path = normalize_path(path);
        let Some(doc) = editor.document(&path) else {
            return;
        };
        if let Some(hl) = self.highlights.as_mut() {
            if hl.on_user_edit(editor, doc, now) {
                tracing::debug!(path = %path.display(), "user edit cleared highlights");
            }
        }
    }
}

/// Reads `path` from disk as lines.
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read(path).map_err(|e| EngineError::io(path, e))?;
    Ok(split_lines(&String::from_utf8_lossy(&raw)))
}
