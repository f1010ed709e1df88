//! Central application state for redline.
//!
//! `AppState` owns every open document and all UI state: which document is
//! shown, scroll offsets, the latest notice. It is also the editor side of the
//! engine's collaborator contract: the engine reloads, highlights, and moves
//! cursors exclusively through the [`Editor`] impl at the bottom of this file.
//! No ratatui rendering logic lives here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ratatui::text::Line;
use ratatui::widgets::ListState;
use redline_core::source::normalize_path;
use redline_core::types::split_lines;
use redline_core::{DocumentId, Editor, HighlightTag, NoticeLevel, OpenDocument, Viewport, ViewportId};

/// Mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
}

/// One file loaded into the viewer.
///
/// The viewer is read-only, so documents are never dirty; the flag exists
/// because the engine asks.
#[derive(Debug)]
pub struct Document {
    pub id: DocumentId,
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub dirty: bool,
    /// 1-based line number to highlight attribute.
    pub highlights: BTreeMap<usize, HighlightTag>,
    /// Top visible line, 0-based. Doubles as the viewport's cursor line.
    pub scroll: usize,
    pub col: usize,
    /// Syntax-colored lines, rebuilt lazily after every load.
    pub styled: Option<Vec<Line<'static>>>,
}

impl Document {
    fn load(id: DocumentId, path: PathBuf) -> std::io::Result<Self> {
        let lines = read_lines(&path)?;
        Ok(Self {
            id,
            path,
            lines,
            dirty: false,
            highlights: BTreeMap::new(),
            scroll: 0,
            col: 0,
            styled: None,
        })
    }

    /// File name for list and title display.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// All mutable state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub documents: Vec<Document>,
    /// Index into `documents` of the one being shown.
    pub current: usize,
    next_id: u64,

    /// Stateful list widget backing the file-list panel (left).
    pub file_list_state: ListState,
    /// Inner height of the document panel, cached after each render.
    pub viewport_height: u16,
    pub help_scroll: u16,

    /// Latest message from the engine, shown in the status bar.
    pub notice: Option<(NoticeLevel, String)>,
    /// Mirrors the engine's session state for the status bar.
    pub session_active: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            documents: Vec::new(),
            current: 0,
            next_id: 0,
            file_list_state: ListState::default(),
            viewport_height: 0,
            help_scroll: 0,
            notice: None,
            session_active: false,
        }
    }
}

impl AppState {
    /// Loads `path` as a new document and returns its canonical path.
    ///
    /// Opening a path that is already open just selects it.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn open(&mut self, path: &Path) -> std::io::Result<PathBuf> {
        let path = normalize_path(path);
        if let Some(idx) = self.documents.iter().position(|d| d.path == path) {
            self.select(idx);
            return Ok(path);
        }
        self.next_id += 1;
        let doc = Document::load(DocumentId(self.next_id), path.clone())?;
        self.documents.push(doc);
        self.select(self.documents.len() - 1);
        Ok(path)
    }

    /// Closes the current document and returns its path.
    pub fn close_current(&mut self) -> Option<PathBuf> {
        if self.documents.is_empty() {
            return None;
        }
        let doc = self.documents.remove(self.current);
        self.select(self.current.min(self.documents.len().saturating_sub(1)));
        Some(doc.path)
    }

    pub fn current_doc(&self) -> Option<&Document> {
        self.documents.get(self.current)
    }

    pub fn current_doc_mut(&mut self) -> Option<&mut Document> {
        self.documents.get_mut(self.current)
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current_doc().map(|d| d.path.clone())
    }

    pub fn select(&mut self, idx: usize) {
        self.current = idx;
        self.file_list_state.select(if self.documents.is_empty() { None } else { Some(idx) });
    }

    /// Shows the next document (wraps around).
    pub fn next_doc(&mut self) {
        if !self.documents.is_empty() {
            self.select((self.current + 1) % self.documents.len());
        }
    }

    /// Shows the previous document (wraps around).
    pub fn prev_doc(&mut self) {
        if !self.documents.is_empty() {
            let len = self.documents.len();
            self.select((self.current + len - 1) % len);
        }
    }

    /// Scrolls the current document down by `lines` rows.
    pub fn scroll_down(&mut self, lines: usize) {
        if let Some(doc) = self.current_doc_mut() {
            doc.scroll = doc.scroll.saturating_add(lines).min(doc.lines.len().saturating_sub(1));
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if let Some(doc) = self.current_doc_mut() {
            doc.scroll = doc.scroll.saturating_sub(lines);
        }
    }

    pub fn scroll_top(&mut self) {
        if let Some(doc) = self.current_doc_mut() {
            doc.scroll = 0;
        }
    }

    pub fn scroll_bottom(&mut self) {
        if let Some(doc) = self.current_doc_mut() {
            doc.scroll = doc.lines.len().saturating_sub(1);
        }
    }

    /// Scrolls by half the cached viewport height (at least one line).
    pub fn half_page_down(&mut self) {
        self.scroll_down(usize::from(self.viewport_height / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(usize::from(self.viewport_height / 2).max(1));
    }

    /// Jumps to the next highlighted line below the top of the view.
    pub fn next_change(&mut self) {
        if let Some(doc) = self.current_doc_mut() {
            let top = doc.scroll + 1;
            if let Some((&line, _)) = doc.highlights.range(top + 1..).next() {
                doc.scroll = line - 1;
            }
        }
    }

    /// Jumps to the previous highlighted line above the top of the view.
    pub fn prev_change(&mut self) {
        if let Some(doc) = self.current_doc_mut() {
            let top = doc.scroll + 1;
            if let Some((&line, _)) = doc.highlights.range(..top).next_back() {
                doc.scroll = line - 1;
            }
        }
    }

    fn doc(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn doc_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }
}

/// The viewer side of the engine contract.
///
/// The viewer is read-only: `is_dirty` is always false and no
/// `DocumentEdited` event is ever sent, so the engine's unsaved-edits guard
/// and user-edit highlight expiry never trigger here. Editors with editable
/// buffers exercise those paths; highlights in the viewer expire on commit,
/// session start, or an explicit clear.
impl Editor for AppState {
    fn document(&self, path: &Path) -> Option<DocumentId> {
        self.documents.iter().find(|d| d.path == path).map(|d| d.id)
    }

    fn is_dirty(&self, doc: DocumentId) -> bool {
        self.doc(doc).is_some_and(|d| d.dirty)
    }

    fn lines(&self, doc: DocumentId) -> Option<Vec<String>> {
        self.doc(doc).map(|d| d.lines.clone())
    }

    fn reload_from_disk(&mut self, doc: DocumentId) -> std::io::Result<()> {
        let d = self
            .doc_mut(doc)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "document closed"))?;
        d.lines = read_lines(&d.path)?;
        d.styled = None;
        Ok(())
    }

    /// One viewport per document: its top line is the cursor.
    fn viewports(&self, doc: DocumentId) -> Vec<Viewport> {
        self.doc(doc)
            .map(|d| vec![Viewport { id: ViewportId(d.id.0), line: d.scroll + 1, col: d.col }])
            .unwrap_or_default()
    }

    fn set_cursor(&mut self, viewport: ViewportId, line: usize, col: usize) {
        if let Some(d) = self.doc_mut(DocumentId(viewport.0)) {
            d.scroll = line.saturating_sub(1);
            d.col = col;
        }
    }

    fn apply_line_highlight(&mut self, doc: DocumentId, line: usize, tag: HighlightTag) {
        if let Some(d) = self.doc_mut(doc) {
            d.highlights.insert(line, tag);
        }
    }

    fn clear_highlights(&mut self, doc: DocumentId) {
        if let Some(d) = self.doc_mut(doc) {
            d.highlights.clear();
        }
    }

    fn open_documents(&self) -> Vec<OpenDocument> {
        self.documents.iter().map(|d| OpenDocument { path: d.path.clone(), dirty: d.dirty }).collect()
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notice = Some((level, message.to_owned()));
    }
}

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let raw = std::fs::read(path)?;
    Ok(split_lines(&String::from_utf8_lossy(&raw)))
}
