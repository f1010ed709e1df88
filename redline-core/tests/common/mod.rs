//! Shared fixtures: a scripted in-memory editor backed by real files.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use std::time::Duration;

use redline_core::source::{normalize_path, RawFsEvent};
use redline_core::{
    DocumentId, Editor, EngineConfig, EngineEvent, HighlightTag, NoticeLevel, OpenDocument, ReconciliationEngine,
    Viewport, ViewportId,
};

#[derive(Debug)]
pub struct FakeDoc {
    pub path: PathBuf,
    pub lines: Vec<String>,
    pub dirty: bool,
    pub highlights: BTreeMap<usize, HighlightTag>,
    pub cursor: (usize, usize),
    pub fail_reload: bool,
}

#[derive(Debug, Default)]
pub struct FakeEditor {
    docs: BTreeMap<u64, FakeDoc>,
    next_id: u64,
    pub reloads: Vec<PathBuf>,
    pub notices: Vec<(NoticeLevel, String)>,
}

impl FakeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `path` from disk and returns its canonical path.
    pub fn open(&mut self, path: &Path) -> PathBuf {
        let path = normalize_path(path);
        let lines = read(&path);
        self.next_id += 1;
        self.docs.insert(
            self.next_id,
            FakeDoc {
                path: path.clone(),
                lines,
                dirty: false,
                highlights: BTreeMap::new(),
                cursor: (1, 0),
                fail_reload: false,
            },
        );
        path
    }

    pub fn close(&mut self, path: &Path) {
        self.docs.retain(|_, d| d.path != path);
    }

    pub fn doc(&self, path: &Path) -> &FakeDoc {
        self.docs.values().find(|d| d.path == path).expect("document open")
    }

    pub fn doc_mut(&mut self, path: &Path) -> &mut FakeDoc {
        self.docs.values_mut().find(|d| d.path == path).expect("document open")
    }

    pub fn set_dirty(&mut self, path: &Path, dirty: bool) {
        self.doc_mut(path).dirty = dirty;
    }

    pub fn highlighted(&self, path: &Path) -> Vec<usize> {
        self.doc(path).highlights.keys().copied().collect()
    }

    pub fn reload_count(&self, path: &Path) -> usize {
        self.reloads.iter().filter(|p| *p == path).count()
    }
}

impl Editor for FakeEditor {
    fn document(&self, path: &Path) -> Option<DocumentId> {
        self.docs.iter().find(|(_, d)| d.path == path).map(|(id, _)| DocumentId(*id))
    }

    fn is_dirty(&self, doc: DocumentId) -> bool {
        self.docs.get(&doc.0).is_some_and(|d| d.dirty)
    }

    fn lines(&self, doc: DocumentId) -> Option<Vec<String>> {
        self.docs.get(&doc.0).map(|d| d.lines.clone())
    }

    fn reload_from_disk(&mut self, doc: DocumentId) -> std::io::Result<()> {
        let d = self
            .docs
            .get_mut(&doc.0)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
        if d.fail_reload {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "reload refused"));
        }
        d.lines = read(&d.path);
        self.reloads.push(d.path.clone());
        Ok(())
    }

    fn viewports(&self, doc: DocumentId) -> Vec<Viewport> {
        self.docs
            .get(&doc.0)
            .map(|d| vec![Viewport { id: ViewportId(doc.0), line: d.cursor.0, col: d.cursor.1 }])
            .unwrap_or_default()
    }

    fn set_cursor(&mut self, viewport: ViewportId, line: usize, col: usize) {
        if let Some(d) = self.docs.get_mut(&viewport.0) {
            d.cursor = (line, col);
        }
    }

    fn apply_line_highlight(&mut self, doc: DocumentId, line: usize, tag: HighlightTag) {
        if let Some(d) = self.docs.get_mut(&doc.0) {
            d.highlights.insert(line, tag);
        }
    }

    fn clear_highlights(&mut self, doc: DocumentId) {
        if let Some(d) = self.docs.get_mut(&doc.0) {
            d.highlights.clear();
        }
    }

    fn open_documents(&self) -> Vec<OpenDocument> {
        self.docs.values().map(|d| OpenDocument { path: d.path.clone(), dirty: d.dirty }).collect()
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push((level, message.to_owned()));
    }
}

pub fn read(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| redline_core::types::split_lines(&s))
        .unwrap_or_default()
}

/// Writes `lines` (newline-terminated) to `path`.
pub fn write(path: &Path, lines: &[&str]) {
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(path, body).unwrap();
}

pub fn lines(s: &[&str]) -> Vec<String> {
    s.iter().map(|l| (*l).to_owned()).collect()
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// An engine with the default timing policy and no watchers.
pub fn engine() -> ReconciliationEngine {
    ReconciliationEngine::new(EngineConfig::default())
}

/// What the filesystem watcher would deliver for a write to `path`.
pub fn fs_event(path: &Path) -> EngineEvent {
    EngineEvent::RawFs(RawFsEvent { paths: vec![path.to_path_buf()] })
}

/// Creates `name` under `dir` with `content` and returns its canonical path.
pub fn create(dir: &Path, name: &str, content: &[&str]) -> PathBuf {
    let path = dir.join(name);
    write(&path, content);
    normalize_path(&path)
}
