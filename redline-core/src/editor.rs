//! The collaborator contract the engine expects from the editor integration.
//!
//! The editor owns every live buffer. The engine only ever holds a
//! [`DocumentId`], a weak handle that it re-resolves through
//! [`Editor::document`] before each use; it never assumes a document is
//! still alive.

use std::path::Path;

use crate::types::OpenDocument;

/// Opaque, weak reference to an editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// Opaque reference to one view onto a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportId(pub u64);

/// Cursor position of one viewport. `line` is 1-based, `col` 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub id: ViewportId,
    pub line: usize,
    pub col: usize,
}

/// Attribute attached to a highlighted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightTag {
    /// Line introduced by the external change.
    Added,
    /// Line rewritten by the external change.
    Modified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

pub trait Editor {
    /// Resolves the live document for a canonical path, if one is open.
    fn document(&self, path: &Path) -> Option<DocumentId>;

    /// True when the document holds unsaved local edits.
    fn is_dirty(&self, doc: DocumentId) -> bool;

    /// Current buffer content, or `None` if the document went away.
    fn lines(&self, doc: DocumentId) -> Option<Vec<String>>;

    /// Replaces the buffer with the file's on-disk content.
    fn reload_from_disk(&mut self, doc: DocumentId) -> std::io::Result<()>;

    /// Every viewport currently showing `doc`.
    fn viewports(&self, doc: DocumentId) -> Vec<Viewport>;

    fn set_cursor(&mut self, viewport: ViewportId, line: usize, col: usize);

    fn apply_line_highlight(&mut self, doc: DocumentId, line: usize, tag: HighlightTag);

    fn clear_highlights(&mut self, doc: DocumentId);

    fn open_documents(&self) -> Vec<OpenDocument>;

    /// Surfaces a user-facing message.
    fn notify(&mut self, level: NoticeLevel, message: &str);
}
