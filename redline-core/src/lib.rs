//! Change detection, debounce, diff, and reconciliation for documents that an
//! external agent edits on disk while they are open in an editor.
//!
//! The engine decides, per tracked path, whether a file changed since it was
//! last known, whether it is safe to reload the live document now, and which
//! lines changed relative to a trusted snapshot. It never overwrites unsaved
//! local edits and never loses change information for closed files.

pub mod commit;
pub mod config;
pub mod debounce;
pub mod diff;
pub mod editor;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod session;
pub mod source;
pub mod store;
pub mod types;

pub use config::{DiffAlgorithm, EngineConfig};
pub use editor::{DocumentId, Editor, HighlightTag, NoticeLevel, Viewport, ViewportId};
pub use engine::{EngineEvent, EngineHandle, Outcome, ReconciliationEngine};
pub use error::{EngineError, Result};
pub use types::{ChangeEvent, ChangeHunk, EventOrigin, HunkKind, OpenDocument, PendingChange, Snapshot};
