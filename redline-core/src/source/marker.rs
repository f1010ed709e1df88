//! Marker-file change source.
//!
//! The agent appends absolute paths, one per line, to a single marker file.
//! The engine watches that file's mtime; when it moves (or the file is
//! non-empty) the content is read, the file truncated, and every listed path
//! becomes a change event. Malformed lines are skipped one by one.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{EngineError, Result};

/// Paths parsed out of one marker read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerBatch {
    pub paths: Vec<PathBuf>,
    /// Lines that were not a usable absolute path.
    pub skipped: usize,
}

#[derive(Debug)]
pub struct MarkerFile {
    path: PathBuf,
    last_mtime: Option<SystemTime>,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), last_mtime: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the marker file (and its directory) empty if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the directory or file cannot be created.
    pub fn ensure_exists(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EngineError::io(&self.path, e))?;
        self.last_mtime = mtime(&self.path);
        Ok(())
    }

    /// Consumes the marker if it changed since the last poll.
    ///
    /// Returns `Ok(None)` when nothing changed. A missing marker file is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file exists but cannot be read or
    /// truncated; the caller retries on the next poll.
    pub fn poll(&mut self) -> Result<Option<MarkerBatch>> {
        let meta = match std::fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::io(&self.path, e)),
        };
        let current = meta.modified().ok();
        if current == self.last_mtime && meta.len() == 0 {
            return Ok(None);
        }
        let batch = self.consume()?;
        self.last_mtime = mtime(&self.path);
        Ok(Some(batch))
    }

    /// Reads the marker content and truncates it to empty.
    fn consume(&self) -> Result<MarkerBatch> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| EngineError::io(&self.path, e))?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw).map_err(|e| EngineError::io(&self.path, e))?;
        if !raw.is_empty() {
            file.set_len(0).map_err(|e| EngineError::io(&self.path, e))?;
            file.seek(SeekFrom::Start(0)).map_err(|e| EngineError::io(&self.path, e))?;
        }
        Ok(parse_marker(&raw))
    }
}

/// Parses marker content: one absolute path per `\n` or `\r\n` line.
///
/// Blank lines are ignored silently. Lines that are not UTF-8, contain NUL, or
/// are not absolute count as skipped.
pub fn parse_marker(raw: &[u8]) -> MarkerBatch {
    let mut batch = MarkerBatch::default();
    for line in raw.split(|b| *b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let Ok(text) = std::str::from_utf8(line) else {
            batch.skipped += 1;
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let path = Path::new(text);
        if text.contains('\0') || !path.is_absolute() {
            batch.skipped += 1;
            continue;
        }
        batch.paths.push(path.to_path_buf());
    }
    batch
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
