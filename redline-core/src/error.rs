use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by fallible engine setup and disk access.
///
/// Event handling itself never returns these to the host: per-event failures
/// are logged and degrade to "no highlight" or "notify and skip".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("invalid config in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("reload of {} failed: {reason}", path.display())]
    Reload { path: PathBuf, reason: String },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
