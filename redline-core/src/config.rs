//! Engine configuration.
//!
//! One timing policy for every variant of change source: a short per-path
//! quiet window, a longer post-reconciliation cooldown, and a reload guard
//! that outlives the reload's own change notifications. All values are
//! overridable from the `[engine]` table of the redline config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{EngineError, Result};

/// Which diff primitive the [`DiffEngine`](crate::diff) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Patience diff: anchors on unique lines, close to histogram diff.
    #[default]
    Patience,
    Myers,
    Lcs,
    /// O(n) index-by-index comparison, no alignment.
    Positional,
}

/// Tunables for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-path quiet window before a burst of events fires.
    pub debounce_ms: u64,
    /// Suppression window after a completed reconciliation.
    pub cooldown_ms: u64,
    /// How long user edits are ignored after the engine reloads a document.
    pub reload_guard_ms: u64,
    /// Delay between an agent session ending and the pending-change flush.
    pub session_settle_ms: u64,
    /// Marker-file mtime poll interval.
    pub marker_poll_ms: u64,
    /// VCS index mtime poll interval.
    pub commit_poll_ms: u64,
    pub diff_algorithm: DiffAlgorithm,
    /// Enables the highlight capability. When off, reconciliation still
    /// reloads documents but never marks lines.
    pub highlights: bool,
    /// Optional marker file; relative paths resolve against the project root.
    pub marker_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            cooldown_ms: 750,
            reload_guard_ms: 250,
            session_settle_ms: 500,
            marker_poll_ms: 250,
            commit_poll_ms: 1000,
            diff_algorithm: DiffAlgorithm::default(),
            highlights: true,
            marker_file: None,
        }
    }
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn reload_guard(&self) -> Duration {
        Duration::from_millis(self.reload_guard_ms)
    }

    pub fn session_settle(&self) -> Duration {
        Duration::from_millis(self.session_settle_ms)
    }

    pub fn marker_poll(&self) -> Duration {
        Duration::from_millis(self.marker_poll_ms)
    }

    pub fn commit_poll(&self) -> Duration {
        Duration::from_millis(self.commit_poll_ms)
    }

    /// Parses the `[engine]` table out of a full config document.
    ///
    /// A document without an `[engine]` table yields the defaults.
    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        #[derive(Deserialize, Default)]
        struct File {
            #[serde(default)]
            engine: EngineConfig,
        }
        Ok(toml::from_str::<File>(raw)?.engine)
    }

    /// Loads the config from `path`.
    ///
    /// A missing file is not an error and yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] if the file exists but cannot be read and
    /// [`EngineError::Config`] if it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(EngineError::io(path, e)),
        };
        Self::from_toml(&raw).map_err(|source| EngineError::Config { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_defaults() {
        let cfg = EngineConfig::from_toml("theme = \"dark\"\n[engine]\ndebounce_ms = 40\ndiff_algorithm = \"positional\"\n")
            .unwrap();
        assert_eq!(cfg.debounce_ms, 40);
        assert_eq!(cfg.diff_algorithm, DiffAlgorithm::Positional);
        assert_eq!(cfg.cooldown_ms, EngineConfig::default().cooldown_ms);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn garbage_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\ndebounce_ms = \"soon\"\n").unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(EngineError::Config { .. })));
    }
}
