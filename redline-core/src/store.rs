//! Last-known-good snapshots, one per tracked path.
//!
//! The store is the only source of truth for "what did this file look like
//! before". It is mutated exclusively from the engine's control thread, so it
//! carries no internal locking. Nothing is evicted implicitly: entries stay
//! for the session's lifetime unless removed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::Snapshot;

#[derive(Debug, Default)]
pub struct ContentStore {
    snapshots: HashMap<PathBuf, Snapshot>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&Snapshot> {
        self.snapshots.get(path)
    }

    /// Stores `snapshot`, returning the one it replaced.
    pub fn put(&mut self, path: impl Into<PathBuf>, snapshot: Snapshot) -> Option<Snapshot> {
        self.snapshots.insert(path.into(), snapshot)
    }

    pub fn remove(&mut self, path: &Path) -> Option<Snapshot> {
        self.snapshots.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.snapshots.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn put_replaces_and_returns_previous() {
        let mut store = ContentStore::new();
        let now = Instant::now();
        assert!(store.put("/a", Snapshot::new(vec!["x".into()], now)).is_none());
        let old = store.put("/a", Snapshot::new(vec!["y".into()], now)).unwrap();
        assert_eq!(old.lines, vec!["x"]);
        assert_eq!(store.get(Path::new("/a")).unwrap().lines, vec!["y"]);
        assert_eq!(store.len(), 1);
        store.remove(Path::new("/a"));
        assert!(store.is_empty());
    }
}
