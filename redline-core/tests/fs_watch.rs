//! The platform watcher against a real directory.

use std::time::Duration;

use crossbeam_channel::unbounded;
use redline_core::source::{normalize_path, FsWatcher};

#[test]
fn writes_to_a_watched_file_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, "one\n").unwrap();
    let path = normalize_path(&path);

    let (tx, rx) = unbounded();
    let mut watcher = FsWatcher::new(move |raw| {
        let _ = tx.send(raw);
    })
    .unwrap();
    watcher.watch_file(&path).unwrap();
    std::fs::write(&path, "two\n").unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    let mut seen = false;
    while let Some(left) = deadline.checked_duration_since(std::time::Instant::now()) {
        let Ok(raw) = rx.recv_timeout(left) else {
            break;
        };
        if raw.paths.iter().any(|p| normalize_path(p) == path) {
            seen = true;
            break;
        }
    }
    assert!(seen, "no event for {}", path.display());
}

#[test]
fn directories_are_refcounted() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let mut watcher = FsWatcher::new(|_| {}).unwrap();

    watcher.watch_file(&a).unwrap();
    watcher.watch_file(&b).unwrap();
    assert_eq!(watcher.watched_dirs(), 1);

    watcher.unwatch_file(&a);
    assert_eq!(watcher.watched_dirs(), 1);
    watcher.unwatch_file(&b);
    assert_eq!(watcher.watched_dirs(), 0);
}
