mod common;

use std::fs::File;
use std::time::{Duration, SystemTime};

use common::{create, engine, write, FakeEditor};
use redline_core::commit::CommitWatcher;
use redline_core::EngineEvent;
use tokio::time::Instant;

fn init_repo(dir: &std::path::Path) -> std::path::PathBuf {
    let repo = git2::Repository::init(dir).unwrap();
    let mut index = repo.index().unwrap();
    index.write().unwrap();
    repo.path().join("index")
}

fn bump_mtime(path: &std::path::Path, by: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + by).unwrap();
}

#[test]
fn first_observation_is_not_a_commit() {
    let dir = tempfile::tempdir().unwrap();
    let index = init_repo(dir.path());
    let mut watcher = CommitWatcher::for_index(index.clone());
    assert!(!watcher.check());

    bump_mtime(&index, Duration::from_secs(5));
    assert!(watcher.check());
    assert!(!watcher.check());
}

#[test]
fn missing_index_never_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut watcher = CommitWatcher::for_index(dir.path().join("index"));
    assert!(!watcher.check());
}

#[test]
fn discover_fails_outside_a_repository() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine();
    assert!(engine.enable_commit_detection(dir.path(), Instant::now()).is_err());
}

#[test]
fn focus_regain_after_a_commit_clears_highlights() {
    let dir = tempfile::tempdir().unwrap();
    let index = init_repo(dir.path());
    let path = create(dir.path(), "a.txt", &["a"]);
    let mut editor = FakeEditor::new();
    let mut engine = engine();
    let t0 = Instant::now();

    engine.enable_commit_detection(dir.path(), t0).unwrap();
    editor.open(&path);
    engine.handle(&mut editor, EngineEvent::DocumentOpened(path.clone()), t0);
    write(&path, &["b"]);
    engine.handle(&mut editor, EngineEvent::Recheck(path.clone()), t0);
    assert_eq!(editor.highlighted(&path), vec![1]);

    // Focus regained without a commit: nothing changes.
    engine.handle(&mut editor, EngineEvent::FocusGained, t0);
    assert_eq!(editor.highlighted(&path), vec![1]);

    bump_mtime(&index, Duration::from_secs(5));
    engine.handle(&mut editor, EngineEvent::FocusGained, t0);
    assert!(editor.highlighted(&path).is_empty());
}
