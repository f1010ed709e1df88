mod common;

use std::fs;

use common::{create, engine, lines, ms, write, FakeEditor};
use redline_core::source::MarkerFile;
use redline_core::{EngineEvent, Outcome};
use tokio::time::Instant;

#[test]
fn duplicate_marker_entries_reconcile_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path(), "a.txt", &["old"]);
    let marker_path = dir.path().join("state").join("changes");
    let mut editor = FakeEditor::new();
    let mut engine = engine();
    let t0 = Instant::now();

    engine.enable_marker_file(&marker_path, t0).unwrap();
    assert!(marker_path.exists());

    editor.open(&path);
    engine.handle(&mut editor, EngineEvent::DocumentOpened(path.clone()), t0);
    write(&path, &["new"]);
    fs::write(&marker_path, format!("{0}\n{0}\n", path.display())).unwrap();

    // The poll picks up both lines; the debounce window has not elapsed yet.
    assert!(engine.tick(&mut editor, t0 + ms(250)).is_empty());
    assert_eq!(fs::metadata(&marker_path).unwrap().len(), 0);

    let outcomes = engine.tick(&mut editor, t0 + ms(350));
    assert!(matches!(outcomes.as_slice(), [Outcome::Reloaded { .. }]), "{outcomes:?}");
    assert_eq!(editor.reload_count(&path), 1);
    assert_eq!(editor.doc(&path).lines, lines(&["new"]));
}

#[test]
fn marker_tracks_paths_not_yet_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path(), "late.txt", &["x"]);
    let marker_path = dir.path().join("changes");
    let mut editor = FakeEditor::new();
    let mut engine = engine();
    let t0 = Instant::now();

    engine.enable_marker_file(&marker_path, t0).unwrap();
    fs::write(&marker_path, format!("{}\n", path.display())).unwrap();
    engine.tick(&mut editor, t0 + ms(250));
    assert!(engine.is_tracked(&path));

    let outcomes = engine.tick(&mut editor, t0 + ms(350));
    assert_eq!(outcomes, vec![Outcome::MarkedWholeFile { path: path.clone() }]);
}

#[test]
fn poll_is_quiet_until_the_marker_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut marker = MarkerFile::new(dir.path().join("changes"));
    marker.ensure_exists().unwrap();
    assert!(marker.poll().unwrap().is_none());

    fs::write(marker.path(), "/abs/one\nrelative\n\n/abs/two\r\n").unwrap();
    let batch = marker.poll().unwrap().unwrap();
    assert_eq!(batch.paths, vec![std::path::PathBuf::from("/abs/one"), std::path::PathBuf::from("/abs/two")]);
    assert_eq!(batch.skipped, 1);

    assert!(marker.poll().unwrap().is_none());
}

#[test]
fn missing_marker_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut marker = MarkerFile::new(dir.path().join("never-created"));
    assert!(marker.poll().unwrap().is_none());
}
