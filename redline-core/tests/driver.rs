mod common;

use std::time::Duration;

use common::{create, fs_event, lines, write, FakeEditor};
use redline_core::engine::run;
use redline_core::{EngineConfig, EngineEvent, EngineHandle, ReconciliationEngine};

#[tokio::test(start_paused = true)]
async fn run_reconciles_queued_events_until_the_queue_closes() {
    let dir = tempfile::tempdir().unwrap();
    let path = create(dir.path(), "a.txt", &["a"]);
    let mut editor = FakeEditor::new();
    editor.open(&path);

    let (handle, rx) = EngineHandle::channel();
    assert!(handle.send(EngineEvent::DocumentOpened(path.clone())));
    write(&path, &["a", "b"]);
    assert!(handle.send(fs_event(&path)));

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        drop(handle);
    });

    let engine = run(ReconciliationEngine::new(EngineConfig::default()), &mut editor, rx).await;

    assert_eq!(editor.reload_count(&path), 1);
    assert_eq!(editor.doc(&path).lines, lines(&["a", "b"]));
    assert_eq!(editor.highlighted(&path), vec![2]);
    assert!(engine.is_tracked(&path));
    assert_eq!(engine.next_deadline(), None);
}

#[tokio::test(start_paused = true)]
async fn send_fails_once_the_engine_is_gone() {
    let (handle, rx) = EngineHandle::channel();
    drop(rx);
    assert!(!handle.send(EngineEvent::SessionStart));
}
