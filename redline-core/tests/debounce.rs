//! Quiet-window coalescing and post-reconciliation cooldown.

use std::path::{Path, PathBuf};
use std::time::Duration;

use redline_core::debounce::Debouncer;
use redline_core::{ChangeEvent, ChangeHunk, EventOrigin, HunkKind};
use tokio::time::Instant;

const QUIET: Duration = Duration::from_millis(100);
const COOLDOWN: Duration = Duration::from_millis(750);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn event(path: &str, at: Instant) -> ChangeEvent {
    ChangeEvent::new(PathBuf::from(path), EventOrigin::FsWatch, at)
}

#[test]
fn burst_collapses_to_one_trigger() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    for i in 0..10 {
        let at = t0 + ms(i * 20);
        assert!(d.push(event("/a.txt", at), at));
    }
    // Last raw event at 180ms; nothing fires until 280ms.
    assert!(d.take_due(t0 + ms(279)).is_empty());
    let fired = d.take_due(t0 + ms(280));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].path, Path::new("/a.txt"));
    assert!(d.take_due(t0 + ms(1000)).is_empty());
    assert_eq!(d.next_deadline(), None);
}

#[test]
fn each_event_restarts_the_window() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    d.push(event("/a.txt", t0), t0);
    assert_eq!(d.next_deadline(), Some(t0 + QUIET));
    d.push(event("/a.txt", t0 + ms(90)), t0 + ms(90));
    assert_eq!(d.next_deadline(), Some(t0 + ms(190)));
    assert!(d.take_due(t0 + ms(150)).is_empty());
}

#[test]
fn paths_fire_independently_in_path_order() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    d.push(event("/b.txt", t0), t0);
    d.push(event("/a.txt", t0 + ms(10)), t0 + ms(10));
    d.push(event("/c.txt", t0 + ms(80)), t0 + ms(80));
    let fired: Vec<PathBuf> = d.take_due(t0 + ms(110)).into_iter().map(|e| e.path).collect();
    assert_eq!(fired, vec![PathBuf::from("/a.txt"), PathBuf::from("/b.txt")]);
    assert!(d.is_pending(Path::new("/c.txt")));
}

#[test]
fn cooldown_suppresses_events_observed_before_it_ends() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    d.start_cooldown(Path::new("/a.txt"), t0);

    let echo = t0 + ms(200);
    assert!(!d.push(event("/a.txt", echo), echo));
    assert!(d.in_cooldown(Path::new("/a.txt"), echo));
    // Other paths are unaffected.
    assert!(d.push(event("/b.txt", echo), echo));

    let later = t0 + COOLDOWN;
    assert!(d.push(event("/a.txt", later), later));
    assert_eq!(d.take_due(later + QUIET).len(), 2);
}

#[test]
fn cleared_cooldown_lets_events_through() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    d.start_cooldown(Path::new("/a.txt"), t0);
    d.clear_cooldown(Path::new("/a.txt"));
    assert!(d.push(event("/a.txt", t0), t0));
}

#[test]
fn announced_hunks_merge_within_a_window() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    let first = event("/a.txt", t0).with_hunks(vec![ChangeHunk::new(1, 1, HunkKind::Modified)]);
    let second = event("/a.txt", t0).with_hunks(vec![ChangeHunk::new(5, 6, HunkKind::Added)]);
    d.push(first, t0);
    d.push(second, t0 + ms(10));
    let fired = d.take_due(t0 + ms(200));
    assert_eq!(fired[0].hunks.as_ref().map(Vec::len), Some(2));
}

#[test]
fn cancel_removes_a_queued_event() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(QUIET, COOLDOWN);
    d.push(event("/a.txt", t0), t0);
    assert!(d.cancel(Path::new("/a.txt")).is_some());
    assert!(d.take_due(t0 + ms(500)).is_empty());
}
