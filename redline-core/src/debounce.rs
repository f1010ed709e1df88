//! Per-path debouncing and post-reconciliation cooldown.
//!
//! Pure timing: the debouncer never reads files or consults the editor. Every
//! method takes `now` explicitly so the control thread owns the clock.
//!
//! - Quiet window: each raw event for a path (re)starts that path's timer.
//!   Only when the timer elapses without a newer event does the path fire,
//!   once, carrying the merged event.
//! - Cooldown: after the engine completes a reconciliation it calls
//!   [`Debouncer::start_cooldown`]. Events observed before the cooldown ends
//!   are dropped; they are the echo of the engine's own reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

use crate::types::ChangeEvent;

#[derive(Debug)]
struct Slot {
    event: ChangeEvent,
    fire_at: Instant,
    raw_count: usize,
}

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    cooldown: Duration,
    slots: HashMap<PathBuf, Slot>,
    cooling: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration, cooldown: Duration) -> Self {
        Self { quiet, cooldown, slots: HashMap::new(), cooling: HashMap::new() }
    }

    /// Records a raw event, restarting the path's quiet window.
    ///
    /// Returns `false` when the event was dropped by an active cooldown.
    pub fn push(&mut self, event: ChangeEvent, now: Instant) -> bool {
        if self.suppressed(&event.path, event.observed_at) {
            tracing::debug!(path = %event.path.display(), "event dropped during cooldown");
            return false;
        }
        let fire_at = now + self.quiet;
        match self.slots.get_mut(&event.path) {
            Some(slot) => {
                slot.event.absorb(event);
                slot.fire_at = fire_at;
                slot.raw_count += 1;
            }
            None => {
                self.slots.insert(event.path.clone(), Slot { event, fire_at, raw_count: 1 });
            }
        }
        true
    }

    /// Removes and returns every event whose quiet window has elapsed.
    ///
    /// Results are ordered by path so a burst across files reconciles
    /// deterministically.
    pub fn take_due(&mut self, now: Instant) -> Vec<ChangeEvent> {
        self.cooling.retain(|_, until| *until > now);

        let due: Vec<PathBuf> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.fire_at <= now)
            .map(|(path, _)| path.clone())
            .collect();

        let mut fired = Vec::with_capacity(due.len());
        for path in due {
            let Some(slot) = self.slots.remove(&path) else {
                continue;
            };
            if self.suppressed(&path, slot.event.observed_at) {
                continue;
            }
            tracing::debug!(path = %path.display(), raw = slot.raw_count, "debounced event fired");
            fired.push(slot.event);
        }
        fired.sort_by(|a, b| a.path.cmp(&b.path));
        fired
    }

    /// Earliest instant at which [`Debouncer::take_due`] can return something.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().map(|slot| slot.fire_at).min()
    }

    /// Suppresses events for `path` observed before `now + cooldown`.
    pub fn start_cooldown(&mut self, path: &Path, now: Instant) {
        self.cooling.insert(path.to_path_buf(), now + self.cooldown);
    }

    /// Lifts the cooldown early, e.g. after a failed reload.
    pub fn clear_cooldown(&mut self, path: &Path) {
        self.cooling.remove(path);
    }

    pub fn in_cooldown(&self, path: &Path, now: Instant) -> bool {
        self.suppressed(path, now)
    }

    /// Cancels a not-yet-fired event for `path`.
    pub fn cancel(&mut self, path: &Path) -> Option<ChangeEvent> {
        self.slots.remove(path).map(|slot| slot.event)
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.slots.contains_key(path)
    }

    fn suppressed(&self, path: &Path, observed_at: Instant) -> bool {
        self.cooling.get(path).is_some_and(|until| observed_at < *until)
    }
}
