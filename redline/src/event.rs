//! Event bus for redline.
//!
//! All terminal input and timer ticks are normalised into a single `AppEvent`
//! enum and sent over a tokio unbounded MPSC channel. The main loop receives
//! from this channel alongside the engine's own queue and dispatches
//! accordingly.
//!
//! Only the render cycle runs on a fixed interval (33 ms ≈ 30 FPS). Engine
//! timers are not polled here: the main loop sleeps until the engine's next
//! deadline instead.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// All events the application can receive from the terminal.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are filtered in [`spawn_event_task`] to avoid
    /// double-firing on Windows, which synthesises both press and release for
    /// every keystroke.
    Key(KeyEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Render tick; triggers a `terminal.draw()` call.
    Render,
    /// The terminal window regained focus. Feeds commit detection.
    FocusGained,
}

/// Holds the sender and receiver ends of the unified event channel.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that drives the terminal side of the
/// event channel.
///
/// `reader.next().fuse()` keeps `tokio::select!` from polling a completed
/// future if the crossterm stream ever terminates. Send errors are ignored:
/// once the receiver is gone the process is shutting down anyway.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = render_tick => {
                    if tx.send(AppEvent::Render).is_err() {
                        break;
                    }
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(w, h))) => {
                            let _ = tx.send(AppEvent::Resize(w, h));
                        }
                        Some(Ok(Event::FocusGained)) => {
                            let _ = tx.send(AppEvent::FocusGained);
                        }
                        _ => {}
                    }
                }
            }
        }
    });
}
