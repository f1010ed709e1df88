//! Async driver for hosts without their own event loop.
//!
//! Hosts that already run a single-threaded loop (like the redline viewer)
//! call [`ReconciliationEngine::handle`] and [`ReconciliationEngine::tick`]
//! themselves. Everything else can hand the engine, the editor, and the
//! receiving end of an [`EngineHandle`](super::EngineHandle) queue to [`run`].

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};

use super::{EngineEvent, ReconciliationEngine};
use crate::editor::Editor;

/// Drives `engine` until every sender of `rx` is dropped, then returns it.
///
/// Events and timers are processed strictly one at a time on the calling
/// task, so engine state is never touched concurrently.
pub async fn run<E: Editor>(
    mut engine: ReconciliationEngine,
    editor: &mut E,
    mut rx: UnboundedReceiver<EngineEvent>,
) -> ReconciliationEngine {
    loop {
        let deadline = engine.next_deadline();
        tokio::select! {
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => {
                    engine.handle(editor, event, Instant::now());
                }
                None => break,
            },
            _ = wait_for(deadline) => {
                engine.tick(editor, Instant::now());
            }
        }
    }
    engine
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
