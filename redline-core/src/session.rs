//! Agent session gating.
//!
//! While a session is active, changes to open clean documents are deferred
//! instead of reconciled, so the engine does not fight an agent that saves the
//! same file many times in a row. Ending the session schedules one flush after
//! a settle delay, letting the agent's final writes land first.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct Session {
    active: bool,
    started_at: Option<Instant>,
    flush_at: Option<Instant>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Starts a session. A flush still waiting from a previous session is
    /// cancelled: its deferred changes roll into the new session.
    ///
    /// Returns `false` if a session was already active.
    pub fn start(&mut self, now: Instant) -> bool {
        self.flush_at = None;
        if self.active {
            return false;
        }
        self.active = true;
        self.started_at = Some(now);
        true
    }

    /// Ends the session and schedules the flush `settle` from now.
    ///
    /// Returns `false` if no session was active.
    pub fn end(&mut self, now: Instant, settle: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.started_at = None;
        self.flush_at = Some(now + settle);
        true
    }

    pub fn flush_deadline(&self) -> Option<Instant> {
        self.flush_at
    }

    /// Consumes the flush deadline if it has passed.
    pub fn take_due_flush(&mut self, now: Instant) -> bool {
        match self.flush_at {
            Some(at) if at <= now => {
                self.flush_at = None;
                true
            }
            _ => false,
        }
    }
}
