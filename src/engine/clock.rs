// Session countdown. Pure state machine: the server loop owns the real
// interval and feeds one `tick()` per elapsed second.

use serde::Serialize;

use super::config::DEFAULT_SESSION_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    Ticking,
    Expired,
}

/// Outcome of feeding one tick to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The clock was not ticking; nothing changed.
    Ignored,
    /// One second elapsed; carries the seconds left.
    Ticked(u32),
    /// The countdown reached zero. Emitted exactly once per session.
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    remaining: u32,
}

impl SessionClock {
    pub fn new(seconds: u32) -> Self {
        Self {
            state: ClockState::Idle,
            remaining: seconds,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn time_remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_ticking(&self) -> bool {
        self.state == ClockState::Ticking
    }

    /// Idle -> Ticking. Returns false (and does nothing) in any other state.
    pub fn start(&mut self) -> bool {
        if self.state != ClockState::Idle {
            return false;
        }
        self.state = ClockState::Ticking;
        true
    }

    pub fn tick(&mut self) -> ClockEvent {
        if self.state != ClockState::Ticking {
            return ClockEvent::Ignored;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = ClockState::Expired;
            ClockEvent::Expired
        } else {
            ClockEvent::Ticked(self.remaining)
        }
    }

    /// Back to Idle with a fresh budget. Ticks are ignored until the next `start()`.
    pub fn reset(&mut self, seconds: u32) {
        self.state = ClockState::Idle;
        self.remaining = seconds;
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_SECONDS)
    }
}
