//! Outbound send gate.
//!
//! Fixed-window counter: at most `max_per_window` sends are admitted per
//! window; the quota is fully restored when the window elapses, however
//! much of it was used. Refused sends are dropped by the caller, never
//! queued.

use crate::config::RATE_WINDOW_MS;

/// Whether a send consults the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicy {
    /// Normal traffic; dropped when the window quota is exhausted.
    Limited,
    /// Stop commands that must always go out.
    Bypass,
}

pub struct RateLimiter {
    max_per_window: u32,
    window_ms: u64,
    remaining: u32,
    window_start_ms: Option<u64>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self::with_window(max_per_window, RATE_WINDOW_MS)
    }

    pub fn with_window(max_per_window: u32, window_ms: u64) -> Self {
        Self {
            max_per_window,
            window_ms,
            remaining: max_per_window,
            window_start_ms: None,
        }
    }

    /// Consume one send from the current window. Returns `false` when the
    /// quota is exhausted.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        match self.window_start_ms {
            Some(start) if now_ms.saturating_sub(start) < self.window_ms => {}
            _ => {
                self.window_start_ms = Some(now_ms);
                self.remaining = self.max_per_window;
            }
        }

        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Sends still available in the current window.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }
}
