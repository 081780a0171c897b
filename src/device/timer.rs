//! Single-slot cooperative timer owned by a motor.
//!
//! A slot holds at most one pending action. Arming always cancels what
//! was there first, so a replaced timer can never fire.

/// Opaque identity of an armed timer. Unique per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u32);

/// What a motor does when its timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// End of a timed run.
    StartBraking,
    /// End of active braking.
    TurnOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub handle: TimerHandle,
    pub action: TimerAction,
    pub started_at_ms: u64,
    pub delay_ms: u64,
}

impl PendingTimer {
    pub fn deadline_ms(&self) -> u64 {
        self.started_at_ms.saturating_add(self.delay_ms)
    }

    /// Time left before the timer fires, never negative.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms().saturating_sub(now_ms)
    }
}

#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<PendingTimer>,
    next_handle: u32,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer, then arm `action` after `delay_ms`.
    pub fn arm(&mut self, action: TimerAction, started_at_ms: u64, delay_ms: u64) -> TimerHandle {
        self.cancel();
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending = Some(PendingTimer {
            handle,
            action,
            started_at_ms,
            delay_ms,
        });
        handle
    }

    /// Clear the pending timer. Safe to call when nothing is armed.
    pub fn cancel(&mut self) -> Option<PendingTimer> {
        self.pending.take()
    }

    /// Take the pending timer if it is due at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Option<PendingTimer> {
        match self.pending {
            Some(t) if now_ms >= t.deadline_ms() => self.pending.take(),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingTimer> {
        self.pending.as_ref()
    }
}
