//! Per-port motor controller.
//!
//! ```text
//!            set_on / set_on_for
//!   ┌─────┐ ─────────────────────▶ ┌─────────┐
//!   │ Off │                        │ Running │
//!   └─────┘ ◀───────────────────── └─────────┘
//!      ▲          set_off               │ timed run ends
//!      │                                ▼ (or start_braking)
//!      │      brake time elapses   ┌─────────┐
//!      └────────────────────────── │ Braking │
//!                                  └─────────┘
//! ```
//!
//! Every transition returns the command to send; the hub owns the
//! transport. Local state is updated whether or not the send succeeds.

use crate::protocol::codec::{Command, PortId};

use super::limiter::SendPolicy;
use super::timer::{PendingTimer, TimerAction, TimerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// "this way"
    Forward,
    /// "that way"
    Reverse,
}

impl Direction {
    pub const fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Negative values mean reverse, anything else forward.
    pub fn from_sign(value: i32) -> Self {
        if value < 0 { Self::Reverse } else { Self::Forward }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Off,
    Running,
    Braking,
}

/// A command produced by a transition, with the way it must be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorOutput {
    pub command: Command,
    pub policy: SendPolicy,
}

pub struct Motor {
    port: PortId,
    direction: Direction,
    power: u8,
    state: MotorState,
    timer: TimerSlot,
    brake_time_ms: u64,
}

impl Motor {
    pub fn new(port: PortId, brake_time_ms: u64) -> Self {
        Self {
            port,
            direction: Direction::Forward,
            power: 100,
            state: MotorState::Off,
            timer: TimerSlot::new(),
            brake_time_ms,
        }
    }

    /// Run indefinitely at the current power and direction.
    pub fn set_on(&mut self) -> MotorOutput {
        self.timer.cancel();
        self.state = MotorState::Running;
        self.power_output(SendPolicy::Limited)
    }

    /// Run for `duration_ms`, then brake.
    pub fn set_on_for(&mut self, duration_ms: u64, now_ms: u64) -> MotorOutput {
        let out = self.set_on();
        self.timer.arm(TimerAction::StartBraking, now_ms, duration_ms);
        out
    }

    /// Actively brake, then switch off after the brake time.
    pub fn start_braking(&mut self, now_ms: u64) -> MotorOutput {
        self.state = MotorState::Braking;
        self.timer
            .arm(TimerAction::TurnOff, now_ms, self.brake_time_ms);
        MotorOutput {
            command: Command::motor_brake(self.port),
            policy: SendPolicy::Limited,
        }
    }

    /// Switch off immediately and forget any pending timer.
    pub fn set_off(&mut self, policy: SendPolicy) -> MotorOutput {
        self.timer.cancel();
        self.state = MotorState::Off;
        MotorOutput {
            command: Command::motor_power(self.port, 0),
            policy,
        }
    }

    /// Change direction. A running motor is re-commanded, keeping the
    /// deadline of a timed run.
    pub fn set_direction(&mut self, direction: Direction, now_ms: u64) -> Option<MotorOutput> {
        self.direction = direction;
        self.resync(now_ms)
    }

    /// Change power (clamped to 0..=100). Same re-arm rule as direction.
    pub fn set_power(&mut self, power: i32, now_ms: u64) -> Option<MotorOutput> {
        self.power = power.clamp(0, 100) as u8;
        self.resync(now_ms)
    }

    /// Fire the pending timer if it is due.
    ///
    /// A follow-on timer is anchored at the fired deadline, so late polls
    /// do not stretch the schedule. Call until it returns `None`.
    pub fn poll(&mut self, now_ms: u64) -> Option<MotorOutput> {
        let fired = self.timer.take_due(now_ms)?;
        match fired.action {
            TimerAction::StartBraking => Some(self.start_braking(fired.deadline_ms())),
            TimerAction::TurnOff => {
                self.state = MotorState::Off;
                Some(MotorOutput {
                    command: Command::motor_power(self.port, 0),
                    policy: SendPolicy::Bypass,
                })
            }
        }
    }

    fn resync(&mut self, now_ms: u64) -> Option<MotorOutput> {
        if self.state != MotorState::Running {
            return None;
        }
        let remaining = self
            .timer
            .pending()
            .filter(|t| t.action == TimerAction::StartBraking)
            .map(|t| t.remaining_ms(now_ms));
        Some(match remaining {
            Some(ms) => self.set_on_for(ms, now_ms),
            None => self.set_on(),
        })
    }

    fn power_output(&self, policy: SendPolicy) -> MotorOutput {
        let signed = self.power as i8 * self.direction.sign();
        MotorOutput {
            command: Command::motor_power(self.port, signed),
            policy,
        }
    }

    pub fn port(&self) -> PortId {
        self.port
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn power(&self) -> u8 {
        self.power
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    /// True only while running; braking counts as off.
    pub fn is_on(&self) -> bool {
        self.state == MotorState::Running
    }

    pub fn pending_timer(&self) -> Option<&PendingTimer> {
        self.timer.pending()
    }
}
