//! Blocks service: the block-level API over one hub.
//!
//! [`WeDo2Blocks`] owns the [`Hub`] and turns block invocations into motor
//! transitions and output commands. Each command block returns a
//! [`Completion`] telling the script runner how long to yield, so a
//! script keeps its pacing even when no hub is connected.
//!
//! ```text
//!  BlockCommand ──▶ ┌──────────────┐ ──▶ Hub ──▶ Session
//!                   │  WeDo2Blocks │
//!  reporters    ◀── └──────────────┘ ◀── SensorReadings
//! ```

use std::time::Duration;

use log::{debug, warn};

use crate::device::hub::Hub;
use crate::device::limiter::SendPolicy;
use crate::device::motor::{Direction, Motor, MotorOutput};

use super::commands::{
    BlockCommand, CompareOp, MotorDirectionArg, MotorId, TiltDirection, TiltDirectionAny,
};
use super::ports::{Clock, Session};

/// Lowest and highest MIDI notes the piezo plays.
const NOTE_MIN: f64 = 25.0;
const NOTE_MAX: f64 = 125.0;

/// Raw tilt bytes above this are negative angles.
const TILT_WRAP_POINT: u8 = 45;

/// How long the calling script should wait before its next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub wait: Duration,
}

impl Completion {
    pub const IMMEDIATE: Self = Self {
        wait: Duration::ZERO,
    };

    pub const fn after_ms(ms: u64) -> Self {
        Self {
            wait: Duration::from_millis(ms),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// WeDo2Blocks
// ───────────────────────────────────────────────────────────────

pub struct WeDo2Blocks<S: Session, C: Clock> {
    hub: Hub<S, C>,
}

impl<S: Session, C: Clock> WeDo2Blocks<S, C> {
    pub fn new(hub: Hub<S, C>) -> Self {
        Self { hub }
    }

    pub fn hub(&self) -> &Hub<S, C> {
        &self.hub
    }

    pub fn hub_mut(&mut self) -> &mut Hub<S, C> {
        &mut self.hub
    }

    pub fn into_hub(self) -> Hub<S, C> {
        self.hub
    }

    // ── Command dispatch ──────────────────────────────────────

    pub fn execute(&mut self, command: BlockCommand) -> Completion {
        debug!("blocks: {:?}", command);
        match command {
            BlockCommand::MotorOnFor { motor, secs } => self.motor_on_for(motor, secs),
            BlockCommand::MotorOn { motor } => self.motor_on(motor),
            BlockCommand::MotorOff { motor } => self.motor_off(motor),
            BlockCommand::StartMotorPower { motor, power } => self.start_motor_power(motor, power),
            BlockCommand::SetMotorDirection { motor, direction } => {
                self.set_motor_direction(motor, direction)
            }
            BlockCommand::SetLightHue { hue } => self.set_light_hue(hue),
            BlockCommand::PlayNoteFor { note, secs } => self.play_note_for(note, secs),
            BlockCommand::StopAll => {
                self.stop_all();
                Completion::IMMEDIATE
            }
        }
    }

    // ── Motor blocks ──────────────────────────────────────────

    /// Run the selected motors for `secs` (clamped), then brake.
    /// Yields for the whole run.
    pub fn motor_on_for(&mut self, motor: MotorId, secs: f64) -> Completion {
        let ms = secs_to_ms(secs, self.hub.config().max_motor_run_ms);
        self.for_each_motor(motor, |m, now| Some(m.set_on_for(ms, now)));
        Completion::after_ms(ms)
    }

    pub fn motor_on(&mut self, motor: MotorId) -> Completion {
        self.for_each_motor(motor, |m, _| Some(m.set_on()));
        self.send_interval()
    }

    pub fn motor_off(&mut self, motor: MotorId) -> Completion {
        self.for_each_motor(motor, |m, _| Some(m.set_off(SendPolicy::Limited)));
        self.send_interval()
    }

    /// Set power and make sure the motor runs. A timed run keeps its
    /// deadline; a stopped or braking motor starts running indefinitely.
    pub fn start_motor_power(&mut self, motor: MotorId, power: f64) -> Completion {
        let power = power.clamp(0.0, 100.0) as i32;
        self.for_each_motor(motor, |m, now| {
            let resync = m.set_power(power, now);
            if m.is_on() { resync } else { Some(m.set_on()) }
        });
        self.send_interval()
    }

    pub fn set_motor_direction(
        &mut self,
        motor: MotorId,
        direction: MotorDirectionArg,
    ) -> Completion {
        self.for_each_motor(motor, |m, now| {
            let target = match direction {
                MotorDirectionArg::ThisWay => Direction::Forward,
                MotorDirectionArg::ThatWay => Direction::Reverse,
                MotorDirectionArg::Reverse => m.direction().reversed(),
            };
            m.set_direction(target, now)
        });
        self.send_interval()
    }

    fn for_each_motor<F>(&mut self, motor: MotorId, mut f: F)
    where
        F: FnMut(&mut Motor, u64) -> Option<MotorOutput>,
    {
        for &port in motor.ports() {
            if !self.hub.with_motor(port, &mut f) {
                debug!("blocks: no motor on {}", port);
            }
        }
    }

    // ── Light and sound ───────────────────────────────────────

    /// Hue on a 0..=100 scale, wrapped into range.
    pub fn set_light_hue(&mut self, hue: f64) -> Completion {
        let rgb = hue_to_rgb(wrap_clamp(hue, 0.0, 100.0) * 3.6);
        if let Err(e) = self.hub.set_led(rgb) {
            warn!("blocks: set light failed: {}", e);
        }
        self.send_interval()
    }

    /// Play a MIDI note. A zero duration would play forever on the hub,
    /// so it is skipped.
    pub fn play_note_for(&mut self, note: f64, secs: f64) -> Completion {
        let ms = secs_to_ms(secs, self.hub.config().max_note_ms);
        if ms == 0 {
            return Completion::IMMEDIATE;
        }
        let note = if note.is_nan() { NOTE_MIN } else { note.clamp(NOTE_MIN, NOTE_MAX) };
        let hz = note_to_tone(note) as u16;
        let wire_ms = ms.min(u64::from(u16::MAX)) as u16;
        if let Err(e) = self.hub.play_tone(hz, wire_ms) {
            warn!("blocks: play tone failed: {}", e);
        }
        Completion::after_ms(ms)
    }

    /// Stop button: silence the piezo and stop every motor.
    pub fn stop_all(&mut self) {
        self.hub.stop_all();
    }

    // ── Reporters and predicates ──────────────────────────────

    /// Distance sensor value, percent.
    pub fn get_distance(&self) -> u8 {
        self.hub.distance()
    }

    /// Distance hat: compare the latest reading to `reference`.
    pub fn when_distance(&self, op: CompareOp, reference: f64) -> bool {
        op.holds(f64::from(self.hub.distance()), reference)
    }

    pub fn when_tilted(&self, direction: TiltDirectionAny) -> bool {
        self.is_tilted(direction)
    }

    /// Whether the tilt angle reaches the threshold. `Any` compares the raw
    /// axis bytes, so a reading on either axis at or above the threshold
    /// counts.
    pub fn is_tilted(&self, direction: TiltDirectionAny) -> bool {
        let threshold = self.hub.config().tilt_threshold;
        match direction {
            TiltDirectionAny::Any => {
                i32::from(self.hub.tilt_x()) >= threshold
                    || i32::from(self.hub.tilt_y()) >= threshold
            }
            TiltDirectionAny::Direction(d) => self.get_tilt_angle(d) >= threshold,
        }
    }

    /// Tilt angle towards `direction`, in degrees.
    pub fn get_tilt_angle(&self, direction: TiltDirection) -> i32 {
        match direction {
            TiltDirection::Up => -signed_tilt(self.hub.tilt_y()),
            TiltDirection::Down => signed_tilt(self.hub.tilt_y()),
            TiltDirection::Left => -signed_tilt(self.hub.tilt_x()),
            TiltDirection::Right => signed_tilt(self.hub.tilt_x()),
        }
    }

    fn send_interval(&self) -> Completion {
        Completion::after_ms(self.hub.config().send_interval_ms)
    }
}

// ── Conversions ──────────────────────────────────────────────

/// Frequency of a MIDI note; note 69 is A4 at 440 Hz.
pub fn note_to_tone(note: f64) -> f64 {
    440.0 * 2f64.powf((note - 69.0) / 12.0)
}

/// Fully saturated, full-value colour for `hue_deg` (0..360) as `0xRRGGBB`.
pub fn hue_to_rgb(hue_deg: f64) -> u32 {
    let h = (hue_deg.rem_euclid(360.0)) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let rise = (f * 255.0).round() as u32;
    let fall = ((1.0 - f) * 255.0).round() as u32;
    let (r, g, b) = match sector as u32 {
        0 => (255, rise, 0),
        1 => (fall, 255, 0),
        2 => (0, 255, rise),
        3 => (0, fall, 255),
        4 => (rise, 0, 255),
        _ => (255, 0, fall),
    };
    (r << 16) | (g << 8) | b
}

/// Wrap `value` into `min..=max`, treating the range as circular.
fn wrap_clamp(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    let range = max - min + 1.0;
    value - ((value - min) / range).floor() * range
}

/// Seconds to milliseconds, clamped to `0..=max_ms`. NaN counts as zero.
fn secs_to_ms(secs: f64, max_ms: u64) -> u64 {
    (secs * 1000.0).clamp(0.0, max_ms as f64) as u64
}

/// Raw tilt byte as a signed angle; bytes past the wrap point are negative.
fn signed_tilt(raw: u8) -> i32 {
    if raw > TILT_WRAP_POINT {
        i32::from(raw) - 256
    } else {
        i32::from(raw)
    }
}
