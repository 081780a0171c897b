//! Hub configuration parameters
//!
//! Tunables for the session, motor and block layers. These are local
//! constants, never negotiated with the peripheral. Values can be
//! overridden from a JSON file by the host binary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum outbound BLE sends per rate-limiter window.
pub const SEND_RATE_MAX: u32 = 20;
/// Length of one rate-limiter window (milliseconds).
pub const RATE_WINDOW_MS: u64 = 1000;
/// Duration of active braking before the motor is switched off (milliseconds).
pub const BRAKE_TIME_MS: u64 = 1000;
/// How long a block that sends a BLE message yields (milliseconds).
pub const SEND_INTERVAL_MS: u64 = 100;
/// Upper bound for a timed motor run (milliseconds).
pub const MAX_MOTOR_RUN_MS: u64 = 15_000;
/// Upper bound for a note duration (milliseconds).
pub const MAX_NOTE_MS: u64 = 3_000;
/// Tilt angle at or above which the tilt sensor counts as tilted.
pub const TILT_THRESHOLD: i32 = 15;

/// Core hub configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    // --- Session ---
    /// Maximum sends per 1-second window
    pub send_rate_max: u32,

    // --- Motor ---
    /// Active braking duration before auto-off (ms)
    pub brake_time_ms: u64,
    /// Longest accepted timed motor run (ms)
    pub max_motor_run_ms: u64,

    // --- Blocks ---
    /// Yield time for blocks that send a single command (ms)
    pub send_interval_ms: u64,
    /// Longest accepted note (ms)
    pub max_note_ms: u64,
    /// Tilt threshold for the tilted predicates
    pub tilt_threshold: i32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_rate_max: SEND_RATE_MAX,
            brake_time_ms: BRAKE_TIME_MS,
            max_motor_run_ms: MAX_MOTOR_RUN_MS,
            send_interval_ms: SEND_INTERVAL_MS,
            max_note_ms: MAX_NOTE_MS,
            tilt_threshold: TILT_THRESHOLD,
        }
    }
}

impl HubConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or flood the hub.
    pub fn validate(&self) -> Result<()> {
        if self.send_rate_max == 0 {
            return Err(Error::Config("send_rate_max must be non-zero"));
        }
        if self.brake_time_ms == 0 {
            return Err(Error::Config("brake_time_ms must be non-zero"));
        }
        if self.send_interval_ms == 0 {
            return Err(Error::Config("send_interval_ms must be non-zero"));
        }
        if self.tilt_threshold <= 0 {
            return Err(Error::Config("tilt_threshold must be positive"));
        }
        Ok(())
    }
}
