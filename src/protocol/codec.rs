//! Command encoder for the hub's output and input-format characteristics.
//!
//! Output command layout:
//! ```text
//! ┌────────────┬─────────┬────────────┬──────────────────┐
//! │ Connect id │ Opcode  │ Len (1B)   │ Payload (Len B)  │
//! └────────────┴─────────┴────────────┴──────────────────┘
//! ```
//!
//! Input-format command layout (11 bytes, INPUT_COMMAND):
//! ```text
//! [1, 2, connect id, type, mode, delta(4B LE), unit, notify]
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::warn;

use super::gatt::{CHAR_INPUT_COMMAND, CHAR_OUTPUT_COMMAND};

// ── Constants ────────────────────────────────────────────────

/// Longest command the hub accepts (input format).
pub const MAX_COMMAND_LEN: usize = 11;
/// Longest notification payload we keep (BLE 4.x ATT payload).
pub const MAX_NOTIFICATION_LEN: usize = 20;

/// Number of external ports on the hub.
pub const PORT_COUNT: usize = 2;

/// Connect id of the hub's built-in RGB LED.
pub const CONNECT_ID_LED: u8 = 6;
/// Connect id of the hub's built-in piezo speaker.
pub const CONNECT_ID_PIEZO: u8 = 5;

/// Output opcodes.
pub const OP_MOTOR_POWER: u8 = 1;
pub const OP_PLAY_TONE: u8 = 2;
pub const OP_STOP_TONE: u8 = 3;
pub const OP_WRITE_RGB: u8 = 4;

/// Power byte that requests active braking.
pub const POWER_BRAKE: u8 = 127;

const INPUT_FORMAT: u8 = 1;
const INPUT_WRITE: u8 = 2;

// ── Device kinds ─────────────────────────────────────────────

/// Peripheral types reported in attach notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceKind {
    Motor = 1,
    Piezo = 22,
    Led = 23,
    Tilt = 34,
    Distance = 35,
}

impl DeviceKind {
    /// Sensor mode written in the input-format command.
    pub const fn mode(self) -> u8 {
        match self {
            Self::Led => 1,
            _ => 0,
        }
    }

    /// Sensor unit written in the input-format command: 0 raw, 1 percent.
    pub const fn unit(self) -> u8 {
        match self {
            Self::Distance => 1,
            _ => 0,
        }
    }

    /// Whether this kind streams values on INPUT_VALUES.
    pub const fn is_sensor(self) -> bool {
        matches!(self, Self::Tilt | Self::Distance)
    }
}

impl TryFrom<u8> for DeviceKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            1 => Ok(Self::Motor),
            22 => Ok(Self::Piezo),
            23 => Ok(Self::Led),
            34 => Ok(Self::Tilt),
            35 => Ok(Self::Distance),
            other => Err(other),
        }
    }
}

// ── Port identity ────────────────────────────────────────────

/// One of the hub's external connectors, 1-based on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(u8);

impl PortId {
    pub const A: Self = Self(1);
    pub const B: Self = Self(2);
    pub const ALL: [Self; PORT_COUNT] = [Self::A, Self::B];

    /// Accepts a wire connect id (1 or 2).
    pub const fn from_connect_id(id: u8) -> Option<Self> {
        match id {
            1 | 2 => Some(Self(id)),
            _ => None,
        }
    }

    pub const fn connect_id(self) -> u8 {
        self.0
    }

    /// Zero-based slot index.
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl core::fmt::Display for PortId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = if self.0 == 1 { 'A' } else { 'B' };
        write!(f, "port {name}")
    }
}

// ── Command ──────────────────────────────────────────────────

/// An encoded command plus the characteristic it must be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    characteristic: u128,
    bytes: heapless::Vec<u8, MAX_COMMAND_LEN>,
}

impl Command {
    fn new(characteristic: u128, bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= MAX_COMMAND_LEN, "command of {} bytes", bytes.len());
        let mut buf = heapless::Vec::new();
        if buf.extend_from_slice(&bytes[..bytes.len().min(MAX_COMMAND_LEN)]).is_err() {
            warn!("codec: command {:02x?} does not fit, sending it empty", bytes);
        }
        Self {
            characteristic,
            bytes: buf,
        }
    }

    /// Set motor power; `signed_power` is power × direction in -100..=100.
    pub fn motor_power(port: PortId, signed_power: i8) -> Self {
        Self::new(
            CHAR_OUTPUT_COMMAND,
            &[port.connect_id(), OP_MOTOR_POWER, 1, signed_power as u8],
        )
    }

    /// Start active braking on a motor.
    pub fn motor_brake(port: PortId) -> Self {
        Self::new(
            CHAR_OUTPUT_COMMAND,
            &[port.connect_id(), OP_MOTOR_POWER, 1, POWER_BRAKE],
        )
    }

    /// Set the hub LED to a 24-bit `0xRRGGBB` colour.
    pub fn write_rgb(rgb: u32) -> Self {
        let [_, r, g, b] = rgb.to_be_bytes();
        Self::new(CHAR_OUTPUT_COMMAND, &[CONNECT_ID_LED, OP_WRITE_RGB, 3, r, g, b])
    }

    /// Play `hz` on the piezo for `ms` milliseconds.
    pub fn play_tone(hz: u16, ms: u16) -> Self {
        let [hz_lo, hz_hi] = hz.to_le_bytes();
        let [ms_lo, ms_hi] = ms.to_le_bytes();
        Self::new(
            CHAR_OUTPUT_COMMAND,
            &[CONNECT_ID_PIEZO, OP_PLAY_TONE, 4, hz_lo, hz_hi, ms_lo, ms_hi],
        )
    }

    pub fn stop_tone() -> Self {
        Self::new(CHAR_OUTPUT_COMMAND, &[CONNECT_ID_PIEZO, OP_STOP_TONE])
    }

    /// Configure an input on `connect_id`.
    pub fn input_format(
        connect_id: u8,
        kind: DeviceKind,
        delta_interval: u32,
        notifications: bool,
    ) -> Self {
        let [d0, d1, d2, d3] = delta_interval.to_le_bytes();
        Self::new(
            CHAR_INPUT_COMMAND,
            &[
                INPUT_FORMAT,
                INPUT_WRITE,
                connect_id,
                kind as u8,
                kind.mode(),
                d0,
                d1,
                d2,
                d3,
                kind.unit(),
                u8::from(notifications),
            ],
        )
    }

    /// Continuous value updates for a sensor on an external port.
    pub fn sensor_format(port: PortId, kind: DeviceKind) -> Self {
        Self::input_format(port.connect_id(), kind, 1, true)
    }

    /// Put the built-in LED into RGB mode.
    pub fn led_mode() -> Self {
        Self::input_format(CONNECT_ID_LED, DeviceKind::Led, 0, false)
    }

    pub fn characteristic(&self) -> u128 {
        self.characteristic
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Decode a base64 notification payload. Returns `None` when the text is
/// not valid base64 or exceeds [`MAX_NOTIFICATION_LEN`].
pub fn decode_notification(text: &str) -> Option<heapless::Vec<u8, MAX_NOTIFICATION_LEN>> {
    let raw = STANDARD.decode(text).ok()?;
    heapless::Vec::from_slice(&raw).ok()
}

/// Base64-encode raw notification bytes (used by simulated sessions).
pub fn encode_payload(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

// ── Tests ────────────────────────────────────────────────────
