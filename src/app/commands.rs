//! Inbound block commands and their menu arguments.
//!
//! These represent what a block script asks of the hub. The
//! [`WeDo2Blocks`](super::service::WeDo2Blocks) service interprets them.
//! Menu values use the strings a block editor sends, so a script can be
//! deserialised straight from JSON:
//!
//! ```json
//! { "opcode": "motorOnFor", "MOTOR_ID": "motor A", "DURATION": 1.5 }
//! ```

use log::warn;
use serde::Deserialize;

use crate::protocol::codec::PortId;

// ── Menus ────────────────────────────────────────────────────

/// Motor selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MotorId {
    /// "motor": every attached motor.
    #[serde(rename = "motor")]
    Default,
    #[serde(rename = "motor A")]
    A,
    #[serde(rename = "motor B")]
    B,
    #[serde(rename = "all motors")]
    All,
}

impl MotorId {
    pub fn from_menu(value: &str) -> Option<Self> {
        match value {
            "motor" => Some(Self::Default),
            "motor A" => Some(Self::A),
            "motor B" => Some(Self::B),
            "all motors" => Some(Self::All),
            other => {
                warn!("blocks: invalid motor id {:?}", other);
                None
            }
        }
    }

    /// Ports this selector addresses.
    pub fn ports(self) -> &'static [PortId] {
        match self {
            Self::A => &[PortId::A],
            Self::B => &[PortId::B],
            Self::Default | Self::All => &PortId::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MotorDirectionArg {
    #[serde(rename = "this way")]
    ThisWay,
    #[serde(rename = "that way")]
    ThatWay,
    /// Flip whatever the motor's current direction is.
    #[serde(rename = "reverse")]
    Reverse,
}

impl MotorDirectionArg {
    pub fn from_menu(value: &str) -> Option<Self> {
        match value {
            "this way" => Some(Self::ThisWay),
            "that way" => Some(Self::ThatWay),
            "reverse" => Some(Self::Reverse),
            other => {
                warn!("blocks: unknown motor direction {:?}", other);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltDirection {
    Up,
    Down,
    Left,
    Right,
}

impl TiltDirection {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn from_menu(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            other => {
                warn!("blocks: unknown tilt direction {:?}", other);
                None
            }
        }
    }
}

/// Tilt menu that also offers "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltDirectionAny {
    Any,
    Direction(TiltDirection),
}

impl TiltDirectionAny {
    pub fn from_menu(value: &str) -> Option<Self> {
        if value == "any" {
            return Some(Self::Any);
        }
        TiltDirection::from_menu(value).map(Self::Direction)
    }
}

impl From<TiltDirection> for TiltDirectionAny {
    fn from(direction: TiltDirection) -> Self {
        Self::Direction(direction)
    }
}

/// Comparison for the distance hat. Editors may send the operator
/// HTML-escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "<", alias = "&lt;")]
    Less,
    #[serde(rename = ">", alias = "&gt;")]
    Greater,
}

impl CompareOp {
    pub fn from_menu(value: &str) -> Option<Self> {
        match value {
            "<" | "&lt;" => Some(Self::Less),
            ">" | "&gt;" => Some(Self::Greater),
            other => {
                warn!("blocks: unknown comparison operator {:?}", other);
                None
            }
        }
    }

    pub fn holds(self, value: f64, reference: f64) -> bool {
        match self {
            Self::Less => value < reference,
            Self::Greater => value > reference,
        }
    }
}

// ── Commands ─────────────────────────────────────────────────

/// Command blocks. Numeric arguments arrive as script numbers and are
/// clamped by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "opcode", rename_all = "camelCase")]
pub enum BlockCommand {
    /// Run for `secs`, then brake.
    MotorOnFor {
        #[serde(rename = "MOTOR_ID")]
        motor: MotorId,
        #[serde(rename = "DURATION")]
        secs: f64,
    },

    MotorOn {
        #[serde(rename = "MOTOR_ID")]
        motor: MotorId,
    },

    MotorOff {
        #[serde(rename = "MOTOR_ID")]
        motor: MotorId,
    },

    /// Set power (0..=100) and make sure the motor runs.
    StartMotorPower {
        #[serde(rename = "MOTOR_ID")]
        motor: MotorId,
        #[serde(rename = "POWER")]
        power: f64,
    },

    SetMotorDirection {
        #[serde(rename = "MOTOR_ID")]
        motor: MotorId,
        #[serde(rename = "MOTOR_DIRECTION")]
        direction: MotorDirectionArg,
    },

    /// Hue on a 0..=100 scale, wrapped.
    SetLightHue {
        #[serde(rename = "HUE")]
        hue: f64,
    },

    /// MIDI `note` for `secs`.
    PlayNoteFor {
        #[serde(rename = "NOTE")]
        note: f64,
        #[serde(rename = "DURATION")]
        secs: f64,
    },

    /// The editor's stop button.
    StopAll,
}
