//! Notification decoder.
//!
//! ```text
//! byte 0 ∈ {1,2}   attach / detach frame for that connect id
//!   byte 1 == 0    detach
//!   byte 1 != 0    attach, type in byte 3
//! byte 0 otherwise sensor value frame, connect id in byte 1,
//!                  values from byte 2
//! ```

use super::codec::{MAX_NOTIFICATION_LEN, PortId};

/// A decoded notification frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A peripheral of raw type `type_id` was plugged into `port`.
    Attached { port: PortId, type_id: u8 },
    /// Whatever occupied `port` was unplugged.
    Detached { port: PortId },
    /// New sensor value(s) for the device on `port`.
    SensorValue {
        port: PortId,
        values: heapless::Vec<u8, MAX_NOTIFICATION_LEN>,
    },
}

/// Why a frame could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    Empty,
    /// The frame ended before a required byte.
    Truncated { needed: usize, got: usize },
    /// A value frame named a connect id that is not an external port.
    UnknownPort(u8),
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::Truncated { needed, got } => {
                write!(f, "truncated frame ({got} bytes, need {needed})")
            }
            Self::UnknownPort(id) => write!(f, "unknown connect id {id}"),
        }
    }
}

/// Decode one notification payload.
pub fn decode(data: &[u8]) -> Result<Notification, FrameError> {
    let first = *data.first().ok_or(FrameError::Empty)?;

    if let Some(port) = PortId::from_connect_id(first) {
        let event = *data.get(1).ok_or(FrameError::Truncated {
            needed: 2,
            got: data.len(),
        })?;
        if event == 0 {
            return Ok(Notification::Detached { port });
        }
        let type_id = *data.get(3).ok_or(FrameError::Truncated {
            needed: 4,
            got: data.len(),
        })?;
        return Ok(Notification::Attached { port, type_id });
    }

    if data.len() < 3 {
        return Err(FrameError::Truncated {
            needed: 3,
            got: data.len(),
        });
    }
    let port = PortId::from_connect_id(data[1]).ok_or(FrameError::UnknownPort(data[1]))?;
    let mut values = heapless::Vec::new();
    let copied = values.extend_from_slice(&data[2..data.len().min(MAX_NOTIFICATION_LEN)]);
    debug_assert!(copied.is_ok(), "value frame fits MAX_NOTIFICATION_LEN");
    Ok(Notification::SensorValue { port, values })
}
