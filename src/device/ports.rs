//! Port registry and cached sensor readings.
//!
//! Only the hub mutates the registry. Motors are owned by their port and
//! dropped with it on detach.

use crate::protocol::codec::{DeviceKind, PORT_COUNT, PortId};

use super::motor::Motor;

/// Latest sensor values. Overwritten in place; no history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorReadings {
    /// Raw tilt about the X axis (0..=255, wraps for negative angles).
    pub tilt_x: u8,
    /// Raw tilt about the Y axis.
    pub tilt_y: u8,
    /// Distance sensor, percent.
    pub distance: u8,
}

impl SensorReadings {
    /// Store the values of a value frame for a sensor of `kind`.
    /// Returns `false` when the frame is too short for that kind.
    pub fn apply(&mut self, kind: DeviceKind, values: &[u8]) -> bool {
        match kind {
            DeviceKind::Distance => match values.first() {
                Some(&d) => {
                    self.distance = d;
                    true
                }
                None => false,
            },
            DeviceKind::Tilt => match values {
                [x, y, ..] => {
                    self.tilt_x = *x;
                    self.tilt_y = *y;
                    true
                }
                _ => false,
            },
            _ => true,
        }
    }

    /// Zero the values belonging to `kind`.
    pub fn clear(&mut self, kind: DeviceKind) {
        match kind {
            DeviceKind::Distance => self.distance = 0,
            DeviceKind::Tilt => {
                self.tilt_x = 0;
                self.tilt_y = 0;
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct Slot {
    kind: Option<DeviceKind>,
    motor: Option<Motor>,
}

#[derive(Default)]
pub struct PortRegistry {
    slots: [Slot; PORT_COUNT],
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `kind` on `port`, replacing whatever was there. A motor is
    /// allocated for motor kinds.
    pub fn attach(&mut self, port: PortId, kind: DeviceKind, brake_time_ms: u64) {
        let slot = &mut self.slots[port.index()];
        slot.kind = Some(kind);
        slot.motor = (kind == DeviceKind::Motor).then(|| Motor::new(port, brake_time_ms));
    }

    /// Free `port`, returning the kind that occupied it.
    pub fn detach(&mut self, port: PortId) -> Option<DeviceKind> {
        let slot = &mut self.slots[port.index()];
        slot.motor = None;
        slot.kind.take()
    }

    pub fn kind(&self, port: PortId) -> Option<DeviceKind> {
        self.slots[port.index()].kind
    }

    pub fn motor(&self, port: PortId) -> Option<&Motor> {
        self.slots[port.index()].motor.as_ref()
    }

    pub fn motor_mut(&mut self, port: PortId) -> Option<&mut Motor> {
        self.slots[port.index()].motor.as_mut()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}
