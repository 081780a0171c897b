//! Outbound hub events.
//!
//! The [`Hub`](crate::device::hub::Hub) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters decide what to do
//! with them: log to the console, refresh a status button, and so on.

use crate::app::ports::PeripheralId;
use crate::protocol::codec::{DeviceKind, PortId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// The connect handshake finished.
    Connected(PeripheralId),

    /// The session was torn down.
    Disconnected,

    /// A known peripheral was plugged into a port.
    DeviceAttached { port: PortId, kind: DeviceKind },

    /// A port was freed. `kind` is what occupied it, if anything.
    DeviceDetached {
        port: PortId,
        kind: Option<DeviceKind>,
    },

    /// An attach frame carried an unrecognised type byte.
    UnknownDevice { port: PortId, type_id: u8 },

    /// A notification could not be decoded.
    MalformedFrame,
}
