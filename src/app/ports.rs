//! Port traits — the hexagonal boundary between the hub model and the host.
//!
//! ```text
//!   Host BLE API ──▶ Session ──▶ Hub (domain)
//!   Host clock   ──▶ Clock   ──▶ Hub
//!   Hub          ──▶ EventSink ──▶ logs / UI
//! ```
//!
//! The Bluetooth stack is owned by the host (browser, Scratch Link, a
//! native BLE crate). The hub only needs the four operations below.

use crate::device::inbox::NotificationSender;
use crate::error::{ConnectionError, TransportError};
use crate::protocol::gatt::{DeviceFilter, Encoding};

// ───────────────────────────────────────────────────────────────
// Session port (driven adapter: hub ↔ BLE transport)
// ───────────────────────────────────────────────────────────────

/// Identifier the host assigns to a discovered peripheral.
pub type PeripheralId = u32;

/// A host-provided BLE session.
pub trait Session {
    /// Discover and connect to a peripheral matching `filter`.
    fn connect(&mut self, filter: &DeviceFilter) -> Result<PeripheralId, ConnectionError>;

    /// Whether a peripheral is currently connected.
    fn is_connected(&self) -> bool;

    /// Write `message` to a characteristic. Completes when the write is
    /// acknowledged. Writing while disconnected is a no-op.
    fn write(
        &mut self,
        service: u128,
        characteristic: u128,
        message: &str,
        encoding: Encoding,
    ) -> Result<(), TransportError>;

    /// Enable notifications; every received packet is handed to `sender`
    /// in arrival order.
    fn start_notifications(
        &mut self,
        service: u128,
        characteristic: u128,
        sender: NotificationSender,
    ) -> Result<(), TransportError>;

    /// Drop the connection and every subscription. Idempotent.
    fn disconnect(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock shared by every timer in the hub.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: hub → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The hub emits structured [`HubEvent`](super::events::HubEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::HubEvent);
}

/// Sink that discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::HubEvent) {}
}
