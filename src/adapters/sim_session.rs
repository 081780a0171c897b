//! Simulated BLE session.
//!
//! Stands in for the host's Bluetooth stack on desktop builds and in
//! tests. Every write is decoded and recorded; notifications are injected
//! by calling [`SimSession::attach`], [`SimSession::detach`] or
//! [`SimSession::sensor_value`], which push them through the sender the
//! hub registered, exactly as a real session callback would.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};

use crate::app::ports::{PeripheralId, Session};
use crate::device::inbox::NotificationSender;
use crate::error::{ConnectionError, TransportError};
use crate::protocol::codec::{PortId, encode_payload};
use crate::protocol::gatt::{CHAR_ATTACHED_IO, CHAR_INPUT_VALUES, DEVICE_SERVICE, DeviceFilter, Encoding};

/// One acknowledged characteristic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub service: u128,
    pub characteristic: u128,
    pub bytes: Vec<u8>,
}

struct SimSubscription {
    characteristic: u128,
    sender: NotificationSender,
}

pub struct SimSession {
    advertised: Vec<u128>,
    peripheral_id: PeripheralId,
    connected: bool,
    refuse_next: Option<ConnectionError>,
    fail_writes: bool,
    writes: Vec<RecordedWrite>,
    subscriptions: Vec<SimSubscription>,
}

impl Default for SimSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSession {
    /// A session with one WeDo 2.0 hub in range.
    pub fn new() -> Self {
        Self::advertising(&[DEVICE_SERVICE])
    }

    /// A session whose only peripheral advertises `services`.
    pub fn advertising(services: &[u128]) -> Self {
        Self {
            advertised: services.to_vec(),
            peripheral_id: 1,
            connected: false,
            refuse_next: None,
            fail_writes: false,
            writes: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Make the next `connect` fail with `error`.
    pub fn refuse_next_connect(&mut self, error: ConnectionError) {
        self.refuse_next = Some(error);
    }

    /// Reject every write until called again with `false`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Drop the link from the peripheral side.
    pub fn drop_link(&mut self) {
        self.connected = false;
        self.subscriptions.clear();
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn writes(&self) -> &[RecordedWrite] {
        &self.writes
    }

    pub fn last_write(&self) -> Option<&RecordedWrite> {
        self.writes.last()
    }

    /// Payload bytes of every write, oldest first.
    pub fn written_bytes(&self) -> Vec<Vec<u8>> {
        self.writes.iter().map(|w| w.bytes.clone()).collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn is_subscribed(&self, characteristic: u128) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.characteristic == characteristic)
    }

    // ── Injection ─────────────────────────────────────────────

    /// Deliver raw bytes on `characteristic`. Returns `false` when nothing
    /// is subscribed or the hub's inbox refused the packet.
    pub fn notify(&self, characteristic: u128, bytes: &[u8]) -> bool {
        let Some(sub) = self
            .subscriptions
            .iter()
            .find(|s| s.characteristic == characteristic)
        else {
            debug!("sim: no subscriber for notification {:02x?}", bytes);
            return false;
        };
        sub.sender.deliver(&encode_payload(bytes))
    }

    /// Plug a peripheral with raw type `type_id` into `port`.
    pub fn attach(&self, port: PortId, type_id: u8) -> bool {
        self.notify(CHAR_ATTACHED_IO, &[port.connect_id(), 1, 0, type_id])
    }

    pub fn detach(&self, port: PortId) -> bool {
        self.notify(CHAR_ATTACHED_IO, &[port.connect_id(), 0])
    }

    /// Report sensor `values` for the device on `port`.
    pub fn sensor_value(&self, port: PortId, values: &[u8]) -> bool {
        let mut frame = vec![0, port.connect_id()];
        frame.extend_from_slice(values);
        self.notify(CHAR_INPUT_VALUES, &frame)
    }
}

impl Session for SimSession {
    fn connect(&mut self, filter: &DeviceFilter) -> Result<PeripheralId, ConnectionError> {
        if let Some(error) = self.refuse_next.take() {
            return Err(error);
        }
        if !filter.matches(&self.advertised) {
            return Err(ConnectionError::NoPeripheralFound);
        }
        self.connected = true;
        info!("sim: peripheral {} connected", self.peripheral_id);
        Ok(self.peripheral_id)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write(
        &mut self,
        service: u128,
        characteristic: u128,
        message: &str,
        encoding: Encoding,
    ) -> Result<(), TransportError> {
        if !self.connected {
            return Ok(());
        }
        if self.fail_writes {
            return Err(TransportError::WriteFailed);
        }
        let bytes = match encoding {
            Encoding::Base64 => STANDARD
                .decode(message)
                .map_err(|_| TransportError::Encoding)?,
        };
        debug!("sim: write {:02x?}", bytes);
        self.writes.push(RecordedWrite {
            service,
            characteristic,
            bytes,
        });
        Ok(())
    }

    fn start_notifications(
        &mut self,
        _service: u128,
        characteristic: u128,
        sender: NotificationSender,
    ) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::SubscribeFailed);
        }
        self.subscriptions.retain(|s| s.characteristic != characteristic);
        self.subscriptions.push(SimSubscription {
            characteristic,
            sender,
        });
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.subscriptions.clear();
    }
}
