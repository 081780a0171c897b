//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing hub events through the `log`
//! facade. A UI adapter (status button, peripheral list) would implement
//! the same trait.

use log::{info, warn};

use crate::app::events::HubEvent;
use crate::app::ports::EventSink;
use crate::protocol::gatt::{DEVICE_SERVICE, uuid_string};

/// Adapter that logs every [`HubEvent`].
#[derive(Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events seen so far.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &HubEvent) {
        self.emitted += 1;
        match event {
            HubEvent::Connected(id) => {
                info!("HUB | connected peripheral={} service={}", id, uuid_string(DEVICE_SERVICE));
            }
            HubEvent::Disconnected => {
                info!("HUB | disconnected");
            }
            HubEvent::DeviceAttached { port, kind } => {
                info!("PORT | {} <- {:?}", port, kind);
            }
            HubEvent::DeviceDetached { port, kind } => match kind {
                Some(kind) => info!("PORT | {} -> {:?} removed", port, kind),
                None => info!("PORT | {} -> already empty", port),
            },
            HubEvent::UnknownDevice { port, type_id } => {
                warn!("PORT | {} unknown type {}", port, type_id);
            }
            HubEvent::MalformedFrame => {
                warn!("NOTIFY | malformed frame dropped");
            }
        }
    }
}
