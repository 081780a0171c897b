//! Shared fixtures for integration tests.
//!
//! Builds a hub over [`SimSession`] and a [`ManualClock`], and records
//! every emitted event so tests can assert on the full history.

use wedo_hub::adapters::sim_session::SimSession;
use wedo_hub::adapters::time::ManualClock;
use wedo_hub::app::events::HubEvent;
use wedo_hub::app::ports::EventSink;
use wedo_hub::app::service::WeDo2Blocks;
use wedo_hub::config::HubConfig;
use wedo_hub::device::Hub;
use wedo_hub::protocol::codec::PortId;

pub type SimHub = Hub<SimSession, ManualClock>;
pub type SimBlocks = WeDo2Blocks<SimSession, ManualClock>;

// ── Recording sink ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<HubEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&HubEvent> {
        self.events.last()
    }

    pub fn count(&self, wanted: &HubEvent) -> usize {
        self.events.iter().filter(|e| *e == wanted).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &HubEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// A hub that completed the handshake, with nothing attached.
pub fn connected_hub() -> (SimHub, ManualClock, RecordingSink) {
    let clock = ManualClock::new();
    let mut hub = Hub::new(SimSession::new(), clock.clone(), HubConfig::default());
    let mut sink = RecordingSink::new();
    hub.connect(&mut sink).expect("handshake");
    (hub, clock, sink)
}

/// Plug peripherals (by raw type byte) and process the attach frames.
pub fn plug(hub: &mut SimHub, sink: &mut RecordingSink, devices: &[(PortId, u8)]) {
    for (port, type_id) in devices {
        assert!(hub.session().attach(*port, *type_id), "attach delivered");
    }
    hub.process_notifications(sink);
}

/// Blocks service over a connected hub with `devices` attached and the
/// write log cleared.
#[allow(dead_code)]
pub fn blocks_with(devices: &[(PortId, u8)]) -> (SimBlocks, ManualClock, RecordingSink) {
    let (mut hub, clock, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, devices);
    hub.session_mut().clear_writes();
    (WeDo2Blocks::new(hub), clock, sink)
}

/// Advance simulated time in host-loop ticks, polling the hub each tick.
pub fn run_for(hub: &mut SimHub, clock: &ManualClock, sink: &mut RecordingSink, ms: u64) {
    const TICK: u64 = 10;
    let mut elapsed = 0;
    while elapsed < ms {
        clock.advance(TICK);
        elapsed += TICK;
        hub.tick(sink);
    }
}

/// Power bytes of every motor-power write on `port`, in order.
pub fn power_history(hub: &SimHub, port: PortId) -> Vec<u8> {
    hub.session()
        .writes()
        .iter()
        .filter(|w| w.bytes.len() == 4 && w.bytes[0] == port.connect_id() && w.bytes[1] == 1)
        .map(|w| w.bytes[3])
        .collect()
}
