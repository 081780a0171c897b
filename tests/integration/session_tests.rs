//! Session lifecycle: handshake, notification routing, disconnect.

use crate::harness::{RecordingSink, connected_hub, plug};

use wedo_hub::Error;
use wedo_hub::adapters::sim_session::SimSession;
use wedo_hub::adapters::time::ManualClock;
use wedo_hub::app::events::HubEvent;
use wedo_hub::config::HubConfig;
use wedo_hub::device::Hub;
use wedo_hub::device::inbox::INBOX_DEPTH;
use wedo_hub::error::{ConnectionError, TransportError};
use wedo_hub::protocol::codec::{DeviceKind, PortId};
use wedo_hub::protocol::gatt::{
    CHAR_ATTACHED_IO, CHAR_INPUT_COMMAND, CHAR_INPUT_VALUES, CHAR_OUTPUT_COMMAND, IO_SERVICE,
};

// ── Handshake ────────────────────────────────────────────────

#[test]
fn handshake_writes_led_mode_colour_then_subscribes() {
    let (hub, _, sink) = connected_hub();
    let writes = hub.session().writes();
    assert_eq!(writes.len(), 2);

    assert_eq!(writes[0].service, IO_SERVICE);
    assert_eq!(writes[0].characteristic, CHAR_INPUT_COMMAND);
    assert_eq!(writes[0].bytes, vec![1, 2, 6, 23, 1, 0, 0, 0, 0, 0, 0]);

    assert_eq!(writes[1].characteristic, CHAR_OUTPUT_COMMAND);
    assert_eq!(writes[1].bytes, vec![6, 4, 3, 0, 0, 255]);

    assert!(hub.session().is_subscribed(CHAR_ATTACHED_IO));
    assert_eq!(sink.events, vec![HubEvent::Connected(1)]);
}

#[test]
fn no_hub_in_range_fails_connect() {
    let mut hub = Hub::new(
        SimSession::advertising(&[]),
        ManualClock::new(),
        HubConfig::default(),
    );
    let mut sink = RecordingSink::new();
    assert_eq!(
        hub.connect(&mut sink),
        Err(Error::Connection(ConnectionError::NoPeripheralFound))
    );
    assert!(hub.session().writes().is_empty());
}

#[test]
fn handshake_write_failure_surfaces_transport_error() {
    let mut session = SimSession::new();
    session.set_fail_writes(true);
    let mut hub = Hub::new(session, ManualClock::new(), HubConfig::default());
    let mut sink = RecordingSink::new();
    assert_eq!(
        hub.connect(&mut sink),
        Err(Error::Transport(TransportError::WriteFailed))
    );
    assert!(sink.events.is_empty(), "no Connected event on failed handshake");
}

// ── Notifications ────────────────────────────────────────────

#[test]
fn distance_example_from_attach_to_detach() {
    let (mut hub, _, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 35)]);

    assert!(hub.session().notify(CHAR_INPUT_VALUES, &[0, 1, 77]));
    hub.process_notifications(&mut sink);
    assert_eq!(hub.distance(), 77);

    hub.session().detach(PortId::A);
    hub.process_notifications(&mut sink);
    assert_eq!(hub.distance(), 0);
}

#[test]
fn value_subscription_is_made_once_per_connection() {
    let (mut hub, _, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 35), (PortId::B, 34)]);

    let formats: Vec<_> = hub
        .session()
        .writes()
        .iter()
        .filter(|w| w.characteristic == CHAR_INPUT_COMMAND)
        .map(|w| w.bytes.clone())
        .collect();
    assert_eq!(
        formats[1..],
        [
            vec![1, 2, 1, 35, 0, 1, 0, 0, 0, 1, 1],
            vec![1, 2, 2, 34, 0, 1, 0, 0, 0, 0, 1],
        ]
    );
    assert!(hub.session().is_subscribed(CHAR_INPUT_VALUES));
}

#[test]
fn led_and_piezo_attach_are_only_recorded() {
    let (mut hub, _, mut sink) = connected_hub();
    hub.session_mut().clear_writes();
    plug(&mut hub, &mut sink, &[(PortId::A, 23), (PortId::B, 22)]);
    assert_eq!(hub.port_kind(PortId::A), Some(DeviceKind::Led));
    assert_eq!(hub.port_kind(PortId::B), Some(DeviceKind::Piezo));
    assert!(hub.session().writes().is_empty());
    assert!(!hub.session().is_subscribed(CHAR_INPUT_VALUES));
}

#[test]
fn frames_apply_in_arrival_order_across_subscriptions() {
    let (mut hub, _, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 35)]);
    hub.session().sensor_value(PortId::A, &[64]);
    hub.process_notifications(&mut sink);
    assert_eq!(hub.distance(), 64);

    // Old sensor value, unplug, tilt sensor plugged in, then its first reading.
    hub.session().sensor_value(PortId::A, &[77]);
    hub.session().detach(PortId::A);
    hub.session().attach(PortId::A, 34);
    hub.session().sensor_value(PortId::A, &[3, 4]);
    assert_eq!(hub.process_notifications(&mut sink), 4);

    assert_eq!(hub.port_kind(PortId::A), Some(DeviceKind::Tilt));
    assert_eq!(hub.distance(), 0);
    assert_eq!((hub.tilt_x(), hub.tilt_y()), (3, 4));
}

#[test]
fn unknown_device_type_never_panics() {
    let (mut hub, _, mut sink) = connected_hub();
    for type_id in [0u8, 2, 21, 36, 200, 255] {
        plug(&mut hub, &mut sink, &[(PortId::B, type_id)]);
        assert_eq!(hub.port_kind(PortId::B), None);
    }
    assert!(sink.events.contains(&HubEvent::UnknownDevice {
        port: PortId::B,
        type_id: 200
    }));
}

#[test]
fn overflowing_inbox_drops_newest() {
    let (mut hub, _, mut sink) = connected_hub();
    for _ in 0..INBOX_DEPTH {
        assert!(hub.session().attach(PortId::A, 1));
    }
    assert!(!hub.session().attach(PortId::A, 1));
    assert_eq!(hub.inbox().len(), INBOX_DEPTH);
    assert_eq!(hub.process_notifications(&mut sink), INBOX_DEPTH);
}

// ── Disconnect ───────────────────────────────────────────────

#[test]
fn disconnect_resets_and_reconnect_starts_clean() {
    let (mut hub, _, mut sink) = connected_hub();
    plug(&mut hub, &mut sink, &[(PortId::A, 1), (PortId::B, 35)]);
    hub.session().sensor_value(PortId::B, &[90]);
    hub.process_notifications(&mut sink);

    hub.disconnect(&mut sink);
    assert_eq!(sink.last(), Some(&HubEvent::Disconnected));
    assert!(hub.motor(PortId::A).is_none());
    assert_eq!(hub.distance(), 0);
    assert!(!hub.session().is_subscribed(CHAR_ATTACHED_IO));

    hub.session_mut().clear_writes();
    hub.connect(&mut sink).unwrap();
    assert_eq!(hub.session().writes().len(), 2);
    plug(&mut hub, &mut sink, &[(PortId::B, 35)]);
    assert!(hub.session().is_subscribed(CHAR_INPUT_VALUES));
}

#[test]
fn writes_after_link_loss_are_silent() {
    let (mut hub, _, _) = connected_hub();
    hub.session_mut().drop_link();
    hub.session_mut().clear_writes();
    assert_eq!(hub.set_led(0xFF_00_00), Ok(()));
    assert_eq!(hub.stop_tone(), Ok(()));
    assert!(hub.session().writes().is_empty());
}
