//! Fuzz target: notification decoding
//!
//! Drives arbitrary payloads through the frame decoder and then through a
//! connected hub, asserting that neither panics and that value frames never
//! carry more bytes than a notification can hold.
//!
//! cargo fuzz run fuzz_notification_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use wedo_hub::adapters::sim_session::SimSession;
use wedo_hub::adapters::time::ManualClock;
use wedo_hub::app::ports::NullSink;
use wedo_hub::config::HubConfig;
use wedo_hub::device::Hub;
use wedo_hub::protocol::codec::MAX_NOTIFICATION_LEN;
use wedo_hub::protocol::frame::{self, Notification};
use wedo_hub::protocol::gatt::CHAR_ATTACHED_IO;

fuzz_target!(|data: &[u8]| {
    if let Ok(Notification::SensorValue { values, .. }) = frame::decode(data) {
        assert!(values.len() <= MAX_NOTIFICATION_LEN);
    }

    let mut hub = Hub::new(SimSession::new(), ManualClock::new(), HubConfig::default());
    if hub.connect(&mut NullSink).is_err() {
        return;
    }
    // Through the session path (base64 + inbox) as well as directly.
    hub.session().notify(CHAR_ATTACHED_IO, data);
    hub.process_notifications(&mut NullSink);
    hub.handle_frame(data, &mut NullSink);
    hub.poll();
});
