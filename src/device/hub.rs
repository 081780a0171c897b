//! Hub device model: port registry, command dispatch and notification
//! handling for one WeDo 2.0 hub.
//!
//! [`Hub`] owns the session, the rate limiter, the port registry and the
//! cached sensor values. It is created once per runtime and handed to the
//! block layer; nothing here is global.
//!
//! ```text
//!  blocks ──▶ Hub ──▶ Motor ──▶ RateLimiter ──▶ Session::write
//!              ▲
//!              └── process_notifications ◀── NotificationInbox ◀── Session
//! ```
//!
//! Every send is fire-and-forget except the connect handshake and the
//! sensor-format write that precedes a value subscription; those return
//! transport errors to the caller.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::app::events::HubEvent;
use crate::app::ports::{Clock, EventSink, PeripheralId, Session};
use crate::config::HubConfig;
use crate::error::{Error, Result};
use crate::protocol::codec::{Command, DeviceKind, PortId};
use crate::protocol::frame::{self, Notification};
use crate::protocol::gatt::{DeviceFilter, Encoding, IO_SERVICE};

use super::inbox::{NotificationInbox, NotificationSender, Subscription};
use super::limiter::{RateLimiter, SendPolicy};
use super::motor::{Motor, MotorOutput};
use super::ports::{PortRegistry, SensorReadings};

/// LED colour set once the handshake completes.
const CONNECTED_LED_RGB: u32 = 0x00_00_FF;

pub struct Hub<S: Session, C: Clock> {
    session: S,
    clock: C,
    config: HubConfig,
    limiter: RateLimiter,
    ports: PortRegistry,
    sensors: SensorReadings,
    inbox: Rc<NotificationInbox>,
    input_values_subscribed: bool,
}

impl<S: Session, C: Clock> Hub<S, C> {
    pub fn new(session: S, clock: C, config: HubConfig) -> Self {
        let limiter = RateLimiter::new(config.send_rate_max);
        Self {
            session,
            clock,
            config,
            limiter,
            ports: PortRegistry::new(),
            sensors: SensorReadings::default(),
            inbox: Rc::new(NotificationInbox::new()),
            input_values_subscribed: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Connect to a hub and run the handshake: LED to RGB mode, LED blue,
    /// then subscribe to attach/detach notifications.
    pub fn connect(&mut self, sink: &mut impl EventSink) -> Result<PeripheralId> {
        let id = self.session.connect(&DeviceFilter::wedo2())?;
        info!("hub: peripheral {} connected", id);

        self.send(&Command::led_mode(), SendPolicy::Limited)?;
        self.set_led(CONNECTED_LED_RGB)?;
        self.subscribe(Subscription::AttachedIo)?;

        sink.emit(&HubEvent::Connected(id));
        Ok(id)
    }

    /// Forget every port and reading, then drop the session.
    pub fn disconnect(&mut self, sink: &mut impl EventSink) {
        self.ports.clear();
        self.sensors = SensorReadings::default();
        self.inbox.drain();
        self.input_values_subscribed = false;
        self.session.disconnect();
        info!("hub: disconnected");
        sink.emit(&HubEvent::Disconnected);
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// `Err(NotConnected)` unless a peripheral is connected.
    pub fn require_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    // ── Send path ─────────────────────────────────────────────

    /// Write a command to the IO service.
    ///
    /// Silently does nothing when disconnected, and drops the command when
    /// the rate limiter refuses it (unless `policy` is `Bypass`).
    pub fn send(&mut self, command: &Command, policy: SendPolicy) -> Result<()> {
        if !self.session.is_connected() {
            return Ok(());
        }
        if policy == SendPolicy::Limited && !self.limiter.try_acquire(self.clock.now_ms()) {
            debug!("hub: rate limit reached, dropping {:02x?}", command.as_bytes());
            return Ok(());
        }
        self.session.write(
            IO_SERVICE,
            command.characteristic(),
            &command.to_base64(),
            Encoding::Base64,
        )?;
        Ok(())
    }

    fn dispatch(&mut self, out: MotorOutput) {
        if let Err(e) = self.send(&out.command, out.policy) {
            warn!("hub: motor command failed: {}", e);
        }
    }

    fn subscribe(&mut self, subscription: Subscription) -> Result<()> {
        let sender = NotificationSender::new(self.inbox.clone(), subscription);
        self.session.start_notifications(
            subscription.service(),
            subscription.characteristic(),
            sender,
        )?;
        Ok(())
    }

    // ── Notifications ─────────────────────────────────────────

    /// Drain queued notifications in arrival order. Returns how many frames
    /// were handled.
    pub fn process_notifications(&mut self, sink: &mut impl EventSink) -> usize {
        let mut handled = 0;
        while let Some((_, payload)) = self.inbox.pop() {
            self.handle_frame(&payload, sink);
            handled += 1;
        }
        handled
    }

    /// Apply one decoded notification payload.
    pub fn handle_frame(&mut self, data: &[u8], sink: &mut impl EventSink) {
        match frame::decode(data) {
            Ok(Notification::Attached { port, type_id }) => self.register(port, type_id, sink),
            Ok(Notification::Detached { port }) => self.clear_port(port, sink),
            Ok(Notification::SensorValue { port, values }) => {
                let Some(kind) = self.ports.kind(port) else {
                    debug!("hub: value for empty {} ignored", port);
                    return;
                };
                if !self.sensors.apply(kind, &values) {
                    warn!("hub: short {:?} value frame on {}", kind, port);
                    sink.emit(&HubEvent::MalformedFrame);
                }
            }
            Err(e) => {
                warn!("hub: dropping frame {:02x?}: {}", data, e);
                sink.emit(&HubEvent::MalformedFrame);
            }
        }
    }

    fn register(&mut self, port: PortId, type_id: u8, sink: &mut impl EventSink) {
        let kind = match DeviceKind::try_from(type_id) {
            Ok(kind) => kind,
            Err(raw) => {
                warn!("hub: {} on {}, leaving it unassigned", Error::UnknownDeviceType(raw), port);
                if let Some(previous) = self.ports.detach(port) {
                    self.sensors.clear(previous);
                }
                sink.emit(&HubEvent::UnknownDevice { port, type_id: raw });
                return;
            }
        };

        if let Some(previous) = self.ports.detach(port) {
            self.sensors.clear(previous);
        }
        self.ports.attach(port, kind, self.config.brake_time_ms);
        info!("hub: {:?} attached on {}", kind, port);
        sink.emit(&HubEvent::DeviceAttached { port, kind });

        if kind.is_sensor() {
            if let Err(e) = self.configure_sensor(port, kind) {
                warn!("hub: configuring {:?} on {} failed: {}", kind, port, e);
            }
        }
    }

    /// Request continuous updates for a sensor, then subscribe to values
    /// once the format write went through.
    fn configure_sensor(&mut self, port: PortId, kind: DeviceKind) -> Result<()> {
        self.send(&Command::sensor_format(port, kind), SendPolicy::Limited)?;
        if !self.input_values_subscribed {
            self.subscribe(Subscription::InputValues)?;
            self.input_values_subscribed = true;
        }
        Ok(())
    }

    fn clear_port(&mut self, port: PortId, sink: &mut impl EventSink) {
        let kind = self.ports.detach(port);
        if let Some(kind) = kind {
            self.sensors.clear(kind);
            info!("hub: {:?} detached from {}", kind, port);
        }
        sink.emit(&HubEvent::DeviceDetached { port, kind });
    }

    // ── Timers ────────────────────────────────────────────────

    /// Fire every motor timer that is due, port by port.
    pub fn poll(&mut self) {
        let now = self.clock.now_ms();
        for port in PortId::ALL {
            while let Some(out) = self.ports.motor_mut(port).and_then(|m| m.poll(now)) {
                self.dispatch(out);
            }
        }
    }

    /// One pass of the host loop: notifications, then timers.
    pub fn tick(&mut self, sink: &mut impl EventSink) {
        self.process_notifications(sink);
        self.poll();
    }

    // ── Motors ────────────────────────────────────────────────

    pub fn motor(&self, port: PortId) -> Option<&Motor> {
        self.ports.motor(port)
    }

    /// Run `f` against the motor on `port` and send what it produces.
    /// Returns `false` when no motor is attached there.
    pub fn with_motor<F>(&mut self, port: PortId, f: F) -> bool
    where
        F: FnOnce(&mut Motor, u64) -> Option<MotorOutput>,
    {
        let now = self.clock.now_ms();
        let Some(motor) = self.ports.motor_mut(port) else {
            return false;
        };
        if let Some(out) = f(motor, now) {
            self.dispatch(out);
        }
        true
    }

    /// Switch every motor off, bypassing the rate limiter.
    pub fn stop_all_motors(&mut self) {
        for port in PortId::ALL {
            self.with_motor(port, |m, _| Some(m.set_off(SendPolicy::Bypass)));
        }
    }

    // ── Built-in outputs ──────────────────────────────────────

    /// Set the hub LED to a 24-bit `0xRRGGBB` colour.
    pub fn set_led(&mut self, rgb: u32) -> Result<()> {
        self.send(&Command::write_rgb(rgb), SendPolicy::Limited)
    }

    pub fn stop_led(&mut self) -> Result<()> {
        self.send(&Command::write_rgb(0), SendPolicy::Limited)
    }

    pub fn play_tone(&mut self, hz: u16, ms: u16) -> Result<()> {
        self.send(&Command::play_tone(hz, ms), SendPolicy::Limited)
    }

    /// Stop the piezo. Only issued by the stop button, so it bypasses the limiter.
    pub fn stop_tone(&mut self) -> Result<()> {
        self.send(&Command::stop_tone(), SendPolicy::Bypass)
    }

    /// Silence the piezo and stop every motor.
    pub fn stop_all(&mut self) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.stop_tone() {
            warn!("hub: stop tone failed: {}", e);
        }
        self.stop_all_motors();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn port_kind(&self, port: PortId) -> Option<DeviceKind> {
        self.ports.kind(port)
    }

    pub fn sensors(&self) -> SensorReadings {
        self.sensors
    }

    pub fn tilt_x(&self) -> u8 {
        self.sensors.tilt_x
    }

    pub fn tilt_y(&self) -> u8 {
        self.sensors.tilt_y
    }

    pub fn distance(&self) -> u8 {
        self.sensors.distance
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn inbox(&self) -> &NotificationInbox {
        &self.inbox
    }
}
