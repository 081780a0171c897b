//! Notification inbox: one bounded FIFO shared by every subscription.
//!
//! Uses an `embassy-sync` channel with a no-op raw mutex: everything runs
//! on the host's single event loop. The session pushes through a
//! [`NotificationSender`] that tags each payload with its subscription;
//! the hub is the only consumer and drains in arrival order, so a value
//! frame never overtakes the detach that followed it.
//!
//! ```text
//! ┌──────────────┐  base64   ┌──────────────────────────┐         ┌─────────┐
//! │   Session    │──────────▶│ (Subscription, Payload)  │────────▶│   Hub   │
//! │  (callback)  │──────────▶│        FIFO              │         │         │
//! └──────────────┘           └──────────────────────────┘         └─────────┘
//! ```

use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::protocol::codec::{MAX_NOTIFICATION_LEN, decode_notification};
use crate::protocol::gatt::{CHAR_ATTACHED_IO, CHAR_INPUT_VALUES, DEVICE_SERVICE, IO_SERVICE};

/// Channel depth, shared by all subscriptions.
pub const INBOX_DEPTH: usize = 32;

/// Decoded notification bytes.
pub type Payload = heapless::Vec<u8, MAX_NOTIFICATION_LEN>;

/// The characteristics the hub subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    /// Attach / detach events on DEVICE_SERVICE.
    AttachedIo,
    /// Sensor values on IO_SERVICE.
    InputValues,
}

impl Subscription {
    pub const fn service(self) -> u128 {
        match self {
            Self::AttachedIo => DEVICE_SERVICE,
            Self::InputValues => IO_SERVICE,
        }
    }

    pub const fn characteristic(self) -> u128 {
        match self {
            Self::AttachedIo => CHAR_ATTACHED_IO,
            Self::InputValues => CHAR_INPUT_VALUES,
        }
    }
}

type Queue = Channel<NoopRawMutex, (Subscription, Payload), INBOX_DEPTH>;

pub struct NotificationInbox {
    queue: Queue,
}

impl Default for NotificationInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationInbox {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
        }
    }

    /// Decode and enqueue a base64 payload. Returns `false` if it was
    /// malformed or the channel was full (packet dropped).
    pub fn push(&self, subscription: Subscription, base64: &str) -> bool {
        let Some(payload) = decode_notification(base64) else {
            warn!("inbox: undecodable {:?} payload dropped", subscription);
            return false;
        };
        if self.queue.try_send((subscription, payload)).is_err() {
            warn!("inbox: channel full, dropping {:?} notification", subscription);
            return false;
        }
        true
    }

    /// Oldest queued payload, whichever subscription delivered it.
    pub fn pop(&self) -> Option<(Subscription, Payload)> {
        self.queue.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop everything queued.
    pub fn drain(&self) {
        while self.queue.try_receive().is_ok() {}
    }
}

/// Producer handle given to the session for one subscription.
#[derive(Clone)]
pub struct NotificationSender {
    inbox: Rc<NotificationInbox>,
    subscription: Subscription,
}

impl NotificationSender {
    pub fn new(inbox: Rc<NotificationInbox>, subscription: Subscription) -> Self {
        Self {
            inbox,
            subscription,
        }
    }

    /// Hand one received packet to the hub.
    pub fn deliver(&self, base64: &str) -> bool {
        self.inbox.push(self.subscription, base64)
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription
    }
}
