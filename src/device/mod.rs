//! Hub device model.
//!
//! - [`hub`] — session owner, port registry and notification handling
//! - [`motor`] — per-port motor state machine
//! - [`limiter`] — fixed-window send limiter
//! - [`timer`] — single-slot cancellable deadline
//! - [`ports`] — port slots and cached sensor values
//! - [`inbox`] — notification channels fed by the session

pub mod hub;
pub mod inbox;
pub mod limiter;
pub mod motor;
pub mod ports;
pub mod timer;

pub use hub::Hub;
