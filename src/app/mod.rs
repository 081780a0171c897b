//! Application core: block semantics over the hub model.
//!
//! This module holds the block-level rules for driving a WeDo 2.0 hub:
//! motor selectors, clamping, colour and note conversion, tilt math.
//! All interaction with the Bluetooth stack happens through the **port
//! traits** defined in [`ports`], keeping this layer testable without a
//! real peripheral.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
