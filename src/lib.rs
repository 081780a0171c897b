//! WeDo 2.0 hub library.
//!
//! Host-side session adapter, device model and block service for a
//! LEGO WeDo 2.0 style BLE hub. The Bluetooth stack itself is supplied by
//! the host through [`app::ports::Session`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod device;
pub mod error;
pub mod protocol;

pub use error::{Error, Result};
