//! Unified error types for the hub stack.
//!
//! A single `Error` enum that every subsystem converts into, so the block
//! layer and the host loop handle failures uniformly. Variants are `Copy`
//! and carry no allocations.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible hub operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No peripheral was found or the user cancelled the chooser.
    Connection(ConnectionError),
    /// A write was attempted while no peripheral is connected.
    NotConnected,
    /// An attach notification carried a type byte we do not know.
    UnknownDeviceType(u8),
    /// The transport rejected a write or subscription.
    Transport(TransportError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::NotConnected => write!(f, "no peripheral connected"),
            Self::UnknownDeviceType(t) => write!(f, "unknown device type {t}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Connection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    /// Discovery finished without a peripheral matching the filter.
    NoPeripheralFound,
    /// The user dismissed the device chooser.
    Cancelled,
    /// The peripheral was found but the GATT connection failed.
    Refused,
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPeripheralFound => write!(f, "no matching peripheral found"),
            Self::Cancelled => write!(f, "device selection cancelled"),
            Self::Refused => write!(f, "peripheral refused the connection"),
        }
    }
}

impl From<ConnectionError> for Error {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The characteristic write was rejected.
    WriteFailed,
    /// Enabling notifications failed.
    SubscribeFailed,
    /// The payload could not be encoded for the transport.
    Encoding,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "characteristic write failed"),
            Self::SubscribeFailed => write!(f, "notification subscribe failed"),
            Self::Encoding => write!(f, "payload encoding failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
