//! WeDo 2.0 wire protocol.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Protocol Stack                          │
//! │                                                            │
//! │  ┌──────────┐   ┌──────────────┐   ┌───────────────────┐   │
//! │  │  Hub     │──▶│ codec        │──▶│ Session::write    │   │
//! │  │ (model)  │   │ (commands)   │   │ (base64 payload)  │   │
//! │  └──────────┘   └──────────────┘   └───────────────────┘   │
//! │       ▲                                                    │
//! │       │         ┌──────────────┐   ┌───────────────────┐   │
//! │       └─────────│ frame        │◀──│ notification inbox│   │
//! │                 │ (decode)     │   │ (per subscription)│   │
//! │                 └──────────────┘   └───────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are fixed-length byte arrays addressed by a connect id; the
//! transport carries them base64-encoded.

pub mod codec;
pub mod frame;
pub mod gatt;
