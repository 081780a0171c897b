//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements | Connects to                      |
//! |---------------|------------|----------------------------------|
//! | `log_sink`    | EventSink  | `log` facade                     |
//! | `sim_session` | Session    | In-memory simulated hub          |
//! | `time`        | Clock      | `std::time::Instant` / test clock|

pub mod log_sink;
pub mod sim_session;
pub mod time;
