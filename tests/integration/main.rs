//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the simulated session. All tests run on the host with no
//! Bluetooth adapter required.

mod blocks_tests;
mod harness;
mod motor_tests;
mod session_tests;
