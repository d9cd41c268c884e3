//! AlarmLink firmware library.
//!
//! Exposes the pure-logic modules for integration testing: the master's
//! alarm controller, the sensor node service, the serial token protocol
//! and the embedded-hal drivers.  ESP-IDF-specific code is guarded by
//! the `espidf` feature.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod protocol;
pub mod sensor;

pub mod adapters;
pub mod drivers;
