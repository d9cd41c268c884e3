//! Application core — pure domain logic, zero I/O.
//!
//! The master's alarm controller lives here.  All interaction with
//! hardware happens through **port traits** defined in [`ports`] and the
//! serial [`TokenLink`](crate::protocol::link::TokenLink), keeping this
//! layer fully testable without real peripherals.

pub mod controller;
pub mod events;
pub mod ports;
