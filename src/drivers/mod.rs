//! Peripheral drivers over embedded-hal 1.0 traits.

pub mod keypad;
pub mod lcd;
pub mod siren;
pub mod status_led;
