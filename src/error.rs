//! Unified error types for the AlarmLink firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the node
//! loops handle failures uniformly.  All variants are `Copy` so they pass
//! through the controller and the sensor loop without allocation.
//!
//! Protocol-level conditions (receive timeout, unrecognised token) are
//! *not* errors: they are ordinary inputs to the alarm policy.  This type
//! only covers peripheral and configuration failures.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The serial link failed or was closed.
    Link(LinkError),
    /// The keypad could not be scanned.
    Keypad(KeypadError),
    /// A display, siren or LED command failed.
    Output(OutputError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Keypad(e) => write!(f, "keypad: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Serial link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// UART read returned an error.
    ReadFailed,
    /// UART write returned an error or wrote nothing.
    WriteFailed,
    /// The peer end of the byte stream is gone (simulation / tests only).
    Closed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "serial read failed"),
            Self::WriteFailed => write!(f, "serial write failed"),
            Self::Closed => write!(f, "link closed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Keypad errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadError {
    /// Driving a column line failed.
    ColumnWriteFailed,
    /// Sampling a row line failed.
    RowReadFailed,
}

impl fmt::Display for KeypadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnWriteFailed => write!(f, "column write failed"),
            Self::RowReadFailed => write!(f, "row read failed"),
        }
    }
}

impl From<KeypadError> for Error {
    fn from(e: KeypadError) -> Self {
        Self::Keypad(e)
    }
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// GPIO read failed (motion sensor, re-arm button).
    GpioReadFailed,
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
