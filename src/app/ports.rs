//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmController / SensorNode (domain)
//! ```
//!
//! Drivers (LCD, siren, LED, keypad) and event sinks implement these
//! traits.  The controller and the sensor node consume them via generics,
//! so the domain core never touches hardware directly.  The serial line
//! has its own port, [`SerialPort`](crate::protocol::transport::SerialPort).

use crate::error::Result;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Display port (domain → character display)
// ───────────────────────────────────────────────────────────────

/// Status display.  Text that does not fit is cut at the panel width.
pub trait DisplayPort {
    fn clear(&mut self) -> Result<()>;

    fn write_line(&mut self, text: &str) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Siren port (domain → enable pin + PWM intensity)
// ───────────────────────────────────────────────────────────────

pub trait SirenPort {
    /// Assert or release the siren enable output.
    fn set_siren(&mut self, on: bool) -> Result<()>;

    /// Drive the modulation signal (0 = silent, 255 = full).
    fn set_intensity(&mut self, level: u8) -> Result<()>;

    fn is_siren_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Lamp port (domain → status LED, steady level)
// ───────────────────────────────────────────────────────────────

/// Steady on/off control of a status LED, used by the boot self-test.
/// Per-byte blinking goes through
/// [`ActivityIndicator`](crate::protocol::transport::ActivityIndicator).
pub trait LampPort {
    fn set_lamp(&mut self, on: bool) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Keypad port (hardware → sensor node)
// ───────────────────────────────────────────────────────────────

pub trait Keypad {
    /// Block until one key is pressed and released, or `timeout_ms`
    /// elapses (`Ok(None)`).
    fn wait_key(&mut self, timeout_ms: u32) -> Result<Option<char>>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
