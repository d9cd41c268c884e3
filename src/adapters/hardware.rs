//! Hardware adapter — bridges the master's output drivers to the port traits.
//!
//! Owns the character display and the siren and exposes them through
//! [`DisplayPort`] and [`SirenPort`] as one value, so the controller can
//! take a single `&mut (impl DisplayPort + SirenPort)`.

use crate::app::ports::{DisplayPort, SirenPort};
use crate::error::Result;

/// Concrete adapter that combines the master's outputs behind port traits.
pub struct MasterPanel<L, S> {
    display: L,
    siren: S,
}

impl<L: DisplayPort, S: SirenPort> MasterPanel<L, S> {
    pub fn new(display: L, siren: S) -> Self {
        Self { display, siren }
    }

    pub fn siren(&self) -> &S {
        &self.siren
    }

    pub fn display(&self) -> &L {
        &self.display
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<L: DisplayPort, S> DisplayPort for MasterPanel<L, S> {
    fn clear(&mut self) -> Result<()> {
        self.display.clear()
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        self.display.write_line(text)
    }
}

// ── SirenPort implementation ──────────────────────────────────

impl<L, S: SirenPort> SirenPort for MasterPanel<L, S> {
    fn set_siren(&mut self, on: bool) -> Result<()> {
        self.siren.set_siren(on)
    }

    fn set_intensity(&mut self, level: u8) -> Result<()> {
        self.siren.set_intensity(level)
    }

    fn is_siren_on(&self) -> bool {
        self.siren.is_siren_on()
    }
}
