//! Siren driver: enable pin plus PWM intensity channel.
//!
//! The alarm drives the intensity with a triangle wave produced by
//! [`SirenRamp`], one step per tick, forever.
//!
//! ## Dual-target design
//!
//! Generic over embedded-hal 1.0 `OutputPin` and `SetDutyCycle`.  On
//! ESP-IDF the binary plugs in a `PinDriver` and an `LedcDriver`; host
//! tests plug in recording fakes.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::SirenPort;
use crate::error::{OutputError, Result};

// ---------------------------------------------------------------------------
// Ramp generator
// ---------------------------------------------------------------------------

/// Reflecting bounded counter.
///
/// ```text
/// low, low+1, …, high, high-1, …, low, low+1, …
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SirenRamp {
    low: u8,
    high: u8,
    level: u8,
    rising: bool,
}

impl SirenRamp {
    pub const fn new(low: u8, high: u8) -> Self {
        Self {
            low,
            high,
            level: low,
            rising: true,
        }
    }

    /// The level the next [`tick`](Self::tick) will emit.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Emit the current level and step one unit, reversing at a bound.
    pub fn tick(&mut self) -> u8 {
        let out = self.level;
        if self.low >= self.high {
            return out;
        }
        if self.rising {
            if self.level >= self.high {
                self.rising = false;
                self.level -= 1;
            } else {
                self.level += 1;
            }
        } else if self.level <= self.low {
            self.rising = true;
            self.level += 1;
        } else {
            self.level -= 1;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct SirenDriver<P, W> {
    enable: P,
    pwm: W,
    on: bool,
    level: u8,
}

impl<P: OutputPin, W: SetDutyCycle> SirenDriver<P, W> {
    /// Wrap the pins.  Call [`SirenPort::set_siren`] to put them in a
    /// known state; construction does not touch the hardware.
    pub fn new(enable: P, pwm: W) -> Self {
        Self {
            enable,
            pwm,
            on: false,
            level: 0,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl<P: OutputPin, W: SetDutyCycle> SirenPort for SirenDriver<P, W> {
    fn set_siren(&mut self, on: bool) -> Result<()> {
        let res = if on {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
        if let Err(e) = res {
            warn!("siren: enable pin write failed: {:?}", e);
            return Err(OutputError::GpioWriteFailed.into());
        }
        self.on = on;
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<()> {
        if let Err(e) = self.pwm.set_duty_cycle_fraction(u16::from(level), 255) {
            warn!("siren: PWM write failed: {:?}", e);
            return Err(OutputError::PwmWriteFailed.into());
        }
        self.level = level;
        Ok(())
    }

    fn is_siren_on(&self) -> bool {
        self.on
    }
}
