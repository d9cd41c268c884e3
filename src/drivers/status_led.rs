//! Single-colour status LED.
//!
//! Blinks once per serial byte as link activity and lights steadily
//! during the boot self-test.  A failed pin write is logged and
//! otherwise ignored for blinks: the LED is diagnostic only.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::LampPort;
use crate::error::{OutputError, Result};
use crate::protocol::transport::ActivityIndicator;

pub struct BlinkLed<P, D> {
    pin: P,
    delay: D,
    pulse_ms: u32,
    pulses: u32,
}

impl<P: OutputPin, D: DelayNs> BlinkLed<P, D> {
    pub fn new(pin: P, delay: D, pulse_ms: u32) -> Self {
        Self {
            pin,
            delay,
            pulse_ms,
            pulses: 0,
        }
    }

    /// Blinks since boot.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}

impl<P: OutputPin, D: DelayNs> ActivityIndicator for BlinkLed<P, D> {
    fn pulse(&mut self) {
        if let Err(e) = self.pin.set_high() {
            debug!("led: {:?}", e);
            return;
        }
        self.delay.delay_ms(self.pulse_ms);
        if let Err(e) = self.pin.set_low() {
            debug!("led: {:?}", e);
        }
        self.pulses = self.pulses.wrapping_add(1);
    }
}

impl<P: OutputPin, D: DelayNs> LampPort for BlinkLed<P, D> {
    fn set_lamp(&mut self, on: bool) -> Result<()> {
        let res = if on { self.pin.set_high() } else { self.pin.set_low() };
        res.map_err(|_| OutputError::GpioWriteFailed.into())
    }
}
