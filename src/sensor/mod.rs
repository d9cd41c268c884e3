//! Sensor node service.
//!
//! ```text
//!  motion pin ──high──▶ "movement" ─▶ keypad ─▶ entry | "timeout" | "no input"
//!  rearm pin  ──high──▶ "rearm"
//! ```
//!
//! Both inputs are level-sampled; motion is checked first and wins when
//! both are high.  The node keeps no state between polls.

pub mod entry;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::app::events::{AppEvent, SentKind};
use crate::app::ports::{EventSink, Keypad, LampPort};
use crate::config::SystemConfig;
use crate::error::{OutputError, Result};
use crate::protocol::Outbound;
use crate::protocol::link::TokenLink;
use crate::protocol::transport::{ActivityIndicator, SerialPort};

pub use entry::{EntryOutcome, PasscodeEntry, collect_passcode};

/// What one poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    /// `movement` was sent, followed by this outcome.
    Movement(EntryOutcome),
    /// `rearm` was sent.
    Rearm,
}

pub struct SensorNode<M, R, K> {
    motion: M,
    rearm: R,
    keypad: K,
    config: SystemConfig,
}

impl<M, R, K> SensorNode<M, R, K>
where
    M: InputPin,
    R: InputPin,
    K: Keypad,
{
    pub fn new(motion: M, rearm: R, keypad: K, config: SystemConfig) -> Self {
        Self {
            motion,
            rearm,
            keypad,
            config,
        }
    }

    /// Light the status LED for `self_test_ms`.
    pub fn self_test(&mut self, lamp: &mut impl LampPort, delay: &mut impl DelayNs) -> Result<()> {
        lamp.set_lamp(true)?;
        delay.delay_ms(self.config.self_test_ms);
        lamp.set_lamp(false)
    }

    /// Sample both inputs once and transmit whatever they call for.
    pub fn poll<P, A>(
        &mut self,
        link: &mut TokenLink<P, A>,
        sink: &mut impl EventSink,
    ) -> Result<Option<Activity>>
    where
        P: SerialPort,
        A: ActivityIndicator,
    {
        if self.motion.is_high().map_err(|e| pin_error("motion", e))? {
            info!("SENSOR: motion");
            send(link, &Outbound::Movement, sink)?;
            let outcome = collect_passcode(&mut self.keypad, &self.config)?;
            send(link, &Outbound::from(outcome.clone()), sink)?;
            return Ok(Some(Activity::Movement(outcome)));
        }

        if self.rearm.is_high().map_err(|e| pin_error("rearm", e))? {
            info!("SENSOR: rearm pressed");
            send(link, &Outbound::Rearm, sink)?;
            return Ok(Some(Activity::Rearm));
        }

        Ok(None)
    }

    /// Poll forever, `poll_interval_ms` apart.  Only errors return.
    pub fn run<P, A>(
        &mut self,
        link: &mut TokenLink<P, A>,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<Infallible>
    where
        P: SerialPort,
        A: ActivityIndicator,
    {
        loop {
            self.poll(link, sink)?;
            delay.delay_ms(self.config.poll_interval_ms);
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

fn send<P, A>(link: &mut TokenLink<P, A>, token: &Outbound, sink: &mut impl EventSink) -> Result<()>
where
    P: SerialPort,
    A: ActivityIndicator,
{
    link.send(token)?;
    sink.emit(&AppEvent::TokenSent(sent_kind(token)));
    Ok(())
}

fn sent_kind(token: &Outbound) -> SentKind {
    match token {
        Outbound::Movement => SentKind::Movement,
        Outbound::Rearm => SentKind::Rearm,
        Outbound::Timeout => SentKind::Timeout,
        Outbound::NoInput => SentKind::NoInput,
        Outbound::Entry(code) => SentKind::Entry { len: code.len() },
    }
}

fn pin_error(which: &str, e: impl core::fmt::Debug) -> OutputError {
    warn!("SENSOR: {} pin read failed: {:?}", which, e);
    OutputError::GpioReadFailed
}
