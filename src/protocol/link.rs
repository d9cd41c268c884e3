//! Token link: line codec + transport + activity LED.
//!
//! Both nodes talk through a `TokenLink`.  The master only calls
//! [`TokenLink::receive`]; the sensor node only calls [`TokenLink::send`].
//! There is no handshake, so either side works against a peer that is
//! silent, late or absent.

use log::{debug, warn};

use super::codec::{LineDecoder, encode_line};
use super::transport::{ActivityIndicator, SerialPort};
use super::{Outbound, Reception};
use crate::config::MAX_TOKEN_LEN;
use crate::error::{LinkError, Result};

/// Which direction of traffic pulses the activity indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOn {
    Receive,
    Transmit,
}

pub struct TokenLink<P, A> {
    port: P,
    indicator: A,
    pulse_on: PulseOn,
    decoder: LineDecoder,
    sent: u32,
    received: u32,
}

impl<P: SerialPort, A: ActivityIndicator> TokenLink<P, A> {
    pub fn new(port: P, indicator: A, pulse_on: PulseOn) -> Self {
        Self {
            port,
            indicator,
            pulse_on,
            decoder: LineDecoder::new(),
            sent: 0,
            received: 0,
        }
    }

    /// Block for exactly one token.
    ///
    /// `timeout_ms` is an idle timeout: it restarts with every byte, and
    /// when it elapses any partial line is dropped.  `None` waits forever.
    pub fn receive(&mut self, timeout_ms: Option<u32>) -> Result<Reception> {
        let mut byte = [0u8; 1];
        loop {
            let n = match self.port.read(&mut byte, timeout_ms) {
                Ok(n) => n,
                Err(e) => return Err(self.link_error(&e, LinkError::ReadFailed).into()),
            };

            if n == 0 {
                if timeout_ms.is_some() {
                    if self.decoder.pending() > 0 {
                        debug!("link: idle timeout, dropping {} partial bytes", self.decoder.pending());
                    }
                    self.decoder.reset();
                    return Ok(Reception::Timeout);
                }
                continue;
            }

            if self.pulse_on == PulseOn::Receive {
                self.indicator.pulse();
            }

            if let Some(token) = self.decoder.feed(byte[0]) {
                self.received = self.received.wrapping_add(1);
                debug!("link: rx {:?}", token);
                return Ok(Reception::Token(token));
            }
        }
    }

    /// Transmit one token followed by `\n`.
    pub fn send(&mut self, token: &Outbound) -> Result<()> {
        let mut frame = [0u8; MAX_TOKEN_LEN + 1];
        let Some(len) = encode_line(token.as_str(), &mut frame) else {
            warn!("link: refusing to send unencodable token {:?}", token);
            return Err(LinkError::WriteFailed.into());
        };

        let mut offset = 0;
        while offset < len {
            let n = match self.port.write(&frame[offset..len]) {
                Ok(0) => return Err(LinkError::WriteFailed.into()),
                Ok(n) => n,
                Err(e) => return Err(self.link_error(&e, LinkError::WriteFailed).into()),
            };
            if self.pulse_on == PulseOn::Transmit {
                for _ in 0..n {
                    self.indicator.pulse();
                }
            }
            offset += n;
        }

        if let Err(e) = self.port.flush() {
            return Err(self.link_error(&e, LinkError::WriteFailed).into());
        }
        self.sent = self.sent.wrapping_add(1);
        debug!("link: tx {}", token.as_str());
        Ok(())
    }

    /// Tokens decoded since boot.
    pub fn received(&self) -> u32 {
        self.received
    }

    /// Tokens transmitted since boot.
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn indicator_mut(&mut self) -> &mut A {
        &mut self.indicator
    }

    fn link_error(&self, e: &P::Error, fallback: LinkError) -> LinkError {
        if self.port.is_closed() {
            LinkError::Closed
        } else {
            warn!("link: transport error {:?}", e);
            fallback
        }
    }
}
