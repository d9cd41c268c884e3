//! In-memory serial line for host simulation.
//!
//! [`pipe`] returns the two ends of a full-duplex byte stream.  Each end
//! can live on its own thread; nothing else is shared between them, the
//! same as two boards joined by TX/RX wires.  Dropping one end closes the
//! line for the other.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError, channel};
use std::time::Duration;

use crate::protocol::transport::SerialPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The other end was dropped.
    Closed,
}

/// One end of a simulated serial line.
pub struct SimSerial {
    tx: Sender<u8>,
    rx: Receiver<u8>,
    closed: bool,
}

/// Create a connected pair of serial ends.
pub fn pipe() -> (SimSerial, SimSerial) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    (
        SimSerial {
            tx: a_tx,
            rx: a_rx,
            closed: false,
        },
        SimSerial {
            tx: b_tx,
            rx: b_rx,
            closed: false,
        },
    )
}

impl SerialPort for SimSerial {
    type Error = SimError;

    fn read(&mut self, buf: &mut [u8], timeout_ms: Option<u32>) -> Result<usize, SimError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let first = match timeout_ms {
            Some(ms) => match self.rx.recv_timeout(Duration::from_millis(u64::from(ms))) {
                Ok(b) => b,
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    self.closed = true;
                    return Err(SimError::Closed);
                }
            },
            None => self.rx.recv().map_err(|_| {
                self.closed = true;
                SimError::Closed
            })?,
        };
        buf[0] = first;

        let mut n = 1;
        while n < buf.len() {
            match self.rx.try_recv() {
                Ok(b) => {
                    buf[n] = b;
                    n += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, SimError> {
        for &b in data {
            if self.tx.send(b).is_err() {
                self.closed = true;
                return Err(SimError::Closed);
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
