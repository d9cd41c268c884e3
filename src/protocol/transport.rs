//! Transport abstraction — a point-to-point byte stream.
//!
//! Concrete implementations:
//! - ESP-IDF UART driver (`adapters::uart`, device builds)
//! - In-memory pipe between two threads (`adapters::sim`, host builds)
//!
//! The token link is generic over `SerialPort`, so the alarm policy never
//! sees which one is underneath.

/// Byte-oriented, ordered, unacknowledged channel.
pub trait SerialPort {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Block until at least one byte is available or `timeout_ms` elapses
    /// (`None` waits forever), then read up to `buf.len()` bytes.
    /// Returns the number of bytes read; `0` means the wait timed out.
    fn read(&mut self, buf: &mut [u8], timeout_ms: Option<u32>) -> Result<usize, Self::Error>;

    /// Write `data`.  Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until everything written so far has left the device.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Whether the peer end is gone.  Real UARTs never close.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Diagnostic hook pulsed once per byte moved over the link.
pub trait ActivityIndicator {
    fn pulse(&mut self);
}

/// Indicator that does nothing (tests, headless simulation).
pub struct NoActivity;

impl ActivityIndicator for NoActivity {
    fn pulse(&mut self) {}
}
