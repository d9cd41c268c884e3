//! ESP-IDF UART adapter.
//!
//! Wraps an `esp_idf_hal::uart::UartDriver` (8N1, no flow control) behind
//! the [`SerialPort`] transport trait.  Device builds only.

use esp_idf_hal::delay::{BLOCK, TickType};
use esp_idf_hal::uart::{UartDriver, config};
use esp_idf_hal::units::Hertz;
use esp_idf_sys::EspError;

use crate::protocol::transport::SerialPort;

/// Driver configuration for the inter-node link.
pub fn link_config(baud_rate: u32) -> config::Config {
    config::Config::default()
        .baudrate(Hertz(baud_rate))
        .data_bits(config::DataBits::DataBits8)
        .parity_none()
        .stop_bits(config::StopBits::STOP1)
}

pub struct EspUart<'d> {
    driver: UartDriver<'d>,
}

impl<'d> EspUart<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self { driver }
    }
}

impl SerialPort for EspUart<'_> {
    type Error = EspError;

    fn read(&mut self, buf: &mut [u8], timeout_ms: Option<u32>) -> Result<usize, EspError> {
        let ticks = match timeout_ms {
            Some(ms) => TickType::new_millis(u64::from(ms)).ticks(),
            None => BLOCK,
        };
        self.driver.read(buf, ticks)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        self.driver.write(data)
    }

    fn flush(&mut self) -> Result<(), EspError> {
        self.driver.wait_tx_done(BLOCK)
    }
}
