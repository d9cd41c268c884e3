//! 3x3 matrix keypad scanner.
//!
//! ```text
//!            C0   C1   C2      columns: outputs, idle high
//!      R0 ── 1 ── 2 ── 3       rows:    inputs with pull-ups
//!      R1 ── 4 ── 5 ── 6
//!      R2 ── 7 ── 8 ── 9
//! ```
//!
//! A scan pulls one column low at a time and looks for a row reading low.
//! A press counts once it survives a debounce re-scan; the key is reported
//! after release so holding a key never repeats it.  Scanning, debounce
//! and the release wait all draw on one per-key timeout; a key still held
//! when it runs out reads as a timeout.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use crate::app::ports::Keypad;
use crate::error::{KeypadError, Result};

pub const LAYOUT: [[char; 3]; 3] = [['1', '2', '3'], ['4', '5', '6'], ['7', '8', '9']];

const SCAN_INTERVAL_MS: u32 = 5;
const DEBOUNCE_MS: u32 = 20;
const SETTLE_US: u32 = 10;

pub struct MatrixKeypad<O, I, D> {
    cols: [O; 3],
    rows: [I; 3],
    delay: D,
}

impl<O: OutputPin, I: InputPin, D: DelayNs> MatrixKeypad<O, I, D> {
    pub fn new(cols: [O; 3], rows: [I; 3], delay: D) -> Result<Self> {
        let mut pad = Self { cols, rows, delay };
        pad.release_columns()?;
        Ok(pad)
    }

    /// One pass over the matrix.  Returns the first pressed key.
    pub fn scan(&mut self) -> Result<Option<char>> {
        for c in 0..self.cols.len() {
            self.cols[c].set_low().map_err(|_| KeypadError::ColumnWriteFailed)?;
            self.delay.delay_us(SETTLE_US);
            let mut hit = None;
            for (r, row) in self.rows.iter_mut().enumerate() {
                if row.is_low().map_err(|_| KeypadError::RowReadFailed)? {
                    hit = Some(LAYOUT[r][c]);
                    break;
                }
            }
            self.cols[c].set_high().map_err(|_| KeypadError::ColumnWriteFailed)?;
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }

    fn release_columns(&mut self) -> Result<()> {
        for col in self.cols.iter_mut() {
            col.set_high().map_err(|_| KeypadError::ColumnWriteFailed)?;
        }
        Ok(())
    }

    /// Wait for the matrix to go quiet, drawing on the same budget as
    /// the press.  A key still down when it runs out is a timeout.
    fn wait_release(&mut self, key: char, timeout_ms: u32, waited: &mut u32) -> Result<Option<char>> {
        while self.scan()?.is_some() {
            if *waited >= timeout_ms {
                debug!("keypad: key held past {} ms", timeout_ms);
                return Ok(None);
            }
            self.delay.delay_ms(SCAN_INTERVAL_MS);
            *waited = waited.saturating_add(SCAN_INTERVAL_MS);
        }
        Ok(Some(key))
    }
}

impl<O: OutputPin, I: InputPin, D: DelayNs> Keypad for MatrixKeypad<O, I, D> {
    fn wait_key(&mut self, timeout_ms: u32) -> Result<Option<char>> {
        // Every delay below counts against the one per-key window.
        let mut waited = 0u32;
        loop {
            if let Some(key) = self.scan()? {
                self.delay.delay_ms(DEBOUNCE_MS);
                waited = waited.saturating_add(DEBOUNCE_MS);
                if self.scan()? == Some(key) {
                    let released = self.wait_release(key, timeout_ms, &mut waited)?;
                    if released.is_some() {
                        debug!("keypad: key");
                    }
                    return Ok(released);
                }
            }
            if waited >= timeout_ms {
                return Ok(None);
            }
            self.delay.delay_ms(SCAN_INTERVAL_MS);
            waited = waited.saturating_add(SCAN_INTERVAL_MS);
        }
    }
}
