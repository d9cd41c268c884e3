//! HD44780 character LCD, 4-bit parallel interface, write-only.
//!
//! ```text
//!  RS ─┐  EN ─┐  D4..D7 ─┐
//!      └──────┴──────────┴──▶ HD44780 (16x2)
//! ```
//!
//! RW is tied low, so the busy flag is never read; every command is
//! followed by a fixed wait long enough for the slowest instruction.
//! Text longer than one row continues on the next; past the last row it
//! is cut.  Non-ASCII bytes render as `?`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::DisplayPort;
use crate::error::{OutputError, Result};

// ---------------------------------------------------------------------------
// Instruction set (subset)
// ---------------------------------------------------------------------------

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Instructions other than clear/home finish within 37 µs.
const SHORT_WAIT_US: u32 = 50;
/// Clear and home take up to 1.52 ms.
const CLEAR_WAIT_US: u32 = 2000;

pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
    cols: u8,
    rows: u8,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Power-on initialisation by instruction (datasheet figure 24).
    pub fn new(rs: P, en: P, data: [P; 4], delay: D, cols: u8, rows: u8) -> Result<Self> {
        let mut lcd = Self {
            rs,
            en,
            data,
            delay,
            cols,
            rows: rows.clamp(1, ROW_OFFSETS.len() as u8),
        };

        lcd.delay.delay_ms(50);
        lcd.set(false, false)?;
        for wait_us in [4500, 150, 150] {
            lcd.write_nibble(0x03)?;
            lcd.delay.delay_us(wait_us);
        }
        lcd.write_nibble(0x02)?;
        lcd.delay.delay_us(SHORT_WAIT_US);

        lcd.command(CMD_FUNCTION_4BIT_2LINE)?;
        lcd.command(CMD_DISPLAY_ON)?;
        lcd.command(CMD_CLEAR)?;
        lcd.command(CMD_ENTRY_MODE_INC)?;
        debug!("lcd: {}x{} ready", lcd.cols, lcd.rows);
        Ok(lcd)
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        self.set(false, false)?;
        self.write_byte(cmd)?;
        let wait = if cmd == CMD_CLEAR { CLEAR_WAIT_US } else { SHORT_WAIT_US };
        self.delay.delay_us(wait);
        Ok(())
    }

    fn data_byte(&mut self, byte: u8) -> Result<()> {
        self.set(true, false)?;
        self.write_byte(byte)?;
        self.delay.delay_us(SHORT_WAIT_US);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<()> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            let res = if nibble & (1 << bit) != 0 {
                pin.set_high()
            } else {
                pin.set_low()
            };
            res.map_err(|_| OutputError::GpioWriteFailed)?;
        }
        // Enable pulse: ≥ 450 ns high, data latched on the falling edge.
        self.en.set_high().map_err(|_| OutputError::GpioWriteFailed)?;
        self.delay.delay_us(1);
        self.en.set_low().map_err(|_| OutputError::GpioWriteFailed)?;
        Ok(())
    }

    fn set(&mut self, rs: bool, en: bool) -> Result<()> {
        let r = if rs { self.rs.set_high() } else { self.rs.set_low() };
        r.map_err(|_| OutputError::GpioWriteFailed)?;
        let e = if en { self.en.set_high() } else { self.en.set_low() };
        e.map_err(|_| OutputError::GpioWriteFailed)?;
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> DisplayPort for Hd44780<P, D> {
    fn clear(&mut self) -> Result<()> {
        self.command(CMD_CLEAR)
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        let cols = usize::from(self.cols);
        let mut chars = text.chars();
        for row in 0..self.rows {
            let mut line = chars.by_ref().take(cols).peekable();
            if line.peek().is_none() {
                break;
            }
            self.command(CMD_SET_DDRAM | ROW_OFFSETS[usize::from(row)])?;
            for c in line {
                self.data_byte(if c.is_ascii() { c as u8 } else { b'?' })?;
            }
        }
        Ok(())
    }
}
