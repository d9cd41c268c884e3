//! Mock hardware adapters for integration tests.
//!
//! Records every display/siren/LED call so tests can assert on the full
//! output history without touching real GPIO/PWM registers, and scripts
//! serial bytes, keypad presses and input pin levels.

use std::collections::VecDeque;
use std::convert::Infallible;

use alarmlink::app::events::AppEvent;
use alarmlink::app::ports::{DisplayPort, EventSink, Keypad, LampPort, SirenPort};
use alarmlink::error::{OutputError, Result};
use alarmlink::protocol::transport::{ActivityIndicator, SerialPort};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin};

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Clear,
    Line(String),
    Siren(bool),
    Intensity(u8),
}

// ── MockPanel (display + siren) ───────────────────────────────

pub struct MockPanel {
    pub calls: Vec<PanelCall>,
    siren_on: bool,
    /// Fail the n-th `set_intensity` call (1-based) to break out of the
    /// alarm ramp, which otherwise never returns.
    fail_intensity_at: Option<usize>,
    intensity_calls: usize,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            siren_on: false,
            fail_intensity_at: None,
            intensity_calls: 0,
        }
    }

    pub fn failing_intensity_at(n: usize) -> Self {
        Self {
            fail_intensity_at: Some(n),
            ..Self::new()
        }
    }

    /// Every line written, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PanelCall::Line(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_line(&self) -> Option<&str> {
        self.lines().last().copied()
    }

    /// Every successful intensity level, in order.
    pub fn intensities(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PanelCall::Intensity(l) => Some(*l),
                _ => None,
            })
            .collect()
    }

    pub fn siren_on(&self) -> bool {
        self.siren_on
    }
}

impl Default for MockPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockPanel {
    fn clear(&mut self) -> Result<()> {
        self.calls.push(PanelCall::Clear);
        Ok(())
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        self.calls.push(PanelCall::Line(text.to_owned()));
        Ok(())
    }
}

impl SirenPort for MockPanel {
    fn set_siren(&mut self, on: bool) -> Result<()> {
        self.siren_on = on;
        self.calls.push(PanelCall::Siren(on));
        Ok(())
    }

    fn set_intensity(&mut self, level: u8) -> Result<()> {
        self.intensity_calls += 1;
        if self.fail_intensity_at == Some(self.intensity_calls) {
            return Err(OutputError::PwmWriteFailed.into());
        }
        self.calls.push(PanelCall::Intensity(level));
        Ok(())
    }

    fn is_siren_on(&self) -> bool {
        self.siren_on
    }
}

// ── Scripted serial port ──────────────────────────────────────

/// Each queued entry is one `read` result: `Some(byte)` or `None` for an
/// elapsed timeout.  Once the script runs dry a timed read keeps timing
/// out and a blocking read reports the line closed.
#[derive(Default)]
pub struct ScriptedSerial {
    reads: VecDeque<Option<u8>>,
    pub written: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialClosed;

#[allow(dead_code)]
impl ScriptedSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue each entry as one `\n`-terminated line.
    pub fn lines(lines: &[&str]) -> Self {
        let mut s = Self::new();
        for l in lines {
            s.push_line(l);
        }
        s
    }

    pub fn push_line(&mut self, line: &str) {
        self.push_bytes(line.as_bytes());
        self.reads.push_back(Some(b'\n'));
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reads.extend(bytes.iter().map(|&b| Some(b)));
    }

    pub fn push_timeout(&mut self) {
        self.reads.push_back(None);
    }

    /// Everything written, split into lines.
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl SerialPort for ScriptedSerial {
    type Error = SerialClosed;

    fn read(&mut self, buf: &mut [u8], timeout_ms: Option<u32>) -> std::result::Result<usize, SerialClosed> {
        match self.reads.pop_front() {
            Some(Some(b)) => {
                buf[0] = b;
                Ok(1)
            }
            Some(None) => Ok(0),
            None if timeout_ms.is_some() => Ok(0),
            None => Err(SerialClosed),
        }
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, SerialClosed> {
        self.written.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::result::Result<(), SerialClosed> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.reads.is_empty()
    }
}

// ── Indicators ────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingIndicator {
    pub pulses: u32,
}

impl ActivityIndicator for CountingIndicator {
    fn pulse(&mut self) {
        self.pulses += 1;
    }
}

#[derive(Default)]
pub struct MockLamp {
    pub levels: Vec<bool>,
}

impl LampPort for MockLamp {
    fn set_lamp(&mut self, on: bool) -> Result<()> {
        self.levels.push(on);
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// `DelayNs` that only adds up the requested time.
#[derive(Default)]
pub struct FakeClock {
    pub elapsed_ns: u64,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for FakeClock {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

// ── Keypad ────────────────────────────────────────────────────

/// Queued presses; `None` (or an empty queue) is a key timeout.
#[derive(Default)]
pub struct ScriptedKeypad {
    keys: VecDeque<Option<char>>,
    pub timeouts_seen: Vec<u32>,
}

#[allow(dead_code)]
impl ScriptedKeypad {
    pub fn new(keys: &str) -> Self {
        Self {
            keys: keys.chars().map(Some).collect(),
            timeouts_seen: Vec::new(),
        }
    }

    pub fn push_timeout(&mut self) {
        self.keys.push_back(None);
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl Keypad for ScriptedKeypad {
    fn wait_key(&mut self, timeout_ms: u32) -> Result<Option<char>> {
        self.timeouts_seen.push(timeout_ms);
        Ok(self.keys.pop_front().flatten())
    }
}

/// Lets a test keep the script after the node is done with it.
impl Keypad for &mut ScriptedKeypad {
    fn wait_key(&mut self, timeout_ms: u32) -> Result<Option<char>> {
        (**self).wait_key(timeout_ms)
    }
}

// ── Input pin ─────────────────────────────────────────────────

/// Returns queued levels in order, then `idle` forever.
pub struct FakeInput {
    levels: VecDeque<bool>,
    idle: bool,
}

#[allow(dead_code)]
impl FakeInput {
    pub fn low() -> Self {
        Self {
            levels: VecDeque::new(),
            idle: false,
        }
    }

    pub fn high() -> Self {
        Self {
            levels: VecDeque::new(),
            idle: true,
        }
    }

    pub fn sequence(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            idle: false,
        }
    }
}

impl ErrorType for FakeInput {
    type Error = Infallible;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> std::result::Result<bool, Infallible> {
        Ok(self.levels.pop_front().unwrap_or(self.idle))
    }

    fn is_low(&mut self) -> std::result::Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<(alarmlink::fsm::StateId, alarmlink::fsm::StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
