//! Keypad passcode composition.
//!
//! [`PasscodeEntry`] is the pure state machine: feed it one key (or a
//! timeout) at a time and it eventually yields an [`EntryOutcome`].
//! [`collect_passcode`] drives it from a [`Keypad`].
//!
//! ```text
//!  key timeout ────────────────────────▶ Timeout  (at any point)
//!  submit, nothing composed ───────────▶ NoInput
//!  submit ─────────────────────────────▶ Entry(buf)
//!  delete ──▶ drop last char (no-op when empty)
//!  other  ──▶ append; buffer full ─────▶ Entry(buf)
//! ```

use heapless::String;
use log::debug;

use crate::app::ports::Keypad;
use crate::config::{MAX_ENTRY_LEN, SystemConfig};
use crate::error::Result;
use crate::protocol::Outbound;

/// What one composition produced.  Never an empty entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Entry(String<MAX_ENTRY_LEN>),
    Timeout,
    NoInput,
}

impl From<EntryOutcome> for Outbound {
    fn from(outcome: EntryOutcome) -> Self {
        match outcome {
            EntryOutcome::Entry(code) => Outbound::Entry(code),
            EntryOutcome::Timeout => Outbound::Timeout,
            EntryOutcome::NoInput => Outbound::NoInput,
        }
    }
}

pub struct PasscodeEntry {
    buf: String<MAX_ENTRY_LEN>,
    delete_key: char,
    submit_key: char,
}

impl PasscodeEntry {
    pub fn new(delete_key: char, submit_key: char) -> Self {
        Self {
            buf: String::new(),
            delete_key,
            submit_key,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.delete_key, config.submit_key)
    }

    /// Feed one key press, or `None` for an elapsed key timeout.
    pub fn feed(&mut self, key: Option<char>) -> Option<EntryOutcome> {
        let Some(key) = key else {
            self.buf.clear();
            return Some(EntryOutcome::Timeout);
        };

        if key == self.submit_key {
            return Some(self.finish());
        }
        if key == self.delete_key {
            self.buf.pop();
            return None;
        }
        if self.buf.push(key).is_err() || self.buf.len() == MAX_ENTRY_LEN {
            debug!("entry: compose buffer full, submitting");
            return Some(self.finish());
        }
        None
    }

    /// Characters composed so far.
    pub fn len(&self) -> usize {
        self.buf.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn finish(&mut self) -> EntryOutcome {
        if self.buf.is_empty() {
            return EntryOutcome::NoInput;
        }
        EntryOutcome::Entry(core::mem::take(&mut self.buf))
    }
}

/// Block on the keypad until composition ends.
pub fn collect_passcode(keypad: &mut impl Keypad, config: &SystemConfig) -> Result<EntryOutcome> {
    let mut entry = PasscodeEntry::from_config(config);
    loop {
        let key = keypad.wait_key(config.key_timeout_ms)?;
        if let Some(outcome) = entry.feed(key) {
            return Ok(outcome);
        }
    }
}
