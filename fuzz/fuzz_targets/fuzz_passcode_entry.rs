//! Fuzz target: `PasscodeEntry::feed`
//!
//! Each input byte is one keypad event: 0 is a key timeout, anything else
//! is mapped onto the nine keys.
//!
//! cargo fuzz run fuzz_passcode_entry

#![no_main]

use alarmlink::config::MAX_ENTRY_LEN;
use alarmlink::sensor::{EntryOutcome, PasscodeEntry};
use libfuzzer_sys::fuzz_target;

const KEYS: [char; 9] = ['1', '2', '3', '4', '5', '6', '7', '8', '9'];

fuzz_target!(|data: &[u8]| {
    let mut entry = PasscodeEntry::new('7', '8');
    for &b in data {
        let key = (b != 0).then(|| KEYS[usize::from(b) % KEYS.len()]);
        match entry.feed(key) {
            Some(EntryOutcome::Entry(code)) => {
                assert!(!code.is_empty() && code.len() <= MAX_ENTRY_LEN);
                entry = PasscodeEntry::new('7', '8');
            }
            Some(_) => entry = PasscodeEntry::new('7', '8'),
            None => assert!(entry.len() < MAX_ENTRY_LEN),
        }
    }
});
