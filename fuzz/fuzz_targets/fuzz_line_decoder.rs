//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences into the line decoder and asserts that
//! it never panics, never yields a blank or oversized token, and keeps
//! working after a reset.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use alarmlink::config::{MAX_TOKEN_LEN, SystemConfig};
use alarmlink::protocol::codec::LineDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let mut decoder = LineDecoder::new();

    for &b in data {
        if let Some(token) = decoder.feed(b) {
            assert!(!token.is_empty(), "decoder must not yield a blank token");
            assert!(token.len() <= MAX_TOKEN_LEN, "token exceeds receive bound");
            // Matching must cope with any bytes, UTF-8 or not.
            let _ = config.passcode_matches(token.as_bytes());
            let _ = token.to_string();
        }
    }

    decoder.reset();
    assert_eq!(decoder.pending(), 0);
    for &b in data {
        let _ = decoder.feed(b);
    }
});
