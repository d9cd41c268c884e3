//! Serial line protocol shared by the master and the sensor node.
//!
//! ```text
//!  Sensor node                                   Master
//!  ───────────                                   ──────
//!  motion ─▶ "movement\n" ───────────────────▶  Armed → MovementDetected
//!  keypad ─▶ "<entry>\n" | "timeout\n"
//!            | "no input\n" ─────────────────▶  MovementDetected → …
//!  button ─▶ "rearm\n" ──────────────────────▶  Disarmed → Armed
//! ```
//!
//! One token per line, ASCII, no length prefix, no checksum, no
//! acknowledgement, no retry.  Ordering is whatever the byte stream gives.
//! Matching on the receive side is substring containment against the
//! literals below, so extra characters around a literal are tolerated.

pub mod codec;
pub mod link;
pub mod transport;

use core::fmt;

use heapless::{String, Vec};

use crate::config::{MAX_ENTRY_LEN, MAX_TOKEN_LEN};

/// Motion detected; a passcode-or-timeout token follows.
pub const MOVEMENT: &str = "movement";
/// Re-arm button pressed.
pub const REARM: &str = "rearm";
/// No key pressed within the per-key window.
pub const TIMEOUT: &str = "timeout";
/// Submit pressed with nothing composed.
pub const NO_INPUT: &str = "no input";

// ---------------------------------------------------------------------------
// Received token
// ---------------------------------------------------------------------------

/// One received line, bounded to [`MAX_TOKEN_LEN`] bytes.
///
/// Bytes are kept raw: a garbled line is still a token and is matched
/// bytewise.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    bytes: Vec<u8, MAX_TOKEN_LEN>,
    truncated: bool,
}

impl Token {
    /// Build a token from raw bytes, truncating past the receive bound.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let keep = raw.len().min(MAX_TOKEN_LEN);
        let mut bytes = Vec::new();
        // Cannot fail: `keep` never exceeds capacity.
        let _ = bytes.extend_from_slice(&raw[..keep]);
        Self {
            bytes,
            truncated: raw.len() > MAX_TOKEN_LEN,
        }
    }

    pub(crate) fn with_truncation(mut self, truncated: bool) -> Self {
        self.truncated |= truncated;
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The token as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Whether the sender's line was longer than the receive bound.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Substring containment against a protocol literal.
    pub fn contains(&self, literal: &str) -> bool {
        let needle = literal.as_bytes();
        !needle.is_empty() && self.bytes.windows(needle.len()).any(|w| w == needle)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => {
                for &b in self.bytes.iter() {
                    if b.is_ascii_graphic() || b == b' ' {
                        write!(f, "{}", b as char)?;
                    } else {
                        write!(f, "\\x{b:02x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(\"{self}\"")?;
        if self.truncated {
            write!(f, ", truncated")?;
        }
        write!(f, ")")
    }
}

/// Result of one blocking read on the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reception {
    /// A complete line arrived.
    Token(Token),
    /// The configured idle timeout elapsed with no complete line.
    Timeout,
}

// ---------------------------------------------------------------------------
// Outbound token (sensor node side)
// ---------------------------------------------------------------------------

/// Everything the sensor node can put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Movement,
    Rearm,
    Timeout,
    NoInput,
    /// A non-empty keypad entry.
    Entry(String<MAX_ENTRY_LEN>),
}

impl Outbound {
    /// On-the-wire text, without the line terminator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Movement => MOVEMENT,
            Self::Rearm => REARM,
            Self::Timeout => TIMEOUT,
            Self::NoInput => NO_INPUT,
            Self::Entry(code) => code.as_str(),
        }
    }
}
