//! Newline-delimited token codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────┬──────────┐
//! │ token text (1..N bytes)  │ \n or \r │
//! └──────────────────────────┴──────────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete tokens.
//! Leading and trailing spaces/tabs are trimmed and blank lines are
//! skipped, so `\r\n` endings and padded lines decode cleanly.
//!
//! Overflow is a hard truncation: the first [`MAX_TOKEN_LEN`] bytes are
//! kept, the rest of the line is discarded up to the terminator, and the
//! emitted token is flagged truncated.

use log::warn;

use super::Token;
use crate::config::MAX_TOKEN_LEN;

/// Streaming line decoder with a fixed receive buffer.
pub struct LineDecoder {
    buf: [u8; MAX_TOKEN_LEN],
    len: usize,
    overflowed: bool,
}

impl LineDecoder {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_TOKEN_LEN],
            len: 0,
            overflowed: false,
        }
    }

    /// Feed one byte.  Returns a token when a non-blank line completes.
    pub fn feed(&mut self, byte: u8) -> Option<Token> {
        match byte {
            b'\n' | b'\r' => self.finish_line(),
            // Leading whitespace never enters the buffer.
            b' ' | b'\t' if self.len == 0 && !self.overflowed => None,
            _ if self.len < MAX_TOKEN_LEN => {
                self.buf[self.len] = byte;
                self.len += 1;
                None
            }
            _ => {
                self.overflowed = true;
                None
            }
        }
    }

    /// Bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        self.len
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.len = 0;
        self.overflowed = false;
    }

    fn finish_line(&mut self) -> Option<Token> {
        let mut end = self.len;
        while end > 0 && matches!(self.buf[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        let truncated = self.overflowed;
        self.reset();

        if end == 0 {
            return None;
        }
        if truncated {
            warn!("line exceeded {} bytes, truncated", MAX_TOKEN_LEN);
        }
        Some(Token::from_bytes(&self.buf[..end]).with_truncation(truncated))
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a token line into `out_buf` as `<text>\n`.
///
/// Returns the number of bytes written, or `None` if the text is empty,
/// contains a line terminator, or does not fit.
pub fn encode_line(text: &str, out_buf: &mut [u8]) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || bytes.iter().any(|b| matches!(b, b'\n' | b'\r')) {
        return None;
    }
    let total = bytes.len() + 1;
    if total > out_buf.len() {
        return None;
    }
    out_buf[..bytes.len()].copy_from_slice(bytes);
    out_buf[bytes.len()] = b'\n';
    Some(total)
}
