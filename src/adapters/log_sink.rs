//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART0 / USB-CDC in production).
//! Events carry lengths, never token text.

use log::{error, info, warn};

use crate::app::events::{AppEvent, SentKind};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::SelfTestDone { duration_ms } => {
                info!("SELFTEST | done in {} ms", duration_ms);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::TokenReceived {
                state,
                len,
                truncated,
            } => {
                if *truncated {
                    warn!("TOKEN | state={:?} | {} bytes (truncated)", state, len);
                } else {
                    info!("TOKEN | state={:?} | {} bytes", state, len);
                }
            }
            AppEvent::ReceiveTimeout(state) => {
                warn!("TOKEN | state={:?} | receive timeout", state);
            }
            AppEvent::AlarmLatched(reason) => match reason {
                Some(r) => error!("ALARM | latched: {}", r),
                None => error!("ALARM | latched"),
            },
            AppEvent::TokenSent(kind) => match kind {
                SentKind::Entry { len } => info!("SENT | entry ({} chars)", len),
                other => info!("SENT | {:?}", other),
            },
        }
    }
}
