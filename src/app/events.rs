//! Outbound application events.
//!
//! The [`AlarmController`](super::controller::AlarmController) and the
//! [`SensorNode`](crate::sensor::SensorNode) emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Events never carry token
//! text: a token received in MovementDetected may be the passcode.

use crate::fsm::StateId;
use crate::fsm::context::AlarmReason;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// Boot self-test finished.
    SelfTestDone { duration_ms: u32 },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A token was read while in `state`.
    TokenReceived {
        state: StateId,
        len: usize,
        truncated: bool,
    },

    /// The configured receive timeout elapsed while in `state`.
    ReceiveTimeout(StateId),

    /// The alarm latched; only a power cycle clears it.
    AlarmLatched(Option<AlarmReason>),

    /// The sensor node transmitted a token.
    TokenSent(SentKind),
}

/// What the sensor node put on the wire, without the entry text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKind {
    Movement,
    Rearm,
    Timeout,
    NoInput,
    Entry { len: usize },
}
