//! Shared mutable context threaded through every FSM handler.
//!
//! `AlarmContext` is the single struct that state handlers read from and
//! write to.  It carries the configuration, the output commands the
//! controller applies after each handler call, iteration counters, and
//! why the alarm latched.

use crate::config::SystemConfig;
use crate::protocol::Token;

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; consumed by the controller)
// ---------------------------------------------------------------------------

/// Commands that state handlers write to request output actions.
/// The controller applies these to the display and siren each iteration.
#[derive(Debug, Clone, Default)]
pub struct OutputCommands {
    /// Desired siren state.  Sticky: only Disarmed and Alarm change it.
    pub siren_enabled: bool,
    /// Pause after the status banner, before reading the link.
    pub dwell_ms: u32,
    /// Received token to show on the display; taken by the controller.
    pub echo: Option<Token>,
}

/// What latched the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmReason {
    /// A token arrived that did not contain the passcode.
    WrongPasscode,
    /// The sensor node reported that nobody typed in time.
    KeypadTimeout,
    /// The master's own receive timeout elapsed while waiting for a code.
    ReceiveTimeout,
}

impl AlarmReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WrongPasscode => "wrong passcode",
            Self::KeypadTimeout => "keypad timeout",
            Self::ReceiveTimeout => "receive timeout",
        }
    }
}

impl core::fmt::Display for AlarmReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AlarmContext
// ---------------------------------------------------------------------------

/// The shared blackboard passed to every state handler.
pub struct AlarmContext {
    /// Handlers write here; the controller applies.
    pub commands: OutputCommands,
    /// Set once, when the FSM first enters Alarm.
    pub alarm_reason: Option<AlarmReason>,

    /// Iterations since the current state was entered.
    pub iterations_in_state: u64,

    /// Successful disarms since boot.
    pub disarm_count: u32,

    /// Runtime configuration (read-only to handlers).
    pub config: SystemConfig,
}

impl AlarmContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            commands: OutputCommands::default(),
            alarm_reason: None,
            iterations_in_state: 0,
            disarm_count: 0,
            config,
        }
    }

    /// Record the alarm cause; the first one wins.
    pub fn latch_alarm(&mut self, reason: AlarmReason) {
        if self.alarm_reason.is_none() {
            self.alarm_reason = Some(reason);
        }
    }
}
