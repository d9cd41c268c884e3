//! System configuration parameters
//!
//! All tunable parameters for both nodes.  There is no persistent
//! storage: `SystemConfig::default()` *is* the build-time configuration,
//! and each binary validates it once at boot.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Receive bound: the longest token the master will evaluate (bytes).
pub const MAX_TOKEN_LEN: usize = 100;

/// Compose bound: the longest passcode the keypad reader will build.
pub const MAX_ENTRY_LEN: usize = 20;

/// The secret compiled into the firmware.
pub const DEFAULT_PASSCODE: &str = "1245";

/// How a received token is compared against the passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PasscodeMatch {
    /// Accept any token containing the passcode as a contiguous substring
    /// (`"a1245b"` disarms).  Matches the deployed sensor nodes.
    #[default]
    Contains,
    /// Accept only a token equal to the passcode.
    Exact,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Passcode ---
    /// Disarm secret.  Never serialised, so config dumps cannot leak it.
    #[serde(skip_serializing)]
    pub passcode: String<MAX_ENTRY_LEN>,
    /// Substring or exact comparison.
    pub passcode_match: PasscodeMatch,

    // --- Keypad (sensor node) ---
    /// Per-key wait before the entry is abandoned as `timeout` (ms).
    pub key_timeout_ms: u32,
    /// Key that removes the last composed character.
    /// The 3x3 keypad has no dedicated function keys, so a digit is used.
    pub delete_key: char,
    /// Key that ends composition.
    pub submit_key: char,
    /// Delay between motion / re-arm samples (ms).
    pub poll_interval_ms: u32,

    // --- Master timing ---
    /// Idle timeout for one token read.  `None` blocks forever.
    pub receive_timeout_ms: Option<u32>,
    /// How long the raw passcode token stays on the display (ms).
    pub echo_dwell_ms: u32,
    /// Pause on the "Correct password!" screen (ms).
    pub correct_dwell_ms: u32,
    /// Pause on the "System disarmed" screen before listening (ms).
    pub disarmed_dwell_ms: u32,
    /// Gap between controller iterations (ms).
    pub loop_gap_ms: u32,

    // --- Siren ---
    /// Lower bound of the alarm intensity ramp.
    pub siren_ramp_low: u8,
    /// Upper bound of the alarm intensity ramp.
    pub siren_ramp_high: u8,
    /// Ramp step period (ms).
    pub siren_tick_ms: u32,

    // --- Link / diagnostics ---
    /// UART baud rate (8N1).
    pub baud_rate: u32,
    /// Activity LED pulse per serial byte (ms).
    pub led_pulse_ms: u32,
    /// Boot self-test duration for LED / siren / display (ms).
    pub self_test_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Passcode
            passcode: default_passcode(),
            passcode_match: PasscodeMatch::Contains,

            // Keypad
            key_timeout_ms: 5000,
            delete_key: '7',
            submit_key: '8',
            poll_interval_ms: 10,

            // Master timing
            receive_timeout_ms: None,
            echo_dwell_ms: 3000,
            correct_dwell_ms: 1000,
            disarmed_dwell_ms: 1000,
            loop_gap_ms: 100,

            // Siren
            siren_ramp_low: 100,
            siren_ramp_high: 255,
            siren_tick_ms: 1,

            // Link / diagnostics
            baud_rate: 9600,
            led_pulse_ms: 10,
            self_test_ms: 2000,
        }
    }
}

fn default_passcode() -> String<MAX_ENTRY_LEN> {
    String::try_from(DEFAULT_PASSCODE).unwrap_or_default()
}

impl SystemConfig {
    /// Reject combinations that would make the system unusable.
    pub fn validate(&self) -> Result<()> {
        if self.passcode.is_empty() {
            return Err(Error::Config("passcode is empty"));
        }
        if self.delete_key == self.submit_key {
            return Err(Error::Config("delete and submit keys collide"));
        }
        if self.passcode.contains(self.delete_key) || self.passcode.contains(self.submit_key) {
            return Err(Error::Config("passcode contains a keypad control key"));
        }
        if self.key_timeout_ms == 0 {
            return Err(Error::Config("key timeout must be non-zero"));
        }
        if self.siren_ramp_low >= self.siren_ramp_high {
            return Err(Error::Config("siren ramp low must be below high"));
        }
        if self.siren_tick_ms == 0 {
            return Err(Error::Config("siren tick must be non-zero"));
        }
        if self.baud_rate == 0 {
            return Err(Error::Config("baud rate must be non-zero"));
        }
        Ok(())
    }

    /// Whether `token` satisfies the passcode under the configured mode.
    pub fn passcode_matches(&self, token: &[u8]) -> bool {
        let code = self.passcode.as_bytes();
        match self.passcode_match {
            PasscodeMatch::Exact => token == code,
            PasscodeMatch::Contains => {
                !code.is_empty() && token.windows(code.len()).any(|w| w == code)
            }
        }
    }
}
