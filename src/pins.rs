//! GPIO / peripheral pin assignments for both AlarmLink boards (ESP32-S3).
//!
//! Single source of truth — the binaries claim pins by these numbers
//! rather than hard-coding them.  UART0 (GPIO 43/44) stays with the
//! console; the inter-node link runs on UART1.

// ---------------------------------------------------------------------------
// Shared: inter-node serial link (UART1, 8N1), status LED
// ---------------------------------------------------------------------------

/// UART1 TX.  Cross-wired to the other board's RX.
pub const LINK_TX_GPIO: i32 = 10;
/// UART1 RX.
pub const LINK_RX_GPIO: i32 = 11;

/// Single-colour status LED, active HIGH.  Blinks per serial byte.
pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Master: HD44780 character LCD (4-bit, RW tied to GND)
// ---------------------------------------------------------------------------

pub const LCD_RS_GPIO: i32 = 4;
pub const LCD_EN_GPIO: i32 = 5;
/// D4, D5, D6, D7 in that order.
pub const LCD_DATA_GPIOS: [i32; 4] = [6, 7, 15, 16];
pub const LCD_COLS: u8 = 16;
pub const LCD_ROWS: u8 = 2;

// ---------------------------------------------------------------------------
// Master: siren
// ---------------------------------------------------------------------------

/// Digital output: siren driver enable (active HIGH).
pub const SIREN_ENABLE_GPIO: i32 = 17;
/// LEDC PWM output: siren tone / intensity.
pub const SIREN_PWM_GPIO: i32 = 18;
/// LEDC carrier frequency for the siren channel.
pub const SIREN_PWM_FREQ_HZ: u32 = 2_000;

// ---------------------------------------------------------------------------
// Sensor node: motion sensor, re-arm button, keypad
// ---------------------------------------------------------------------------

/// PIR motion sensor output.  HIGH = motion.
pub const MOTION_GPIO: i32 = 12;
/// Re-arm push button with external pull-down.  HIGH = pressed.
pub const REARM_BUTTON_GPIO: i32 = 13;

/// Keypad column drivers (outputs), C0..C2.
pub const KEYPAD_COL_GPIOS: [i32; 3] = [4, 5, 6];
/// Keypad row sense lines (inputs, internal pull-up), R0..R2.
pub const KEYPAD_ROW_GPIOS: [i32; 3] = [7, 15, 16];
