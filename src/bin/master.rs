//! AlarmLink master — entry point.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EspUart + BlinkLed ──▶ TokenLink                           │
//! │  Hd44780 + SirenDriver ──▶ MasterPanel                      │
//! │  LogEventSink                                               │
//! │  ──────────────── Port Trait Boundary ────────────────      │
//! │  ┌───────────────────────────────────────────────────┐      │
//! │  │        AlarmController (FSM · siren ramp)         │      │
//! │  └───────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Output, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::UartDriver;
use esp_idf_hal::units::Hertz;
use log::{error, info};

use alarmlink::adapters::hardware::MasterPanel;
use alarmlink::adapters::log_sink::LogEventSink;
use alarmlink::adapters::uart::{EspUart, link_config};
use alarmlink::app::controller::AlarmController;
use alarmlink::app::ports::SirenPort;
use alarmlink::config::SystemConfig;
use alarmlink::drivers::lcd::Hd44780;
use alarmlink::drivers::siren::SirenDriver;
use alarmlink::drivers::status_led::BlinkLed;
use alarmlink::pins;
use alarmlink::protocol::link::{PulseOn, TokenLink};

/// Claim a GPIO as a push-pull output.
fn output(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
    // SAFETY: every number in `pins` is claimed exactly once on this board.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    Ok(PinDriver::output(pin)?)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AlarmLink master v{}             ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: link pins are not claimed anywhere else.
    let (tx, rx) = unsafe {
        (
            AnyOutputPin::new(pins::LINK_TX_GPIO),
            AnyInputPin::new(pins::LINK_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &link_config(config.baud_rate),
    )?;

    let led = BlinkLed::new(
        output(pins::STATUS_LED_GPIO)?,
        Delay::new_default(),
        config.led_pulse_ms,
    );
    let mut link = TokenLink::new(EspUart::new(uart), led, PulseOn::Receive);

    let [d4, d5, d6, d7] = pins::LCD_DATA_GPIOS;
    let lcd = Hd44780::new(
        output(pins::LCD_RS_GPIO)?,
        output(pins::LCD_EN_GPIO)?,
        [output(d4)?, output(d5)?, output(d6)?, output(d7)?],
        Delay::new_default(),
        pins::LCD_COLS,
        pins::LCD_ROWS,
    )?;

    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(Hertz(pins::SIREN_PWM_FREQ_HZ)),
    )?;
    // SAFETY: siren PWM pin is not claimed anywhere else.
    let pwm_pin = unsafe { AnyOutputPin::new(pins::SIREN_PWM_GPIO) };
    let pwm = LedcDriver::new(peripherals.ledc.channel0, &timer, pwm_pin)?;
    let siren = SirenDriver::new(output(pins::SIREN_ENABLE_GPIO)?, pwm);

    let mut panel = MasterPanel::new(lcd, siren);
    panel.set_siren(false)?;
    panel.set_intensity(0)?;

    // ── 4. Controller ─────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut delay = Delay::new_default();
    let mut controller = AlarmController::new(config);

    controller.self_test(&mut panel, link.indicator_mut(), &mut delay, &mut sink)?;
    controller.start(&mut sink);

    let e = match controller.run(&mut link, &mut panel, &mut delay, &mut sink) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    error!("Controller stopped: {}", e);
    Err(e.into())
}
