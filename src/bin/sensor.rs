//! AlarmLink sensor node — entry point.
//!
//! Motion sensor, re-arm button and 3x3 keypad in; tokens out on UART1.

use anyhow::Result;
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::UartDriver;
use log::{error, info};

use alarmlink::adapters::log_sink::LogEventSink;
use alarmlink::adapters::uart::{EspUart, link_config};
use alarmlink::config::SystemConfig;
use alarmlink::drivers::keypad::MatrixKeypad;
use alarmlink::drivers::status_led::BlinkLed;
use alarmlink::pins;
use alarmlink::protocol::link::{PulseOn, TokenLink};
use alarmlink::sensor::SensorNode;

fn output(gpio: i32) -> Result<PinDriver<'static, AnyOutputPin, Output>> {
    // SAFETY: every number in `pins` is claimed exactly once on this board.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    Ok(PinDriver::output(pin)?)
}

fn input(gpio: i32, pull: Pull) -> Result<PinDriver<'static, AnyInputPin, Input>> {
    // SAFETY: as above.
    let pin = unsafe { AnyInputPin::new(gpio) };
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(pull)?;
    Ok(driver)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AlarmLink sensor v{}             ║", env!("CARGO_PKG_VERSION"));
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
    let mut link = TokenLink::new(EspUart::new(uart), led, PulseOn::Transmit);

    let [c0, c1, c2] = pins::KEYPAD_COL_GPIOS;
    let [r0, r1, r2] = pins::KEYPAD_ROW_GPIOS;
    let keypad = MatrixKeypad::new(
        [output(c0)?, output(c1)?, output(c2)?],
        [input(r0, Pull::Up)?, input(r1, Pull::Up)?, input(r2, Pull::Up)?],
        Delay::new_default(),
    )?;

    let motion = input(pins::MOTION_GPIO, Pull::Floating)?;
    let rearm = input(pins::REARM_BUTTON_GPIO, Pull::Floating)?;

    // ── 4. Sensor loop ────────────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut delay = Delay::new_default();
    let mut node = SensorNode::new(motion, rearm, keypad, config);

    node.self_test(link.indicator_mut(), &mut delay)?;

    let e = match node.run(&mut link, &mut delay, &mut sink) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    error!("Sensor loop stopped: {}", e);
    Err(e.into())
}
