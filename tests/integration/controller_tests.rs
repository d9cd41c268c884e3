//! Integration tests for the TokenLink → AlarmController → panel pipeline.
//!
//! These run on the host and drive the master through scripted serial
//! input, asserting on states, display lines, siren calls and events.

use super::mock_hw::{CountingIndicator, FakeClock, MockLamp, MockPanel, PanelCall, RecordingSink, ScriptedSerial};

use alarmlink::app::controller::{AlarmController, GREETING, Step};
use alarmlink::app::events::AppEvent;
use alarmlink::config::{MAX_TOKEN_LEN, PasscodeMatch, SystemConfig};
use alarmlink::error::{Error, LinkError, OutputError};
use alarmlink::fsm::StateId;
use alarmlink::fsm::context::AlarmReason;
use alarmlink::protocol::link::{PulseOn, TokenLink};

struct Rig {
    ctl: AlarmController,
    link: TokenLink<ScriptedSerial, CountingIndicator>,
    panel: MockPanel,
    clock: FakeClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: SystemConfig, serial: ScriptedSerial) -> Self {
        let mut ctl = AlarmController::new(config);
        let mut sink = RecordingSink::new();
        ctl.start(&mut sink);
        Self {
            ctl,
            link: TokenLink::new(serial, CountingIndicator::default(), PulseOn::Receive),
            panel: MockPanel::new(),
            clock: FakeClock::default(),
            sink,
        }
    }

    fn with_lines(lines: &[&str]) -> Self {
        Self::new(SystemConfig::default(), ScriptedSerial::lines(lines))
    }

    fn step(&mut self) -> Step {
        self.ctl
            .step(&mut self.link, &mut self.panel, &mut self.clock, &mut self.sink)
            .unwrap()
    }

    fn state(&self) -> StateId {
        self.ctl.state()
    }
}

// ── Armed ─────────────────────────────────────────────────────

#[test]
fn armed_ignores_every_token_without_movement() {
    let mut rig = Rig::with_lines(&["rearm", "timeout", "1245", "no input", "move ment", "garbage"]);
    for _ in 0..6 {
        assert_eq!(rig.step(), Step::Continue);
        assert_eq!(rig.state(), StateId::Armed);
    }
    assert_eq!(rig.ctl.tokens_received(), 6);
    assert!(rig.sink.transitions().is_empty());
}

#[test]
fn movement_embedded_in_noise_still_triggers() {
    let mut rig = Rig::with_lines(&["xxmovementyy"]);
    rig.step();
    assert_eq!(rig.state(), StateId::MovementDetected);
}

#[test]
fn every_iteration_starts_with_a_cleared_banner() {
    let mut rig = Rig::with_lines(&["noise", "noise"]);
    rig.step();
    rig.step();
    assert_eq!(
        &rig.panel.calls[..4],
        &[
            PanelCall::Clear,
            PanelCall::Line("System online".into()),
            PanelCall::Clear,
            PanelCall::Line("System online".into()),
        ]
    );
}

// ── MovementDetected ──────────────────────────────────────────

#[test]
fn embedded_passcode_is_accepted() {
    let mut rig = Rig::with_lines(&["movement", "x1245y"]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::CorrectPassword);
}

#[test]
fn passcode_wins_over_timeout_literal() {
    let mut rig = Rig::with_lines(&["movement", "timeout1245"]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::CorrectPassword);
}

#[test]
fn keypad_timeout_token_latches_alarm() {
    let mut rig = Rig::with_lines(&["movement", "timeout"]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
    assert!(rig.sink.events.contains(&AppEvent::AlarmLatched(Some(AlarmReason::KeypadTimeout))));
}

#[test]
fn no_input_token_fails_closed() {
    let mut rig = Rig::with_lines(&["movement", "no input"]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
    assert_eq!(rig.ctl.context().alarm_reason, Some(AlarmReason::WrongPasscode));
}

#[test]
fn raw_token_is_echoed_for_the_dwell_time() {
    let mut rig = Rig::with_lines(&["movement", "0000"]);
    rig.step();
    rig.step();
    assert_eq!(rig.panel.lines(), ["System online", "Movement detected", "0000"]);
    assert_eq!(rig.clock.elapsed_ms(), 3000);
}

#[test]
fn exact_mode_rejects_embedded_passcode() {
    let config = SystemConfig {
        passcode_match: PasscodeMatch::Exact,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config, ScriptedSerial::lines(&["movement", "x1245y"]));
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
}

#[test]
fn overlong_token_is_truncated_and_still_evaluated() {
    let long = format!("1245{}", "x".repeat(150));
    let mut rig = Rig::with_lines(&["movement", &long]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::CorrectPassword);
    assert!(rig.sink.events.contains(&AppEvent::TokenReceived {
        state: StateId::MovementDetected,
        len: MAX_TOKEN_LEN,
        truncated: true,
    }));
}

#[test]
fn passcode_past_the_receive_bound_is_lost() {
    let long = format!("{}1245", "x".repeat(MAX_TOKEN_LEN));
    let mut rig = Rig::with_lines(&["movement", &long]);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
}

// ── Receive timeout ───────────────────────────────────────────

fn timed(ms: u32) -> SystemConfig {
    SystemConfig {
        receive_timeout_ms: Some(ms),
        ..SystemConfig::default()
    }
}

#[test]
fn receive_timeout_in_armed_keeps_waiting() {
    let mut serial = ScriptedSerial::new();
    serial.push_timeout();
    serial.push_line("movement");
    let mut rig = Rig::new(timed(50), serial);
    rig.step();
    assert_eq!(rig.state(), StateId::Armed);
    assert!(rig.sink.events.contains(&AppEvent::ReceiveTimeout(StateId::Armed)));
    rig.step();
    assert_eq!(rig.state(), StateId::MovementDetected);
}

#[test]
fn receive_timeout_in_movement_detected_alarms() {
    let mut serial = ScriptedSerial::lines(&["movement"]);
    serial.push_timeout();
    let mut rig = Rig::new(timed(50), serial);
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);
    assert_eq!(rig.ctl.context().alarm_reason, Some(AlarmReason::ReceiveTimeout));
    assert!(rig.sink.events.contains(&AppEvent::ReceiveTimeout(StateId::MovementDetected)));
}

#[test]
fn partial_line_is_dropped_on_timeout() {
    let mut serial = ScriptedSerial::new();
    serial.push_bytes(b"move");
    serial.push_timeout();
    serial.push_bytes(b"ment\n");
    serial.push_line("movement");
    let mut rig = Rig::new(timed(50), serial);
    rig.step();
    assert_eq!(rig.state(), StateId::Armed);
    // "ment" alone is noise
    rig.step();
    assert_eq!(rig.state(), StateId::Armed);
    rig.step();
    assert_eq!(rig.state(), StateId::MovementDetected);
}

// ── CorrectPassword / Disarmed ────────────────────────────────

#[test]
fn correct_password_advances_without_reading() {
    let mut rig = Rig::with_lines(&["movement", "1245", "0000"]);
    rig.step();
    rig.step();
    let before = rig.link.received();
    rig.step();
    assert_eq!(rig.state(), StateId::Disarmed);
    assert_eq!(rig.link.received(), before);
}

#[test]
fn disarmed_ignores_movement_and_timeout_until_rearm() {
    let mut rig = Rig::with_lines(&["movement", "1245", "movement", "timeout", "movement rearm", "junk", "rearm"]);
    rig.step();
    rig.step();
    rig.step();
    assert_eq!(rig.state(), StateId::Disarmed);
    for _ in 0..4 {
        rig.step();
        assert_eq!(rig.state(), StateId::Disarmed);
    }
    rig.step();
    assert_eq!(rig.state(), StateId::Armed);
}

// ── End-to-end scenarios ──────────────────────────────────────

#[test]
fn wrong_passcode_latches_alarm_and_rearm_is_ignored() {
    let mut rig = Rig::with_lines(&["movement", "0000", "rearm"]);
    rig.step();
    assert_eq!(rig.state(), StateId::MovementDetected);
    rig.step();
    assert_eq!(rig.state(), StateId::Alarm);

    assert_eq!(rig.step(), Step::Terminal(StateId::Alarm));
    assert_eq!(rig.step(), Step::Terminal(StateId::Alarm));
    assert_eq!(rig.state(), StateId::Alarm);
    assert_eq!(rig.link.received(), 2, "rearm must never be read");
    assert!(rig.panel.siren_on());
    assert_eq!(rig.panel.last_line(), Some("ALARM"));
}

#[test]
fn full_disarm_and_rearm_cycle() {
    let mut rig = Rig::with_lines(&["movement", "my1245pass", "rearm"]);
    for _ in 0..4 {
        assert_eq!(rig.step(), Step::Continue);
    }
    assert_eq!(rig.state(), StateId::Armed);
    assert_eq!(
        rig.sink.transitions(),
        [
            (StateId::Armed, StateId::MovementDetected),
            (StateId::MovementDetected, StateId::CorrectPassword),
            (StateId::CorrectPassword, StateId::Disarmed),
            (StateId::Disarmed, StateId::Armed),
        ]
    );
    assert_eq!(
        rig.panel.lines(),
        [
            "System online",
            "Movement detected",
            "my1245pass",
            "Correct password!",
            "System disarmed",
        ]
    );
    // echo 3000 + correct 1000 + disarmed 1000
    assert_eq!(rig.clock.elapsed_ms(), 5000);
    assert!(!rig.panel.siren_on());
}

// ── run() ─────────────────────────────────────────────────────

#[test]
fn run_hands_over_to_the_siren_ramp() {
    let mut rig = Rig::with_lines(&["movement", "0000", "rearm", "movement"]);
    rig.panel = MockPanel::failing_intensity_at(401);
    let err = rig
        .ctl
        .run(&mut rig.link, &mut rig.panel, &mut rig.clock, &mut rig.sink)
        .unwrap_err();
    assert_eq!(err, Error::Output(OutputError::PwmWriteFailed));
    assert_eq!(rig.state(), StateId::Alarm);
    assert_eq!(rig.link.received(), 2);

    let levels = rig.panel.intensities();
    assert_eq!(levels.len(), 400);
    assert_eq!(levels[0], 100);
    assert_eq!(levels[155], 255);
    assert_eq!(levels[156], 254);
    assert_eq!(levels[310], 100);
    assert_eq!(levels[311], 101);
    assert!(levels.iter().all(|&l| (100..=255).contains(&l)));
    assert!(levels.windows(2).all(|w| w[0].abs_diff(w[1]) == 1));
}

#[test]
fn run_surfaces_a_closed_link() {
    let mut rig = Rig::with_lines(&["movement"]);
    let err = rig
        .ctl
        .run(&mut rig.link, &mut rig.panel, &mut rig.clock, &mut rig.sink)
        .unwrap_err();
    assert_eq!(err, Error::Link(LinkError::Closed));
    assert_eq!(rig.state(), StateId::MovementDetected);
}

#[test]
fn run_waits_the_loop_gap_between_iterations() {
    let mut rig = Rig::with_lines(&["noise", "noise"]);
    let _ = rig.ctl.run(&mut rig.link, &mut rig.panel, &mut rig.clock, &mut rig.sink);
    assert_eq!(rig.clock.elapsed_ms(), 200);
}

// ── Self-test ─────────────────────────────────────────────────

#[test]
fn self_test_greets_and_restores_outputs() {
    let mut rig = Rig::with_lines(&[]);
    let mut lamp = MockLamp::default();
    rig.ctl
        .self_test(&mut rig.panel, &mut lamp, &mut rig.clock, &mut rig.sink)
        .unwrap();
    assert_eq!(
        rig.panel.calls,
        [
            PanelCall::Clear,
            PanelCall::Line(GREETING.into()),
            PanelCall::Siren(true),
            PanelCall::Intensity(255),
            PanelCall::Intensity(0),
            PanelCall::Siren(false),
            PanelCall::Clear,
        ]
    );
    assert_eq!(lamp.levels, [true, false]);
    assert_eq!(rig.clock.elapsed_ms(), 2000);
}

#[test]
fn receive_pulses_activity_led_per_byte() {
    let mut rig = Rig::with_lines(&["rearm"]);
    rig.step();
    assert_eq!(rig.link.indicator_mut().pulses, 6);
}
