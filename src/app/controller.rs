//! Master alarm controller — the hexagonal core of the master node.
//!
//! [`AlarmController`] owns the FSM and its shared context.  All I/O flows
//! through the token link and port traits injected at call sites, making
//! the whole controller testable with mock adapters.
//!
//! ```text
//!  TokenLink ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │    AlarmController     │
//!  Display ◀─────│  FSM · siren ramp      │
//!  Siren   ◀─────└────────────────────────┘
//! ```
//!
//! One [`step`](AlarmController::step) is one handler invocation: show the
//! state's banner, apply the siren command, pause if the state asks for
//! it, then read one token (listening states) or move on (CorrectPassword).
//! Alarm and Fault return [`Step::Terminal`] without touching the link.

use core::convert::Infallible;
use core::fmt::Write as _;

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::config::{MAX_TOKEN_LEN, SystemConfig};
use crate::drivers::siren::SirenRamp;
use crate::error::Result;
use crate::fsm::context::AlarmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Behaviour, Fsm, StateId};
use crate::protocol::link::TokenLink;
use crate::protocol::transport::{ActivityIndicator, SerialPort};
use crate::protocol::{Reception, Token};

use super::events::AppEvent;
use super::ports::{DisplayPort, EventSink, LampPort, SirenPort};

/// Greeting shown during the boot self-test.
pub const GREETING: &str = "Hello World!";

/// Outcome of one controller iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Dispatch continues with the next iteration.
    Continue,
    /// The FSM sits in a state with no way out.
    Terminal(StateId),
}

// ───────────────────────────────────────────────────────────────
// AlarmController
// ───────────────────────────────────────────────────────────────

pub struct AlarmController {
    fsm: Fsm,
    ctx: AlarmContext,
    ramp: SirenRamp,
    tokens_received: u32,
}

impl AlarmController {
    /// Construct the controller from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ramp = SirenRamp::new(config.siren_ramp_low, config.siren_ramp_high);
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Armed),
            ctx: AlarmContext::new(config),
            ramp,
            tokens_received: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Armed.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AlarmController started in {:?}", self.fsm.current_state());
    }

    /// Greeting, LED and siren on for `self_test_ms`, then everything off.
    pub fn self_test(
        &mut self,
        hw: &mut (impl DisplayPort + SirenPort),
        lamp: &mut impl LampPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let duration_ms = self.ctx.config.self_test_ms;
        hw.clear()?;
        hw.write_line(GREETING)?;
        lamp.set_lamp(true)?;
        hw.set_siren(true)?;
        hw.set_intensity(u8::MAX)?;
        delay.delay_ms(duration_ms);
        hw.set_intensity(0)?;
        hw.set_siren(false)?;
        lamp.set_lamp(false)?;
        hw.clear()?;
        sink.emit(&AppEvent::SelfTestDone { duration_ms });
        Ok(())
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one handler invocation.  See the module docs for the sequence.
    pub fn step<P, A>(
        &mut self,
        link: &mut TokenLink<P, A>,
        hw: &mut (impl DisplayPort + SirenPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<Step>
    where
        P: SerialPort,
        A: ActivityIndicator,
    {
        let prev = self.fsm.current_state();

        // 1. Per-iteration hook, then banner and siren
        self.fsm.begin_iteration(&mut self.ctx);
        hw.clear()?;
        hw.write_line(self.fsm.descriptor().banner)?;
        self.apply_siren(hw)?;
        if self.ctx.commands.dwell_ms > 0 {
            delay.delay_ms(self.ctx.commands.dwell_ms);
        }

        // 2. Behaviour
        let behaviour = self.fsm.descriptor().behaviour;
        match behaviour {
            Behaviour::Listen(_) => {
                let rx = link.receive(self.ctx.config.receive_timeout_ms)?;
                match &rx {
                    Reception::Token(t) => {
                        self.tokens_received = self.tokens_received.wrapping_add(1);
                        sink.emit(&AppEvent::TokenReceived {
                            state: prev,
                            len: t.len(),
                            truncated: t.is_truncated(),
                        });
                    }
                    Reception::Timeout => sink.emit(&AppEvent::ReceiveTimeout(prev)),
                }
                self.fsm.on_reception(&rx, &mut self.ctx);
                if let Some(token) = self.ctx.commands.echo.take() {
                    self.echo(&token, hw, delay)?;
                }
            }
            Behaviour::Advance(_) => {
                self.fsm.advance(&mut self.ctx);
            }
            Behaviour::Terminal => return Ok(Step::Terminal(prev)),
        }

        // 3. Report
        let next = self.fsm.current_state();
        if next != prev {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: next,
            });
            if next == StateId::Alarm {
                sink.emit(&AppEvent::AlarmLatched(self.ctx.alarm_reason));
            }
        }
        Ok(Step::Continue)
    }

    /// One siren ramp step: drive the current level, then wait one tick.
    pub fn alarm_tick(&mut self, hw: &mut impl SirenPort, delay: &mut impl DelayNs) -> Result<()> {
        if !hw.is_siren_on() {
            hw.set_siren(true)?;
        }
        hw.set_intensity(self.ramp.tick())?;
        delay.delay_ms(self.ctx.config.siren_tick_ms);
        Ok(())
    }

    /// Dispatch until a terminal state, then hold it forever.
    ///
    /// Alarm hands the processor to the siren ramp and never reads the
    /// link again.  Only errors return.
    pub fn run<P, A>(
        &mut self,
        link: &mut TokenLink<P, A>,
        hw: &mut (impl DisplayPort + SirenPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<Infallible>
    where
        P: SerialPort,
        A: ActivityIndicator,
    {
        let terminal = loop {
            match self.step(link, hw, delay, sink)? {
                Step::Continue => delay.delay_ms(self.ctx.config.loop_gap_ms),
                Step::Terminal(state) => break state,
            }
        };

        if terminal == StateId::Alarm {
            info!("AlarmController: siren ramp engaged");
            loop {
                self.alarm_tick(hw, delay)?;
            }
        }

        error!("AlarmController: halted in {:?}", terminal);
        loop {
            delay.delay_ms(self.ctx.config.loop_gap_ms);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Tokens read by listening states since boot.
    pub fn tokens_received(&self) -> u32 {
        self.tokens_received
    }

    pub fn context(&self) -> &AlarmContext {
        &self.ctx
    }

    /// The level the next [`alarm_tick`](Self::alarm_tick) will drive.
    pub fn ramp_level(&self) -> u8 {
        self.ramp.level()
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_siren(&mut self, hw: &mut impl SirenPort) -> Result<()> {
        let want = self.ctx.commands.siren_enabled;
        if hw.is_siren_on() != want {
            hw.set_siren(want)?;
            if !want {
                hw.set_intensity(0)?;
            }
        }
        Ok(())
    }

    /// Show the raw token for `echo_dwell_ms`.
    fn echo(
        &mut self,
        token: &Token,
        hw: &mut impl DisplayPort,
        delay: &mut impl DelayNs,
    ) -> Result<()> {
        let mut text: heapless::String<{ MAX_TOKEN_LEN * 4 }> = heapless::String::new();
        // Capacity covers the worst case of every byte escaped as `\xNN`.
        let _ = write!(text, "{token}");
        hw.clear()?;
        hw.write_line(&text)?;
        delay.delay_ms(self.ctx.config.echo_dwell_ms);
        Ok(())
    }
}
