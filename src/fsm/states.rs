//! Concrete state handler functions and table builder.
//!
//! Each state is a handful of plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  ARMED ──["movement"]──▶ MOVEMENT_DETECTED
//!    ▲                        │          │
//!    │                 [passcode]   [anything else,
//!    │                        ▼      "timeout", rx timeout]
//!    │               CORRECT_PASSWORD    ▼
//!    │                        │        ALARM (latched)
//!    │                   [always]
//!    │                        ▼
//!    └─────["rearm"]──── DISARMED
//!
//!  FAULT: display only, nothing transitions here.
//! ```

use super::context::{AlarmContext, AlarmReason};
use super::{Behaviour, StateDescriptor, StateId};
use crate::protocol::{MOVEMENT, REARM, Reception, TIMEOUT};
use log::{debug, error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Armed
        StateDescriptor {
            id: StateId::Armed,
            name: "Armed",
            banner: "System online",
            on_enter: Some(armed_enter),
            on_iterate: None,
            behaviour: Behaviour::Listen(armed_on_reception),
        },
        // Index 1 — MovementDetected
        StateDescriptor {
            id: StateId::MovementDetected,
            name: "MovementDetected",
            banner: "Movement detected",
            on_enter: Some(movement_enter),
            on_iterate: None,
            behaviour: Behaviour::Listen(movement_on_reception),
        },
        // Index 2 — CorrectPassword
        StateDescriptor {
            id: StateId::CorrectPassword,
            name: "CorrectPassword",
            banner: "Correct password!",
            on_enter: None,
            on_iterate: Some(correct_iterate),
            behaviour: Behaviour::Advance(correct_advance),
        },
        // Index 3 — Disarmed
        StateDescriptor {
            id: StateId::Disarmed,
            name: "Disarmed",
            banner: "System disarmed",
            on_enter: Some(disarmed_enter),
            on_iterate: Some(disarmed_iterate),
            behaviour: Behaviour::Listen(disarmed_on_reception),
        },
        // Index 4 — Alarm
        StateDescriptor {
            id: StateId::Alarm,
            name: "Alarm",
            banner: "ALARM",
            on_enter: Some(alarm_enter),
            on_iterate: None,
            behaviour: Behaviour::Terminal,
        },
        // Index 5 — Fault
        StateDescriptor {
            id: StateId::Fault,
            name: "Fault",
            banner: "FAULT",
            on_enter: Some(fault_enter),
            on_iterate: None,
            behaviour: Behaviour::Terminal,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED state
// ═══════════════════════════════════════════════════════════════════════════

fn armed_enter(_ctx: &mut AlarmContext) {
    info!("ARMED: waiting for movement");
}

fn armed_on_reception(_ctx: &mut AlarmContext, rx: &Reception) -> Option<StateId> {
    match rx {
        Reception::Token(t) if t.contains(MOVEMENT) => Some(StateId::MovementDetected),
        Reception::Token(t) => {
            debug!("ARMED: ignoring {}", t);
            None
        }
        Reception::Timeout => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MOVEMENT_DETECTED state — exactly one token decides
// ═══════════════════════════════════════════════════════════════════════════

fn movement_enter(_ctx: &mut AlarmContext) {
    info!("MOVEMENT: awaiting passcode");
}

fn movement_on_reception(ctx: &mut AlarmContext, rx: &Reception) -> Option<StateId> {
    let Reception::Token(token) = rx else {
        warn!("MOVEMENT: no passcode before receive timeout");
        ctx.latch_alarm(AlarmReason::ReceiveTimeout);
        return Some(StateId::Alarm);
    };

    ctx.commands.echo = Some(token.clone());

    // Passcode is checked before "timeout" so a line carrying both disarms.
    if ctx.config.passcode_matches(token.as_bytes()) {
        return Some(StateId::CorrectPassword);
    }

    if token.contains(TIMEOUT) {
        warn!("MOVEMENT: keypad timed out");
        ctx.latch_alarm(AlarmReason::KeypadTimeout);
    } else {
        warn!("MOVEMENT: passcode rejected");
        ctx.latch_alarm(AlarmReason::WrongPasscode);
    }
    Some(StateId::Alarm)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CORRECT_PASSWORD state — acknowledge, then disarm
// ═══════════════════════════════════════════════════════════════════════════

fn correct_iterate(ctx: &mut AlarmContext) {
    ctx.commands.dwell_ms = ctx.config.correct_dwell_ms;
}

fn correct_advance(_ctx: &mut AlarmContext) -> StateId {
    StateId::Disarmed
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED state
// ═══════════════════════════════════════════════════════════════════════════

fn disarmed_enter(ctx: &mut AlarmContext) {
    ctx.disarm_count = ctx.disarm_count.wrapping_add(1);
    info!("DISARMED: disarm #{}", ctx.disarm_count);
}

fn disarmed_iterate(ctx: &mut AlarmContext) {
    ctx.commands.siren_enabled = false;
    ctx.commands.dwell_ms = ctx.config.disarmed_dwell_ms;
}

fn disarmed_on_reception(_ctx: &mut AlarmContext, rx: &Reception) -> Option<StateId> {
    match rx {
        // Movement wins over rearm when a line carries both.
        Reception::Token(t) if t.contains(MOVEMENT) || t.contains(TIMEOUT) => None,
        Reception::Token(t) if t.contains(REARM) => Some(StateId::Armed),
        Reception::Token(t) => {
            debug!("DISARMED: ignoring {}", t);
            None
        }
        Reception::Timeout => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALARM state — latched until power cycle
// ═══════════════════════════════════════════════════════════════════════════

fn alarm_enter(ctx: &mut AlarmContext) {
    ctx.commands.siren_enabled = true;
    let reason = ctx.alarm_reason.map_or("unknown", |r| r.as_str());
    error!("ALARM: latched ({}), siren on", reason);
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAULT state
// ═══════════════════════════════════════════════════════════════════════════

fn fault_enter(_ctx: &mut AlarmContext) {
    error!("FAULT: halted");
}
