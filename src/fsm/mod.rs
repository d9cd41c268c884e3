//! Function-pointer finite state machine engine for the alarm policy.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                        │
//! │  ┌──────────────────┬───────────┬────────────┬──────────────────┐  │
//! │  │ StateId          │ on_enter  │ on_iterate │ behaviour        │  │
//! │  ├──────────────────┼───────────┼────────────┼──────────────────┤  │
//! │  │ Armed            │ fn(ctx)   │ —          │ Listen(fn)       │  │
//! │  │ MovementDetected │ fn(ctx)   │ —          │ Listen(fn)       │  │
//! │  │ CorrectPassword  │ —         │ fn(ctx)    │ Advance(fn)      │  │
//! │  │ Disarmed         │ fn(ctx)   │ fn(ctx)    │ Listen(fn)       │  │
//! │  │ Alarm            │ fn(ctx)   │ —          │ Terminal         │  │
//! │  │ Fault            │ fn(ctx)   │ —          │ Terminal         │  │
//! │  └──────────────────┴───────────┴────────────┴──────────────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One controller iteration runs `on_iterate` for the **current** state
//! and then, depending on its behaviour, feeds it exactly one
//! [`Reception`] (`Listen`), lets it pick the next state unconditionally
//! (`Advance`), or stops (`Terminal`).  A returned state different from
//! the current one runs the next state's `on_enter`.  Terminal states
//! never leave: there is no transition out of them, forced or otherwise.
//!
//! The engine is pure.  Handlers only write [`AlarmContext`]; the
//! controller turns that into display, siren and link calls.

pub mod context;
pub mod states;

use context::AlarmContext;
use log::{info, warn};

use crate::protocol::Reception;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all master states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Armed = 0,
    MovementDetected = 1,
    CorrectPassword = 2,
    Disarmed = 3,
    Alarm = 4,
    /// Display-only; no transition leads here.
    Fault = 5,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 6;

    /// Convert a table index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Fault` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Armed,
            1 => Self::MovementDetected,
            2 => Self::CorrectPassword,
            3 => Self::Disarmed,
            4 => Self::Alarm,
            5 => Self::Fault,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Fault
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_iterate` actions.
pub type StateActionFn = fn(&mut AlarmContext);

/// Handler for one received token (or receive timeout).
/// Returns `Some(next)` to transition, `None` to stay.
pub type ReceptionFn = fn(&mut AlarmContext, &Reception) -> Option<StateId>;

/// Handler for states that move on without reading.
pub type AdvanceFn = fn(&mut AlarmContext) -> StateId;

/// What a state does after `on_iterate`.
#[derive(Clone, Copy)]
pub enum Behaviour {
    /// Block for one token, then decide.
    Listen(ReceptionFn),
    /// Decide without reading.
    Advance(AdvanceFn),
    /// Never leave; the controller hands over to the terminal output loop.
    Terminal,
}

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    /// Status line shown at the start of every iteration.
    pub banner: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_iterate: Option<StateActionFn>,
    pub behaviour: Behaviour,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and the active state.  The single mutable
/// [`AlarmContext`] is owned by the caller and threaded through every
/// handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Iterations completed since boot.
    iterations: u64,
    /// Iteration at which the current state was entered.
    state_entry_iteration: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            iterations: 0,
            state_entry_iteration: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first iteration.
    pub fn start(&mut self, ctx: &mut AlarmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Begin one iteration: bump counters and run `on_iterate`.
    pub fn begin_iteration(&mut self, ctx: &mut AlarmContext) {
        self.iterations += 1;
        ctx.iterations_in_state = self.iterations - self.state_entry_iteration;
        ctx.commands.dwell_ms = 0;
        if let Some(iterate) = self.table[self.current].on_iterate {
            iterate(ctx);
        }
    }

    /// Feed one reception to a `Listen` state.  Returns the resulting state.
    pub fn on_reception(&mut self, rx: &Reception, ctx: &mut AlarmContext) -> StateId {
        if let Behaviour::Listen(handler) = self.table[self.current].behaviour {
            if let Some(next) = handler(ctx, rx) {
                self.transition(next, ctx);
            }
        } else {
            warn!(
                "FSM: {} does not listen, reception dropped",
                self.table[self.current].name
            );
        }
        self.current_state()
    }

    /// Let an `Advance` state pick its successor.  Returns the resulting state.
    pub fn advance(&mut self, ctx: &mut AlarmContext) -> StateId {
        if let Behaviour::Advance(handler) = self.table[self.current].behaviour {
            let next = handler(ctx);
            self.transition(next, ctx);
        }
        self.current_state()
    }

    /// Force an immediate transition (tests, diagnostics).
    /// Refused while in a terminal state.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut AlarmContext) {
        if self.is_terminal() {
            warn!(
                "FSM: refusing to leave terminal state {}",
                self.table[self.current].name
            );
            return;
        }
        self.transition(next, ctx);
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// The current state's table row.
    pub fn descriptor(&self) -> &StateDescriptor {
        &self.table[self.current]
    }

    /// Whether the current state has no way out.
    pub fn is_terminal(&self) -> bool {
        matches!(self.table[self.current].behaviour, Behaviour::Terminal)
    }

    /// How many iterations the FSM has spent in the current state.
    pub fn iterations_in_current_state(&self) -> u64 {
        self.iterations - self.state_entry_iteration
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut AlarmContext) {
        let next_idx = next_id as usize;
        if next_idx == self.current || self.is_terminal() {
            return;
        }

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;
        self.state_entry_iteration = self.iterations;
        ctx.iterations_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
