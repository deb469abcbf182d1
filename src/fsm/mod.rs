//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern: a fixed table of state descriptors, each
//! row carrying plain `fn` pointers — no closures, no dynamic dispatch,
//! no heap.
//!
//! ```text
//!          POWER                SET
//!   OFF ◀───────▶ NORMAL ◀───────▶ SETTING
//!                                    │
//!                             UP/DOWN: setpoint ±1,
//!                             persist each change
//! ```
//!
//! Off and Setting never transition to each other directly, and POWER
//! while in Setting is a deliberate no-op.  Each tick the engine calls
//! `on_update` for the current state; `Some(next)` runs `on_exit` →
//! `on_enter` and moves the current pointer.

pub mod context;
pub mod states;

use context::ThermostatContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Operating modes of the thermostat.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Off = 0,
    Normal = 1,
    Setting = 2,
}

impl Mode {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert a table index back to `Mode`.  Panics on out-of-range in
    /// debug builds; returns `Off` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Normal,
            2 => Self::Setting,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Off
            }
        }
    }

    /// Fixed-width label as shown on the display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Setting => "SETTING",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut ThermostatContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut ThermostatContext) -> Option<Mode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: Mode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table and tick bookkeeping; the mutable
/// [`ThermostatContext`] is threaded through every handler call.
pub struct Fsm {
    table: [StateDescriptor; Mode::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; Mode::COUNT], initial: Mode) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut ThermostatContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    pub fn tick(&mut self, ctx: &mut ThermostatContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> Mode {
        Mode::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: Mode, ctx: &mut ThermostatContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::context::ThermostatContext;
    use super::*;
    use crate::config::SystemConfig;
    use crate::drivers::button::Button;
    use proptest::prelude::*;

    fn arb_button() -> impl Strategy<Value = Option<Button>> {
        prop_oneof![
            Just(None),
            Just(Some(Button::Up)),
            Just(Some(Button::Down)),
            Just(Some(Button::Set)),
            Just(Some(Button::Power)),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_arbitrary_input(
            steps in proptest::collection::vec((arb_button(), -20.0f32..80.0), 1..200)
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), Mode::Off);
            let mut ctx = ThermostatContext::new(SystemConfig::default(), 28);
            fsm.start(&mut ctx);

            for (button, temp) in steps {
                ctx.pending_button = button;
                ctx.current_temp = Some(temp);
                fsm.tick(&mut ctx);
                let _ = ctx.take_save_request();

                prop_assert!((10..=50).contains(&ctx.set_temp),
                    "setpoint escaped range: {}", ctx.set_temp);
                if fsm.current_state() == Mode::Off {
                    prop_assert!(!ctx.fan_on, "fan on while Off");
                }
            }
        }

        #[test]
        fn off_and_setting_never_adjacent(
            buttons in proptest::collection::vec(arb_button(), 1..100)
        ) {
            let mut fsm = Fsm::new(states::build_state_table(), Mode::Off);
            let mut ctx = ThermostatContext::new(SystemConfig::default(), 28);
            fsm.start(&mut ctx);

            let mut prev = fsm.current_state();
            for button in buttons {
                ctx.pending_button = button;
                fsm.tick(&mut ctx);
                let _ = ctx.take_save_request();
                let cur = fsm.current_state();
                let direct = (prev == Mode::Off && cur == Mode::Setting)
                    || (prev == Mode::Setting && cur == Mode::Off);
                prop_assert!(!direct, "direct {:?} -> {:?} transition", prev, cur);
                prev = cur;
            }
        }
    }
}
