//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.  Handlers consume at most one debounced press per
//! tick from the context and communicate outward through it: the fan flag
//! for the control path, the save request for the setpoint store.

use super::context::ThermostatContext;
use super::{Mode, StateDescriptor};
use crate::drivers::button::Button;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    [
        // Index 0 — Off
        StateDescriptor {
            id: Mode::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
            on_update: off_update,
        },
        // Index 1 — Normal
        StateDescriptor {
            id: Mode::Normal,
            name: "Normal",
            on_enter: None,
            on_exit: None,
            on_update: normal_update,
        },
        // Index 2 — Setting
        StateDescriptor {
            id: Mode::Setting,
            name: "Setting",
            on_enter: Some(setting_enter),
            on_exit: Some(setting_exit),
            on_update: setting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF state — fan forced off, only POWER does anything
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut ThermostatContext) {
    ctx.fan_on = false;
    info!("OFF: fan disabled, waiting for power button");
}

fn off_update(ctx: &mut ThermostatContext) -> Option<Mode> {
    // The override beats any state the hysteresis left behind.
    ctx.fan_on = false;

    match ctx.take_button() {
        Some(Button::Power) => Some(Mode::Normal),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL state — hysteresis fan control
// ═══════════════════════════════════════════════════════════════════════════

fn normal_update(ctx: &mut ThermostatContext) -> Option<Mode> {
    match ctx.take_button() {
        Some(Button::Power) => return Some(Mode::Off),
        Some(Button::Set) => return Some(Mode::Setting),
        // UP/DOWN only mean something while in Setting.
        Some(Button::Up | Button::Down) => return None,
        None => {}
    }

    // Two thresholds: on at the setpoint, off one dead band below it.
    // Between the two the fan holds its state.  No decision is made until
    // the probe has produced at least one good reading.
    if let Some(temp) = ctx.current_temp {
        let setpoint = f32::from(ctx.set_temp);
        if !ctx.fan_on && temp >= setpoint {
            ctx.fan_on = true;
            info!("NORMAL: {temp:.2} C >= {setpoint:.0} C, fan on");
        } else if ctx.fan_on && temp <= setpoint - ctx.config.hysteresis_c {
            ctx.fan_on = false;
            info!("NORMAL: {temp:.2} C below dead band, fan off");
        }
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETTING state — UP/DOWN edit the setpoint, every change is persisted
// ═══════════════════════════════════════════════════════════════════════════

fn setting_enter(ctx: &mut ThermostatContext) {
    info!("SETTING: editing setpoint, currently {} C", ctx.set_temp);
}

fn setting_exit(ctx: &mut ThermostatContext) {
    info!("SETTING: done, setpoint {} C", ctx.set_temp);
}

fn setting_update(ctx: &mut ThermostatContext) -> Option<Mode> {
    match ctx.take_button() {
        Some(Button::Set) => return Some(Mode::Normal),
        Some(Button::Up) => {
            if ctx.set_temp < ctx.config.setpoint_max_c {
                ctx.set_temp += 1;
                // One erase+program cycle per keystroke; presses that hit
                // the clamp don't touch the media.
                ctx.save_request = Some(ctx.set_temp);
            }
        }
        Some(Button::Down) => {
            if ctx.set_temp > ctx.config.setpoint_min_c {
                ctx.set_temp -= 1;
                ctx.save_request = Some(ctx.set_temp);
            }
        }
        // POWER has no defined transition out of Setting.
        Some(Button::Power) | None => {}
    }

    None
}
