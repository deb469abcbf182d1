//! Shared mutable context threaded through every FSM handler.
//!
//! `ThermostatContext` is the single struct that state handlers read from
//! and write to: the latest temperature, the user setpoint, the fan flag,
//! pending input, and the outgoing setpoint-save request.  It is owned by
//! the service and passed by reference — there is no global state.

use crate::config::SystemConfig;
use crate::drivers::button::Button;

/// The shared context passed to every state handler function.
pub struct ThermostatContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Process state --
    /// Latest good temperature reading (°C).  `None` until the probe has
    /// answered once; held at the last good value across sensor faults.
    pub current_temp: Option<f32>,
    /// User setpoint (°C), always within the configured range.
    pub set_temp: i8,
    /// Fan relay command.  Forced off whenever the mode is Off.
    pub fan_on: bool,
    /// The probe failed its most recent acquisition.
    pub sensor_fault: bool,

    // -- Handler I/O --
    /// Debounced press waiting to be consumed by the current state.
    pub pending_button: Option<Button>,
    /// Setpoint the store should persist, set by the Setting handlers.
    pub save_request: Option<i8>,

    // -- Configuration --
    pub config: SystemConfig,
}

impl ThermostatContext {
    pub fn new(config: SystemConfig, initial_setpoint: i8) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            current_temp: None,
            set_temp: initial_setpoint,
            fan_on: false,
            sensor_fault: false,
            pending_button: None,
            save_request: None,
            config,
        }
    }

    /// Consume the pending press, if any.
    pub fn take_button(&mut self) -> Option<Button> {
        self.pending_button.take()
    }

    /// Consume the pending setpoint-save request, if any.
    pub fn take_save_request(&mut self) -> Option<i8> {
        self.save_request.take()
    }
}
