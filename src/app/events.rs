//! Outbound application events.
//!
//! The [`ThermostatService`](super::service::ThermostatService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  The adapter on
//! the other side decides what to do with them — today they go to the
//! serial log.

use crate::error::{SensorError, StorageError};
use crate::fsm::Mode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The service has started.  `restored` says whether the setpoint
    /// came from a valid persistent record or from the default.
    Started {
        mode: Mode,
        setpoint: i8,
        restored: bool,
    },

    /// The FSM moved between modes.
    ModeChanged { from: Mode, to: Mode },

    /// The fan relay command changed.
    FanChanged(bool),

    /// A setpoint was persisted to flash.
    SetpointSaved(i8),

    /// A setpoint save failed; the in-memory value stands.
    SetpointSaveFailed(StorageError),

    /// The probe failed an acquisition; the last good reading is held.
    SensorFault(SensorError),

    /// The probe answered again after a fault.
    SensorRecovered,
}

/// A point-in-time snapshot of the process state, used for rendering and
/// test assertions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub mode: Mode,
    /// Latest good reading (°C); `None` before the probe first answers.
    pub current_temp: Option<f32>,
    pub set_temp: i8,
    pub fan_on: bool,
    pub sensor_fault: bool,
}
