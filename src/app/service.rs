//! Application service — the hexagonal core.
//!
//! [`ThermostatService`] owns the FSM and the shared context, and exposes
//! one entry point per scheduled task.  All I/O flows through port traits
//! injected at the call sites, making the whole service testable with
//! mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  buttons ─────▶ │    ThermostatService     │ ──▶ FanPort
//!                 │   FSM · hysteresis ctx   │ ──▶ DisplayPort
//!  SetpointPort ◀─┤                          │
//!                 └──────────────────────────┘
//! ```

use core::fmt::Write as _;

use heapless::String;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::drivers::button::Button;
use crate::error::SensorError;
use crate::fsm::context::ThermostatContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, Mode};

use super::events::{AppEvent, StatusSnapshot};
use super::ports::{DisplayPort, EventSink, FanPort, SetpointPort};

/// Character width of the LCD.
pub const DISPLAY_COLS: usize = 16;

/// One fixed-width display line.
pub type DisplayLine = String<DISPLAY_COLS>;

// ───────────────────────────────────────────────────────────────
// ThermostatService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct ThermostatService {
    fsm: Fsm,
    ctx: ThermostatContext,
    /// Whether the boot-time setpoint came from a valid record.
    setpoint_restored: bool,
}

impl ThermostatService {
    /// Construct the service.  `initial_setpoint` is what the store's
    /// `init()` reported — loaded or default — with `restored` saying
    /// which.  Does **not** start the FSM; call [`start`](Self::start).
    pub fn new(config: SystemConfig, initial_setpoint: i8, restored: bool) -> Self {
        let ctx = ThermostatContext::new(config, initial_setpoint);
        let fsm = Fsm::new(build_state_table(), Mode::Off);
        Self {
            fsm,
            ctx,
            setpoint_restored: restored,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Off mode.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            mode: self.fsm.current_state(),
            setpoint: self.ctx.set_temp,
            restored: self.setpoint_restored,
        });
        info!(
            "service started: mode {:?}, setpoint {} C ({})",
            self.fsm.current_state(),
            self.ctx.set_temp,
            if self.setpoint_restored {
                "restored"
            } else {
                "default"
            }
        );
    }

    // ── Input task path ───────────────────────────────────────

    /// Dispatch one confirmed button press into the state machine.
    ///
    /// Runs the FSM immediately (presses must not wait for the next
    /// control tick) and persists any setpoint change — one full
    /// erase+program cycle per effective keystroke.
    pub fn handle_button(
        &mut self,
        button: Button,
        store: &mut impl SetpointPort,
        sink: &mut impl EventSink,
    ) {
        let prev = self.fsm.current_state();
        self.ctx.pending_button = Some(button);
        self.fsm.tick(&mut self.ctx);
        self.emit_mode_change(prev, sink);

        if let Some(setpoint) = self.ctx.take_save_request() {
            match store.save(setpoint) {
                Ok(()) => {
                    info!("setpoint {setpoint} C persisted");
                    sink.emit(&AppEvent::SetpointSaved(setpoint));
                }
                Err(e) => {
                    // The in-memory value stands — the display must track
                    // what the user dialed in, persisted or not.
                    warn!("setpoint save failed: {e}");
                    sink.emit(&AppEvent::SetpointSaveFailed(e));
                }
            }
        }
    }

    // ── Control task path ─────────────────────────────────────

    /// Run one hysteresis evaluation and push the fan command out.
    pub fn control_tick(&mut self, fan: &mut impl FanPort, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        let prev_fan = self.ctx.fan_on;
        self.fsm.tick(&mut self.ctx);
        self.emit_mode_change(prev, sink);

        fan.set_fan(self.ctx.fan_on);
        if self.ctx.fan_on != prev_fan {
            sink.emit(&AppEvent::FanChanged(self.ctx.fan_on));
        }
    }

    // ── Sensor task path ──────────────────────────────────────

    /// Fold one acquisition result into the context.
    ///
    /// A fault holds the last good reading and flags the condition once
    /// per fault edge; the next good reading clears it.
    pub fn update_temperature(
        &mut self,
        reading: Result<f32, SensorError>,
        sink: &mut impl EventSink,
    ) {
        match reading {
            Ok(celsius) => {
                if self.ctx.sensor_fault {
                    info!("sensor recovered: {celsius:.2} C");
                    sink.emit(&AppEvent::SensorRecovered);
                }
                self.ctx.sensor_fault = false;
                self.ctx.current_temp = Some(celsius);
            }
            Err(e) => {
                if !self.ctx.sensor_fault {
                    warn!("sensor fault: {e}; holding last reading");
                    sink.emit(&AppEvent::SensorFault(e));
                }
                self.ctx.sensor_fault = true;
            }
        }
    }

    // ── Display task path ─────────────────────────────────────

    /// Render both lines and push them to the display.
    pub fn render(&self, display: &mut impl DisplayPort) {
        let (line0, line1) = format_lines(&self.status());
        display.set_cursor(0, 0);
        display.write_text(&line0);
        display.set_cursor(1, 0);
        display.write_text(&line1);
    }

    // ── Introspection ─────────────────────────────────────────

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            mode: self.fsm.current_state(),
            current_temp: self.ctx.current_temp,
            set_temp: self.ctx.set_temp,
            fan_on: self.ctx.fan_on,
            sensor_fault: self.ctx.sensor_fault,
        }
    }

    pub fn mode(&self) -> Mode {
        self.fsm.current_state()
    }

    pub fn setpoint(&self) -> i8 {
        self.ctx.set_temp
    }

    pub fn fan_on(&self) -> bool {
        self.ctx.fan_on
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn emit_mode_change(&self, prev: Mode, sink: &mut impl EventSink) {
        let current = self.fsm.current_state();
        if current != prev {
            sink.emit(&AppEvent::ModeChanged {
                from: prev,
                to: current,
            });
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display formatting
// ───────────────────────────────────────────────────────────────

/// Format the two 16-column display lines, space-padded so a shorter
/// frame fully overwrites the previous one.
pub fn format_lines(status: &StatusSnapshot) -> (DisplayLine, DisplayLine) {
    let mut line0 = DisplayLine::new();
    match status.current_temp {
        Some(temp) => {
            let _ = write!(line0, "T:{temp:.2} C S:{}", status.set_temp);
        }
        None => {
            let _ = write!(line0, "T:--.-- C S:{}", status.set_temp);
        }
    }
    pad_line(&mut line0);

    let mut line1 = DisplayLine::new();
    let fan = if status.fan_on { "ON" } else { "OFF" };
    let _ = write!(line1, "M:{} F:{}", status.mode.label(), fan);
    pad_line(&mut line1);

    (line0, line1)
}

fn pad_line(line: &mut DisplayLine) {
    while line.len() < DISPLAY_COLS {
        let _ = line.push(' ');
    }
}
