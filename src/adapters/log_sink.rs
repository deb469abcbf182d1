//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  Any other transport would
//! implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                mode,
                setpoint,
                restored,
            } => {
                info!(
                    "START | mode={mode:?} setpoint={setpoint}C source={}",
                    if *restored { "flash" } else { "default" }
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {from:?} -> {to:?}");
            }
            AppEvent::FanChanged(on) => {
                info!("FAN   | {}", if *on { "on" } else { "off" });
            }
            AppEvent::SetpointSaved(setpoint) => {
                info!("STORE | setpoint {setpoint}C saved");
            }
            AppEvent::SetpointSaveFailed(e) => {
                warn!("STORE | save failed: {e}");
            }
            AppEvent::SensorFault(e) => {
                warn!("PROBE | fault: {e}");
            }
            AppEvent::SensorRecovered => {
                info!("PROBE | recovered");
            }
        }
    }
}
