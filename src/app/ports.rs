//! Port traits — the hexagonal boundary between domain logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ThermostatService (domain)
//! ```
//!
//! Driven adapters (probe, fan relay, buttons, LCD, flash store) implement
//! these traits.  The service consumes them via generics, so the domain
//! core never touches hardware directly and every flow runs against mocks
//! on the host.

use crate::drivers::button::BUTTON_COUNT;
use crate::error::{SensorError, StorageError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to acquire a temperature.
///
/// One call is one full probe transaction and may block for the whole
/// conversion wait.  A missing probe must come back as
/// [`SensorError::NoDevice`], never as a stale or zero reading.
pub trait SensorPort {
    fn read_temperature(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the fan relay.
pub trait FanPort {
    /// Drive the relay.  Idempotent — called every control tick.
    fn set_fan(&mut self, on: bool);

    /// Last commanded relay state.
    fn is_fan_on(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Button input port
// ───────────────────────────────────────────────────────────────

/// Raw (undebounced) button levels, `true` = pressed, in
/// [`Button`](crate::drivers::button::Button) index order.
pub trait ButtonInputPort {
    fn read_raw(&mut self) -> [bool; BUTTON_COUNT];
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// Opaque text sink: cursor positioning plus fixed-width writes.
/// The domain always writes full 16-column lines so stale characters
/// are overwritten rather than cleared.
pub trait DisplayPort {
    fn set_cursor(&mut self, row: u8, col: u8);
    fn write_text(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Setpoint persistence port
// ───────────────────────────────────────────────────────────────

/// Persistent single-slot setpoint storage.
///
/// Implementations MUST validate the range before touching media and
/// MUST re-validate on every load — a caller can never be handed a
/// value from a corrupt record.
pub trait SetpointPort {
    fn save(&mut self, setpoint: i8) -> Result<(), StorageError>;
    fn load(&mut self) -> Result<i8, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// anything else implements the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples the scheduler from the application)
// ───────────────────────────────────────────────────────────────

/// Identity of a scheduled task, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Button sampling + debounce (50 ms).
    Input,
    /// Fan hysteresis evaluation (100 ms).
    Control,
    /// Temperature acquisition (500 ms, blocks ~400 ms).
    Sensor,
    /// LCD refresh (200 ms).
    Display,
}

/// Callback trait the scheduler invokes when a task is due.
///
/// The scheduler itself knows nothing about the service, ports, or
/// hardware; the main loop implements this to dispatch the work.
pub trait TaskRunner {
    fn run_task(&mut self, task: TaskId);
}
