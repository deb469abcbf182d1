//! Time-triggered cooperative scheduler.
//!
//! Four periodic tasks share one execution context:
//!
//! ```text
//! ┌─────────┬───────────┬──────────────────────────────┐
//! │ Task    │ Period    │ Work                         │
//! ├─────────┼───────────┼──────────────────────────────┤
//! │ Input   │  50 ms    │ sample + debounce buttons    │
//! │ Control │ 100 ms    │ hysteresis fan evaluation    │
//! │ Sensor  │ 500 ms    │ DS18B20 acquisition (blocks) │
//! │ Display │ 200 ms    │ LCD refresh                  │
//! └─────────┴───────────┴──────────────────────────────┘
//! ```
//!
//! [`Scheduler::run_once`] is expected from the main loop at a cadence at
//! least as fast as the shortest period — every millisecond in practice.
//! A task fires when `now - last_run >= period` (wraparound-safe) and runs
//! to completion in the calling context.  There is no preemption: the
//! Sensor task's 400 ms conversion wait stalls every other task for its
//! duration, and a stalled-past task's missed cycles are simply skipped.
//!
//! The scheduler notifies a [`TaskRunner`] when a task is due rather than
//! calling into the application directly, which keeps it independently
//! testable.

use crate::app::ports::{TaskId, TaskRunner};
use crate::config::SystemConfig;
use log::info;

/// Number of scheduled tasks.
pub const TASK_COUNT: usize = 4;

/// Bookkeeping for one periodic task.
#[derive(Debug, Clone, Copy)]
struct TaskSlot {
    id: TaskId,
    period_ms: u32,
    last_run_ms: u32,
}

/// The cooperative scheduler engine.
pub struct Scheduler {
    /// Fixed evaluation order — earlier entries win when several tasks
    /// are due on the same pass.
    slots: [TaskSlot; TASK_COUNT],
}

impl Scheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            slots: [
                TaskSlot {
                    id: TaskId::Input,
                    period_ms: config.input_period_ms,
                    last_run_ms: 0,
                },
                TaskSlot {
                    id: TaskId::Control,
                    period_ms: config.control_period_ms,
                    last_run_ms: 0,
                },
                TaskSlot {
                    id: TaskId::Sensor,
                    period_ms: config.sensor_period_ms,
                    last_run_ms: 0,
                },
                TaskSlot {
                    id: TaskId::Display,
                    period_ms: config.display_period_ms,
                    last_run_ms: 0,
                },
            ],
        }
    }

    /// Seed every slot's reference timestamp.  Call once before the first
    /// [`run_once`](Self::run_once) so no task fires on a stale epoch.
    pub fn init(&mut self, now_ms: u32) {
        for slot in &mut self.slots {
            slot.last_run_ms = now_ms;
        }
        info!("scheduler: armed {} tasks at t={} ms", TASK_COUNT, now_ms);
    }

    /// Evaluate all tasks once against the current monotonic time.
    ///
    /// Each due task is stamped with `now_ms` BEFORE it runs, so an
    /// overrunning task does not immediately re-fire; any cycles it
    /// starved out of other tasks are lost, not queued.
    pub fn run_once(&mut self, now_ms: u32, runner: &mut dyn TaskRunner) {
        for slot in &mut self.slots {
            if now_ms.wrapping_sub(slot.last_run_ms) >= slot.period_ms {
                slot.last_run_ms = now_ms;
                runner.run_task(slot.id);
            }
        }
    }
}
