//! Monotonic time adapter.
//!
//! The scheduler keys every task off a monotonic millisecond tick.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

/// Monotonic clock since boot.
pub struct TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time has no preconditions after esp_timer
        // init, which esp-idf-svc performs during startup.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot, truncated to the scheduler's tick width.
    /// Wraps after ~49.7 days; the scheduler subtracts wrapping-safe.
    pub fn uptime_ms(&self) -> u32 {
        (self.uptime_us() / 1000) as u32
    }
}
