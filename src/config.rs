//! System configuration parameters.
//!
//! All tunable parameters for the thermostat.  These are compiled in; there
//! is no provisioning surface on this board, so the struct exists to keep
//! every constant in one place and to let tests build variants.

/// Core system configuration.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    // --- Setpoint ---
    /// Lowest accepted setpoint (°C).
    pub setpoint_min_c: i8,
    /// Highest accepted setpoint (°C).
    pub setpoint_max_c: i8,
    /// Setpoint used when the persistent record is missing or corrupt (°C).
    pub setpoint_default_c: i8,

    // --- Fan control ---
    /// Width of the hysteresis dead band below the setpoint (°C).
    /// Fan turns on at `setpoint`, off at `setpoint - hysteresis_c`.
    pub hysteresis_c: f32,

    // --- Task periods ---
    /// Button sampling / debounce period (milliseconds).
    pub input_period_ms: u32,
    /// Fan control evaluation period (milliseconds).
    pub control_period_ms: u32,
    /// Temperature acquisition period (milliseconds).
    pub sensor_period_ms: u32,
    /// LCD refresh period (milliseconds).
    pub display_period_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Setpoint
            setpoint_min_c: 10,
            setpoint_max_c: 50,
            setpoint_default_c: 28,

            // Fan control
            hysteresis_c: 1.0,

            // Task periods
            input_period_ms: 50,
            control_period_ms: 100,
            sensor_period_ms: 500,
            display_period_ms: 200,
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration.  Returns the offending field on error.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.setpoint_min_c >= self.setpoint_max_c {
            return Err("setpoint_min_c must be below setpoint_max_c");
        }
        if self.setpoint_default_c < self.setpoint_min_c
            || self.setpoint_default_c > self.setpoint_max_c
        {
            return Err("setpoint_default_c must lie within [min, max]");
        }
        if !(0.1..=10.0).contains(&self.hysteresis_c) {
            return Err("hysteresis_c must be 0.1–10.0");
        }
        if self.input_period_ms == 0
            || self.control_period_ms == 0
            || self.sensor_period_ms == 0
            || self.display_period_ms == 0
        {
            return Err("task periods must be non-zero");
        }
        if self.input_period_ms > self.control_period_ms {
            return Err("input sampling must be at least as fast as control");
        }
        Ok(())
    }
}
