//! Microsecond busy-wait delay.
//!
//! The 1-Wire protocol encodes bits in the width of line-low pulses, so the
//! driver needs sub-millisecond delays with no scheduler involvement.
//!
//! - **`target_os = "espidf"`** — `esp_rom_delay_us`, a calibrated spin on
//!   the free-running CPU cycle counter.
//! - **host** — spins on `std::time::Instant` for simulation runs.

use embedded_hal::delay::DelayNs;

/// Blocking delay derived from the CPU cycle counter.
///
/// Every wait runs to completion in the calling context; a 400 ms
/// conversion wait stalls the whole cooperative loop for 400 ms.
pub struct CycleDelay;

impl CycleDelay {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CycleDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for CycleDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // SAFETY: esp_rom_delay_us is a plain busy-wait ROM routine with no
        // preconditions beyond a running CPU.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1000)) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        let start = std::time::Instant::now();
        let target = core::time::Duration::from_nanos(u64::from(ns));
        while start.elapsed() < target {
            core::hint::spin_loop();
        }
    }
}
