//! Fan relay and button GPIO adapter.
//!
//! Implements [`FanPort`] and [`ButtonInputPort`] for the fanstat board.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the adapter owns the pin drivers directly.  On the host the
//! levels live in atomics so tests and the simulation loop can inject
//! button presses and observe the relay.

use crate::app::ports::{ButtonInputPort, FanPort};
use crate::drivers::button::BUTTON_COUNT;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

#[cfg(target_os = "espidf")]
use crate::error::Error;
#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver};
#[cfg(target_os = "espidf")]
use log::error;

/// Raw button levels as a bitmask, bit N = button index N (sim backend).
#[cfg(not(target_os = "espidf"))]
static SIM_BUTTON_LEVELS: AtomicU8 = AtomicU8::new(0);
/// Last commanded relay state (sim backend).
#[cfg(not(target_os = "espidf"))]
static SIM_FAN_ON: AtomicBool = AtomicBool::new(false);

/// Inject raw button levels for the next samples (`true` = pressed).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_buttons(levels: [bool; BUTTON_COUNT]) {
    let mut mask = 0u8;
    for (i, &level) in levels.iter().enumerate() {
        if level {
            mask |= 1 << i;
        }
    }
    SIM_BUTTON_LEVELS.store(mask, Ordering::Relaxed);
}

/// Observe the simulated relay state.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fan_state() -> bool {
    SIM_FAN_ON.load(Ordering::Relaxed)
}

pub struct HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fan: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(target_os = "espidf")]
    buttons: [PinDriver<'static, AnyIOPin, Input>; BUTTON_COUNT],
    fan_on: bool,
}

#[cfg(target_os = "espidf")]
impl HardwareAdapter {
    /// Take ownership of the board pins.  Button pins rely on the
    /// external pull-downs (active-high switches), so no internal pull is
    /// configured.  The relay starts de-energised.
    pub fn new(
        fan_pin: AnyOutputPin,
        up: AnyIOPin,
        down: AnyIOPin,
        set: AnyIOPin,
        power: AnyIOPin,
    ) -> Result<Self, Error> {
        let mut fan = PinDriver::output(fan_pin).map_err(|_| Error::Init("fan gpio"))?;
        fan.set_low().map_err(|_| Error::Init("fan gpio level"))?;

        let buttons = [
            PinDriver::input(up).map_err(|_| Error::Init("up gpio"))?,
            PinDriver::input(down).map_err(|_| Error::Init("down gpio"))?,
            PinDriver::input(set).map_err(|_| Error::Init("set gpio"))?,
            PinDriver::input(power).map_err(|_| Error::Init("power gpio"))?,
        ];

        Ok(Self {
            fan,
            buttons,
            fan_on: false,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HardwareAdapter {
    pub fn new() -> Self {
        SIM_FAN_ON.store(false, Ordering::Relaxed);
        Self { fan_on: false }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FanPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn set_fan(&mut self, on: bool) {
        let result = if on {
            self.fan.set_high()
        } else {
            self.fan.set_low()
        };
        if let Err(e) = result {
            // The relay pin failing is not recoverable from here; keep the
            // loop alive and let the next tick retry.
            error!("fan gpio write failed: {e}");
            return;
        }
        self.fan_on = on;
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_fan(&mut self, on: bool) {
        SIM_FAN_ON.store(on, Ordering::Relaxed);
        self.fan_on = on;
    }

    fn is_fan_on(&self) -> bool {
        self.fan_on
    }
}

impl ButtonInputPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self) -> [bool; BUTTON_COUNT] {
        let mut levels = [false; BUTTON_COUNT];
        for (level, pin) in levels.iter_mut().zip(self.buttons.iter()) {
            *level = pin.is_high();
        }
        levels
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self) -> [bool; BUTTON_COUNT] {
        let mask = SIM_BUTTON_LEVELS.load(Ordering::Relaxed);
        core::array::from_fn(|i| mask & (1 << i) != 0)
    }
}
