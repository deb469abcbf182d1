//! Peripheral drivers: the debounced button bank, the 1-Wire bus master,
//! and the microsecond busy-wait they are timed by.

pub mod button;
pub mod delay;
pub mod onewire;
