//! GPIO / peripheral pin assignments for the fanstat main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// DS18B20 temperature probe (1-Wire)
// ---------------------------------------------------------------------------

/// Bidirectional open-drain data line for the DS18B20.  External 4.7 kΩ
/// pull-up to 3V3; the driver only ever drives the line low or releases it.
pub const ONEWIRE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Front-panel buttons (active-high, external pull-downs)
// ---------------------------------------------------------------------------

/// Raise the setpoint by 1 °C while in Setting mode.
pub const BUTTON_UP_GPIO: i32 = 5;
/// Lower the setpoint by 1 °C while in Setting mode.
pub const BUTTON_DOWN_GPIO: i32 = 6;
/// Toggle between Normal and Setting mode.
pub const BUTTON_SET_GPIO: i32 = 7;
/// Toggle between Off and Normal mode.
pub const BUTTON_POWER_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// Fan relay driver
// ---------------------------------------------------------------------------

/// Digital output to the fan relay transistor (active HIGH).
pub const FAN_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// I²C bus — 1602 character LCD on a PCF8574 backpack
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;

/// 7-bit I²C address of the PCF8574 LCD backpack.
pub const LCD_I2C_ADDR: u8 = 0x27;
/// I²C bus clock.  The PCF8574 tops out at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;
