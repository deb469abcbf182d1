//! Bit-banged 1-Wire bus master.
//!
//! Half-duplex protocol over one open-drain line: the master only ever
//! drives the line low or releases it (`set_high` on an open-drain pin),
//! and bits live in the width of the low pulses.  All timing comes from
//! the busy-wait delay primitive; the slot constants below are the
//! protocol envelope, not tuning values.
//!
//! | Phase            | Low      | Release / sample        |
//! |------------------|----------|-------------------------|
//! | Reset            | 480 µs   | sample at 80 µs, 400 µs recovery |
//! | Write 1          | 1 µs     | 60 µs released          |
//! | Write 0          | 60 µs    | immediate release       |
//! | Read             | 2 µs     | sample at 10 µs, 50 µs remainder |
//!
//! Bytes travel least-significant bit first in both directions.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 80;
const RESET_RECOVERY_US: u32 = 400;
const WRITE_ONE_LOW_US: u32 = 1;
const WRITE_SLOT_US: u32 = 60;
const READ_INIT_LOW_US: u32 = 2;
const READ_SAMPLE_US: u32 = 10;
const READ_REMAINDER_US: u32 = 50;

/// 1-Wire bus master over a single open-drain GPIO.
pub struct OneWireBus<P> {
    pin: P,
}

impl<P: InputPin + OutputPin> OneWireBus<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Issue a reset pulse and sample for a device presence pulse.
    ///
    /// `Ok(true)` means a device answered; `Ok(false)` means the line
    /// floated high — nothing attached or the probe is unpowered.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<bool, SensorError> {
        self.drive_low()?;
        delay.delay_us(RESET_LOW_US);
        self.release()?;
        delay.delay_us(PRESENCE_SAMPLE_US);
        let present = self.pin.is_low().map_err(|_| SensorError::GpioFailed)?;
        delay.delay_us(RESET_RECOVERY_US);
        Ok(present)
    }

    /// Write one byte, least-significant bit first.
    pub fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), SensorError> {
        for i in 0..8 {
            self.write_bit(delay, byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Read one byte, least-significant bit first.
    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit(delay)? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    fn write_bit(&mut self, delay: &mut impl DelayNs, bit: bool) -> Result<(), SensorError> {
        self.drive_low()?;
        if bit {
            // A 1-bit is a short low spike; the device samples the released
            // (pulled-up) line for the rest of the slot.
            delay.delay_us(WRITE_ONE_LOW_US);
            self.release()?;
            delay.delay_us(WRITE_SLOT_US);
        } else {
            // A 0-bit holds the line low through the whole slot.
            delay.delay_us(WRITE_SLOT_US);
            self.release()?;
        }
        Ok(())
    }

    fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, SensorError> {
        self.drive_low()?;
        delay.delay_us(READ_INIT_LOW_US);
        self.release()?;
        delay.delay_us(READ_SAMPLE_US);
        let bit = self.pin.is_high().map_err(|_| SensorError::GpioFailed)?;
        delay.delay_us(READ_REMAINDER_US);
        Ok(bit)
    }

    fn drive_low(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)
    }

    /// Release the open-drain line; the pull-up (or a device) now owns it.
    fn release(&mut self) -> Result<(), SensorError> {
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)
    }
}

// ---------------------------------------------------------------------------
// Test doubles — a scripted open-drain line and a delay that only records
// ---------------------------------------------------------------------------
