//! Flash-backed persistent setpoint store.
//!
//! The last erasable unit of flash is treated as a single-record slot:
//!
//! ```text
//! offset 0                                  7
//!        ┌────────────┬──────────┬──────────┐
//!        │ magic (LE) │ setpoint │ crc (LE) │
//!        │  4 bytes   │  1 byte  │ 2 bytes  │
//!        └────────────┴──────────┴──────────┘
//!                CRC16-CCITT over bytes 0..5
//! ```
//!
//! A record is valid iff the magic matches, the CRC matches, and the
//! setpoint lies within the configured range.  Anything else — blank
//! media, bit rot, a write torn by power loss — reads as
//! [`StorageError::InvalidRecord`] and callers fall back to the default.
//!
//! The medium only clears bits between erasures, so every save costs one
//! full erase+program cycle of the unit.  There is no wear-leveling; the
//! same physical cells absorb every setpoint change.

pub mod crc16;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::StorageError;
use crc16::crc16_ccitt;

/// Marker identifying an initialised record.
pub const RECORD_MAGIC: u32 = 0xDEAD_BEEF;

/// On-media record length in bytes.
pub const RECORD_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Sector flash port
// ---------------------------------------------------------------------------

/// One dedicated erase unit of non-volatile memory.
///
/// Implementations must honour erase-before-write semantics: `erase()`
/// resets the whole unit to `0xFF`, and `program()` can only clear bits
/// until the next erase.  Programming proceeds two bytes per cycle.
pub trait SectorFlash {
    /// Size of the erase unit in bytes.
    fn capacity(&self) -> usize;

    /// Erase the entire unit to `0xFF`.
    fn erase(&mut self) -> Result<(), StorageError>;

    /// Program `data` starting at `offset` into a freshly erased region.
    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;

    /// Read `buf.len()` bytes starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;
}

impl<F: SectorFlash + ?Sized> SectorFlash for &mut F {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        (**self).erase()
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        (**self).program(offset, data)
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        (**self).read(offset, buf)
    }
}

// ---------------------------------------------------------------------------
// Record codec
// ---------------------------------------------------------------------------

/// Serialise a setpoint into the on-media record layout.
pub fn encode_record(setpoint: i8) -> [u8; RECORD_LEN] {
    let mut record = [0u8; RECORD_LEN];
    record[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
    record[4] = setpoint as u8;
    let crc = crc16_ccitt(&record[0..5]);
    record[5..7].copy_from_slice(&crc.to_le_bytes());
    record
}

/// Validate a raw record and extract the setpoint.
///
/// Returns `None` unless magic, CRC, and range all check out.  A torn
/// write is indistinguishable from corruption here — both decode to
/// `None` and the caller falls back to its default.
pub fn decode_record(record: &[u8; RECORD_LEN], min_c: i8, max_c: i8) -> Option<i8> {
    let magic = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
    if magic != RECORD_MAGIC {
        return None;
    }
    let stored_crc = u16::from_le_bytes([record[5], record[6]]);
    if crc16_ccitt(&record[0..5]) != stored_crc {
        return None;
    }
    let setpoint = record[4] as i8;
    if setpoint < min_c || setpoint > max_c {
        return None;
    }
    Some(setpoint)
}

// ---------------------------------------------------------------------------
// Setpoint store
// ---------------------------------------------------------------------------

/// Outcome of [`SetpointStore::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// Whether the on-media record was valid.
    pub valid: bool,
    /// The setpoint to run with — loaded, or the default when invalid.
    pub setpoint: i8,
}

/// Single-slot persistent store for the user setpoint.
pub struct SetpointStore<F: SectorFlash> {
    flash: F,
    min_c: i8,
    max_c: i8,
    default_c: i8,
}

impl<F: SectorFlash> SetpointStore<F> {
    pub fn new(flash: F, config: &SystemConfig) -> Self {
        Self {
            flash,
            min_c: config.setpoint_min_c,
            max_c: config.setpoint_max_c,
            default_c: config.setpoint_default_c,
        }
    }

    /// Read and validate the on-media record.
    ///
    /// On an invalid record the default setpoint is reported WITHOUT
    /// writing it back — the media stays untouched until the next save,
    /// so a transient read glitch cannot trigger an erase cycle.
    pub fn init(&mut self) -> InitReport {
        match self.load() {
            Ok(setpoint) => {
                info!("setpoint store: valid record, setpoint {setpoint} C");
                InitReport {
                    valid: true,
                    setpoint,
                }
            }
            Err(e) => {
                warn!(
                    "setpoint store: {e}; running with default {} C",
                    self.default_c
                );
                InitReport {
                    valid: false,
                    setpoint: self.default_c,
                }
            }
        }
    }

    /// Persist a setpoint.
    ///
    /// Rejects out-of-range values before touching the media.  Otherwise
    /// the whole unit is erased and the fresh record programmed; either
    /// step failing is propagated.
    pub fn save(&mut self, setpoint: i8) -> Result<(), StorageError> {
        if setpoint < self.min_c || setpoint > self.max_c {
            return Err(StorageError::SetpointOutOfRange);
        }
        let record = encode_record(setpoint);
        self.flash.erase()?;
        self.flash.program(0, &record)
    }

    /// Re-read and re-validate the record from media.
    ///
    /// Never trusts a cached value — every call goes back to the flash.
    pub fn load(&mut self) -> Result<i8, StorageError> {
        let mut record = [0u8; RECORD_LEN];
        self.flash.read(0, &mut record)?;
        decode_record(&record, self.min_c, self.max_c).ok_or(StorageError::InvalidRecord)
    }

    /// Unconditionally erase the unit and write a fresh record carrying
    /// `default_setpoint`.
    pub fn erase_to_default(&mut self, default_setpoint: i8) -> Result<(), StorageError> {
        if default_setpoint < self.min_c || default_setpoint > self.max_c {
            return Err(StorageError::SetpointOutOfRange);
        }
        let record = encode_record(default_setpoint);
        self.flash.erase()?;
        self.flash.program(0, &record)
    }

    /// Borrow the underlying flash (test introspection).
    #[cfg(not(target_os = "espidf"))]
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }
}

impl<F: SectorFlash> crate::app::ports::SetpointPort for SetpointStore<F> {
    fn save(&mut self, setpoint: i8) -> Result<(), StorageError> {
        SetpointStore::save(self, setpoint)
    }

    fn load(&mut self) -> Result<i8, StorageError> {
        SetpointStore::load(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::flash::FlashSector;

    fn store() -> SetpointStore<FlashSector> {
        SetpointStore::new(FlashSector::new(), &SystemConfig::default())
    }

    #[test]
    fn record_layout_is_stable() {
        let record = encode_record(28);
        assert_eq!(&record[0..4], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(record[4], 28);
        let crc = crc16_ccitt(&record[0..5]);
        assert_eq!(record[5], (crc & 0xFF) as u8);
        assert_eq!(record[6], (crc >> 8) as u8);
    }

    #[test]
    fn encode_decode_roundtrip_full_range() {
        for setpoint in 10..=50 {
            let record = encode_record(setpoint);
            assert_eq!(decode_record(&record, 10, 50), Some(setpoint));
        }
    }

    #[test]
    fn init_on_blank_media_reports_invalid_with_default() {
        let mut store = store();
        let report = store.init();
        assert!(!report.valid);
        assert_eq!(report.setpoint, 28);
    }

    #[test]
    fn init_does_not_write_media() {
        let mut store = store();
        let _ = store.init();
        // Still blank — init must never repair in place.
        assert!(store.load().is_err());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let mut store = store();
        for setpoint in [10, 28, 50] {
            store.save(setpoint).unwrap();
            assert_eq!(store.load().unwrap(), setpoint);
        }
    }

    #[test]
    fn save_rejects_out_of_range_without_touching_media() {
        let mut store = store();
        store.save(42).unwrap();
        for bad in [9, 51, -5, i8::MIN, i8::MAX] {
            assert_eq!(store.save(bad), Err(StorageError::SetpointOutOfRange));
        }
        assert_eq!(store.load().unwrap(), 42);
    }

    #[test]
    fn corrupting_any_byte_invalidates_record() {
        for offset in 0..RECORD_LEN {
            let mut store = store();
            store.save(35).unwrap();
            store.flash_mut().corrupt_byte(offset);
            assert_eq!(store.load(), Err(StorageError::InvalidRecord));
            let report = store.init();
            assert!(!report.valid, "corruption at byte {offset} went undetected");
            assert_eq!(report.setpoint, 28);
        }
    }

    #[test]
    fn torn_write_reads_as_invalid() {
        let mut store = store();
        let record = encode_record(30);
        store.flash_mut().erase().unwrap();
        // Power lost after the first program cycle: only 2 bytes landed.
        store.flash_mut().program(0, &record[0..2]).unwrap();
        assert_eq!(store.load(), Err(StorageError::InvalidRecord));
    }

    #[test]
    fn erase_to_default_writes_fresh_record() {
        let mut store = store();
        store.save(50).unwrap();
        store.erase_to_default(25).unwrap();
        assert_eq!(store.load().unwrap(), 25);
    }

    #[test]
    fn erase_to_default_rejects_out_of_range() {
        let mut store = store();
        assert_eq!(
            store.erase_to_default(9),
            Err(StorageError::SetpointOutOfRange)
        );
    }

    #[test]
    fn save_propagates_erase_failure() {
        let mut store = store();
        store.flash_mut().fail_next_erase();
        assert_eq!(store.save(30), Err(StorageError::EraseFailed));
    }

    #[test]
    fn save_propagates_program_failure() {
        let mut store = store();
        store.flash_mut().fail_next_program();
        assert_eq!(store.save(30), Err(StorageError::ProgramFailed));
    }

    #[test]
    fn out_of_range_payload_with_valid_crc_is_rejected() {
        // A record that is structurally intact but carries 60 °C must not
        // be trusted.
        let record = encode_record(60);
        assert_eq!(decode_record(&record, 10, 50), None);
    }
}
