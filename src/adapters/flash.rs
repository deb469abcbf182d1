//! Sector flash adapter backing the persistent setpoint store.
//!
//! Implements [`SectorFlash`] for the fanstat system.
//!
//! - On ESP-IDF the dedicated `setpoint` data partition (one 4 KiB erase
//!   unit, declared in `partitions.csv`) is driven through the raw
//!   `esp_partition_*` API.
//! - The simulation backend models real NOR behaviour: erase resets the
//!   unit to `0xFF`, programming can only clear bits, and faults can be
//!   injected for tests.

use crate::storage::SectorFlash;

use crate::error::StorageError;
#[cfg(target_os = "espidf")]
use crate::error::Error;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Erase-unit size of the backing sector.
#[cfg(target_os = "espidf")]
pub const SECTOR_SIZE: usize = 4096;
/// Erase-unit size of the simulated sector (a small-page part).
#[cfg(not(target_os = "espidf"))]
pub const SECTOR_SIZE: usize = 512;

/// Bytes programmed per program cycle (halfword granularity).
const PROGRAM_CHUNK: usize = 2;

pub struct FlashSector {
    #[cfg(target_os = "espidf")]
    partition: *const esp_partition_t,

    #[cfg(not(target_os = "espidf"))]
    bytes: [u8; SECTOR_SIZE],
    #[cfg(not(target_os = "espidf"))]
    fail_erase: bool,
    #[cfg(not(target_os = "espidf"))]
    fail_program: bool,
}

#[cfg(target_os = "espidf")]
impl FlashSector {
    /// Locate the dedicated `setpoint` partition.
    ///
    /// Fails if the partition table does not declare it — that is a build
    /// configuration error, not a runtime condition to paper over.
    pub fn open() -> Result<Self, Error> {
        // SAFETY: esp_partition_find_first takes a NUL-terminated label and
        // returns a pointer into the constant partition table (static
        // lifetime, never freed).
        let partition = unsafe {
            esp_partition_find_first(
                esp_partition_type_t_ESP_PARTITION_TYPE_DATA,
                esp_partition_subtype_t_ESP_PARTITION_SUBTYPE_ANY,
                b"setpoint\0".as_ptr() as *const _,
            )
        };
        if partition.is_null() {
            return Err(Error::Init("setpoint partition not found"));
        }
        Ok(Self { partition })
    }
}

#[cfg(target_os = "espidf")]
impl SectorFlash for FlashSector {
    fn capacity(&self) -> usize {
        SECTOR_SIZE
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        // SAFETY: partition is a valid table entry (checked in open());
        // the range is erase-unit aligned by construction.
        let ret = unsafe { esp_partition_erase_range(self.partition, 0, SECTOR_SIZE) };
        if ret != ESP_OK {
            return Err(StorageError::EraseFailed);
        }
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if offset + data.len() > SECTOR_SIZE {
            return Err(StorageError::ProgramFailed);
        }
        // Two bytes per program cycle — matches the halfword granularity
        // the record format assumes for torn-write analysis.
        for (i, chunk) in data.chunks(PROGRAM_CHUNK).enumerate() {
            // SAFETY: chunk points at live borrowed data; offset stays
            // within the partition (checked above).
            let ret = unsafe {
                esp_partition_write(
                    self.partition,
                    offset + i * PROGRAM_CHUNK,
                    chunk.as_ptr() as *const _,
                    chunk.len(),
                )
            };
            if ret != ESP_OK {
                return Err(StorageError::ProgramFailed);
            }
        }
        Ok(())
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        if offset + buf.len() > SECTOR_SIZE {
            return Err(StorageError::InvalidRecord);
        }
        // SAFETY: buf is exclusively borrowed; bounds checked above.
        let ret = unsafe {
            esp_partition_read(
                self.partition,
                offset,
                buf.as_mut_ptr() as *mut _,
                buf.len(),
            )
        };
        if ret != ESP_OK {
            return Err(StorageError::InvalidRecord);
        }
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl FlashSector {
    /// Fresh simulated sector — fully erased, no faults armed.
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; SECTOR_SIZE],
            fail_erase: false,
            fail_program: false,
        }
    }

    /// Flip the low bit of one byte, emulating media corruption.
    pub fn corrupt_byte(&mut self, offset: usize) {
        self.bytes[offset] ^= 0x01;
    }

    /// Arm a one-shot erase failure.
    pub fn fail_next_erase(&mut self) {
        self.fail_erase = true;
    }

    /// Arm a one-shot program failure.
    pub fn fail_next_program(&mut self) {
        self.fail_program = true;
    }

    /// Raw view of the sector contents (test assertions).
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for FlashSector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl SectorFlash for FlashSector {
    fn capacity(&self) -> usize {
        SECTOR_SIZE
    }

    fn erase(&mut self) -> Result<(), StorageError> {
        if self.fail_erase {
            self.fail_erase = false;
            return Err(StorageError::EraseFailed);
        }
        self.bytes = [0xFF; SECTOR_SIZE];
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        if offset + data.len() > SECTOR_SIZE {
            return Err(StorageError::ProgramFailed);
        }
        if self.fail_program {
            self.fail_program = false;
            return Err(StorageError::ProgramFailed);
        }
        for (i, chunk) in data.chunks(PROGRAM_CHUNK).enumerate() {
            for (j, &byte) in chunk.iter().enumerate() {
                // NOR semantics: programming can only clear bits.
                self.bytes[offset + i * PROGRAM_CHUNK + j] &= byte;
            }
        }
        Ok(())
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        if offset + buf.len() > SECTOR_SIZE {
            return Err(StorageError::InvalidRecord);
        }
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }
}
