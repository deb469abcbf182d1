//! Fuzz the persistent record decoder: arbitrary media contents must
//! never panic, and anything it accepts must be a canonical record.

#![no_main]

use fanstat::storage::{decode_record, encode_record, RECORD_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < RECORD_LEN {
        return;
    }
    let mut record = [0u8; RECORD_LEN];
    record.copy_from_slice(&data[..RECORD_LEN]);

    if let Some(setpoint) = decode_record(&record, 10, 50) {
        assert!((10..=50).contains(&setpoint));
        // Validity implies canonical encoding — magic, payload, CRC.
        assert_eq!(encode_record(setpoint), record);
    }
});
