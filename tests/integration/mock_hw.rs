//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO or flash.

use fanstat::app::events::AppEvent;
use fanstat::app::ports::{DisplayPort, EventSink, FanPort, SetpointPort};
use fanstat::error::StorageError;

// ── MockFan ───────────────────────────────────────────────────

pub struct MockFan {
    pub on: bool,
    /// Every commanded state, in order.
    pub history: Vec<bool>,
}

#[allow(dead_code)]
impl MockFan {
    pub fn new() -> Self {
        Self {
            on: false,
            history: Vec::new(),
        }
    }

    /// Number of on/off edges in the command history.
    pub fn edges(&self) -> usize {
        self.history.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

impl FanPort for MockFan {
    fn set_fan(&mut self, on: bool) {
        self.on = on;
        self.history.push(on);
    }

    fn is_fan_on(&self) -> bool {
        self.on
    }
}

// ── MockStore ─────────────────────────────────────────────────

pub struct MockStore {
    pub record: Option<i8>,
    pub saves: Vec<i8>,
    pub fail_saves: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            record: None,
            saves: Vec::new(),
            fail_saves: false,
        }
    }
}

impl SetpointPort for MockStore {
    fn save(&mut self, setpoint: i8) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::ProgramFailed);
        }
        self.record = Some(setpoint);
        self.saves.push(setpoint);
        Ok(())
    }

    fn load(&mut self) -> Result<i8, StorageError> {
        self.record.ok_or(StorageError::InvalidRecord)
    }
}

// ── MockDisplay ───────────────────────────────────────────────

/// 2×16 character frame mirroring the real panel.
pub struct MockDisplay {
    pub frame: [[u8; 16]; 2],
    cursor: (usize, usize),
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self {
            frame: [[b' '; 16]; 2],
            cursor: (0, 0),
        }
    }

    pub fn line(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.frame[row]).into_owned()
    }
}

impl DisplayPort for MockDisplay {
    fn set_cursor(&mut self, row: u8, col: u8) {
        self.cursor = ((row as usize).min(1), (col as usize).min(15));
    }

    fn write_text(&mut self, text: &str) {
        let (row, mut col) = self.cursor;
        for byte in text.bytes() {
            if col >= 16 {
                break;
            }
            self.frame[row][col] = byte;
            col += 1;
        }
        self.cursor = (row, col.min(15));
    }
}

// ── MockSink ──────────────────────────────────────────────────

pub struct MockSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl MockSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for MockSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
