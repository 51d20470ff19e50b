//! Scripted in-memory bus for tests, no hardware access.

use std::sync::{Arc, Mutex};

use crate::types::{CurrentSenseBus, MonitorError};

/// Shared handle onto a [`MockBus`]'s recorded register writes. Stays valid
/// after the bus itself has been moved into a driver.
#[derive(Clone, Default)]
pub struct BusLog {
    writes: Arc<Mutex<Vec<(u8, u16)>>>,
}

impl BusLog {
    /// All `(register, word)` writes recorded so far, in order.
    pub fn writes(&self) -> Vec<(u8, u16)> {
        self.writes.lock().unwrap().clone()
    }
}

/// A bus that answers reads from a scripted sequence (cycled) and records
/// every write. Words are scripted in bus order, i.e. already byte-swapped
/// the way SMBus would deliver them.
pub struct MockBus {
    reads: Vec<Result<u16, MonitorError>>,
    cursor: usize,
    log: BusLog,
}

impl MockBus {
    pub fn new(read_words: Vec<u16>) -> Self {
        Self::scripted(read_words.into_iter().map(Ok).collect())
    }

    /// Script reads including injected transport failures.
    pub fn scripted(reads: Vec<Result<u16, MonitorError>>) -> Self {
        Self { reads, cursor: 0, log: BusLog::default() }
    }

    /// Handle for inspecting writes after the bus has been handed to a driver.
    pub fn log(&self) -> BusLog {
        self.log.clone()
    }
}

impl CurrentSenseBus for MockBus {
    fn read_word(&mut self, _reg: u8) -> Result<u16, MonitorError> {
        if self.reads.is_empty() {
            return Ok(0);
        }
        let response = self.reads[self.cursor % self.reads.len()].clone();
        self.cursor += 1;
        response
    }

    fn write_word(&mut self, reg: u8, value: u16) -> Result<(), MonitorError> {
        self.log.writes.lock().unwrap().push((reg, value));
        Ok(())
    }
}
