//! Scripted bus shared by the in-crate tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::bus::TouchkeyBus;
use crate::error::BusError;

#[derive(Default)]
struct BusLog {
    reads: VecDeque<Result<u8, BusError>>,
    dead: bool,
    read_attempts: usize,
    write_failures: usize,
    writes: Vec<u8>,
    power: Vec<bool>,
}

/// Reads pop scripted results (`Ok(0)` once the script is empty, or
/// failures after [`FakeBus::go_dead`]). Clones share one log.
#[derive(Clone, Default)]
pub(crate) struct FakeBus {
    log: Arc<Mutex<BusLog>>,
}

impl FakeBus {
    fn log(&self) -> MutexGuard<'_, BusLog> {
        self.log.lock().expect("bus log lock")
    }

    pub(crate) fn queue_reads(&self, reads: impl IntoIterator<Item = Result<u8, BusError>>) {
        self.log().reads.extend(reads);
    }

    pub(crate) fn go_dead(&self) {
        self.log().dead = true;
    }

    pub(crate) fn fail_writes(&self, count: usize) {
        self.log().write_failures = count;
    }

    pub(crate) fn read_attempts(&self) -> usize {
        self.log().read_attempts
    }

    pub(crate) fn writes(&self) -> Vec<u8> {
        self.log().writes.clone()
    }

    pub(crate) fn power(&self) -> Vec<bool> {
        self.log().power.clone()
    }
}

impl TouchkeyBus for FakeBus {
    fn read_byte(&mut self) -> Result<u8, BusError> {
        let mut log = self.log();
        log.read_attempts += 1;
        if let Some(result) = log.reads.pop_front() {
            return result;
        }
        if log.dead {
            return Err(BusError::Read);
        }
        Ok(0)
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        let mut log = self.log();
        if log.write_failures > 0 {
            log.write_failures -= 1;
            return Err(BusError::Write { value });
        }
        log.writes.push(value);
        Ok(())
    }

    fn set_power(&mut self, on: bool) {
        self.log().power.push(on);
    }
}
