use std::time::Duration;

use tracing::{debug, warn};

use crate::error::BusError;

/// Byte-level access to the controller plus its power rail.
pub trait TouchkeyBus: Send {
    fn read_byte(&mut self) -> Result<u8, BusError>;

    fn write_byte(&mut self, value: u8) -> Result<(), BusError>;

    fn set_power(&mut self, on: bool);
}

impl<B: TouchkeyBus + ?Sized> TouchkeyBus for Box<B> {
    fn read_byte(&mut self) -> Result<u8, BusError> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        (**self).write_byte(value)
    }

    fn set_power(&mut self, on: bool) {
        (**self).set_power(on)
    }
}

/// Fixed-delay retry policy for single bus transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    fn run<T>(
        &self,
        op: &'static str,
        mut attempt: impl FnMut() -> Result<T, BusError>,
    ) -> Result<T, BusError> {
        let mut retries_left = self.retries;
        loop {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(error) if retries_left == 0 => {
                    warn!(op, "{error}, giving up");
                    return Err(error);
                },
                Err(error) => {
                    debug!(op, retries_left, "{error}, retrying");
                    retries_left -= 1;
                    std::thread::sleep(self.delay);
                },
            }
        }
    }

    pub fn read_byte(&self, bus: &mut dyn TouchkeyBus) -> Result<u8, BusError> {
        self.run("read", || bus.read_byte())
    }

    pub fn write_byte(&self, bus: &mut dyn TouchkeyBus, value: u8) -> Result<(), BusError> {
        self.run("write", || bus.write_byte(value))
    }
}
