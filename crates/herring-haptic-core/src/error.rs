use thiserror::Error;

/// Malformed write buffers and records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid write size {len}: expected more than {min_exclusive} and less than {max_exclusive} bytes")]
    InvalidWriteSize {
        len: usize,
        min_exclusive: usize,
        max_exclusive: usize,
    },
    #[error("record at offset {offset} needs {needed} bytes, only {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("record carries {samples} samples, at most {max} fit in a slot")]
    Oversized { samples: usize, max: usize },
}

/// Failures reported by the actuator hardware layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("actuator {actuator} is not wired to this sink")]
    UnknownActuator { actuator: u8 },
    #[error("actuator {actuator} did not acknowledge the sample")]
    Nak { actuator: u8 },
    #[error("sink failure: {0}")]
    Device(String),
}
