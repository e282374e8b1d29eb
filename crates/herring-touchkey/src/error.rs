use thiserror::Error;

/// Failure reported by the bus implementation for one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("i2c read failed")]
    Read,
    #[error("i2c write of {value:#04x} failed")]
    Write { value: u8 },
    #[error("bus error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum TouchkeyError {
    /// Recovery already failed once; the controller stays off until it is
    /// powered on again.
    #[error("touchkey is dead")]
    DeviceDead,
    #[error("touchkey recovery failed after {attempts} attempts")]
    RecoveryFailed { attempts: u32 },
    #[error("scancode {scancode} out of range (have {keycodes} keys)")]
    ScancodeOutOfRange { scancode: i32, keycodes: usize },
    #[error("key-off delay {millis}ms exceeds {max}ms")]
    DelayOutOfRange { millis: u64, max: u64 },
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] serde_json::Error),
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("failed to spawn {name} thread: {source}")]
    SpawnThread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("touchkey command '{operation}' timed out after {timeout_ms}ms")]
    CommandTimedOut {
        operation: &'static str,
        timeout_ms: u128,
    },
    #[error("touchkey service exited while handling '{operation}'")]
    ServiceExited { operation: &'static str },
}

impl TouchkeyError {
    pub(crate) fn from_call_error(
        operation: &'static str,
        timeout: std::time::Duration,
        err: herring_runtime::thread_actor::CallError,
    ) -> Self {
        use herring_runtime::thread_actor::CallError;
        match err {
            CallError::MailboxClosed | CallError::ActorStopped => {
                Self::ServiceExited { operation }
            },
            CallError::Timeout => Self::CommandTimedOut {
                operation,
                timeout_ms: timeout.as_millis(),
            },
        }
    }
}
