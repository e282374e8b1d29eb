//! Typed error enum for the haptic engine.
//!
//! [`HapticError`] is the single public error type of the crate; wire-format
//! problems arrive wrapped from [`RecordError`].

use thiserror::Error;

use herring_haptic_core::RecordError;
use herring_runtime::thread_actor::CallError;

use crate::config::engine::SessionId;

#[derive(Debug, Error)]
pub enum HapticError {
    /// Session never identified itself with the service magic number.
    #[error("unauthorized write from {session}")]
    Unauthorized { session: SessionId },
    #[error("{session} is not open")]
    UnknownSession { session: SessionId },
    /// Both slots of the actuator still hold undrained samples.
    #[error("no room to store new samples for actuator {actuator}")]
    NoFreeSlot { actuator: u8 },
    #[error("actuator index {actuator} out of range (have {num_actuators})")]
    InvalidActuator { actuator: u8, num_actuators: u8 },
    /// Suspend refused while effects are still playing.
    #[error("still playing effects")]
    Busy,
    #[error("pwm duty {percent}% out of range 0..=100")]
    InvalidDuty { percent: u32 },
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] serde_json::Error),
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to spawn {name} thread: {source}")]
    SpawnThread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("control command '{operation}' timed out after {timeout_ms}ms")]
    ControlCommandTimedOut {
        operation: &'static str,
        timeout_ms: u128,
    },
    #[error("control actor exited while handling '{operation}'")]
    ControlActorExited { operation: &'static str },
    #[error("timed vibrator worker exited")]
    VibratorExited,
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl HapticError {
    pub(crate) fn from_call_error(
        operation: &'static str,
        timeout: std::time::Duration,
        err: CallError,
    ) -> Self {
        match err {
            CallError::MailboxClosed | CallError::ActorStopped => {
                Self::ControlActorExited { operation }
            },
            CallError::Timeout => Self::ControlCommandTimedOut {
                operation,
                timeout_ms: timeout.as_millis(),
            },
        }
    }
}
