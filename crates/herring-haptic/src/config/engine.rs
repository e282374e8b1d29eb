use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use herring_haptic_core::record::VIBE_OUTPUT_SAMPLE_SIZE;

use crate::error::HapticError;

/// Identifier of one open control session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Stop requested by the service, honored after the last slot drained.
    Graceful,
    /// Nothing left to play for longer than the watchdog budget.
    Watchdog,
    /// A control session was released mid-playback.
    Released,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    InvalidActuator,
    Oversized,
    Empty,
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticEvent {
    SessionAuthorized { session: SessionId },
    UnauthorizedWrite { session: SessionId },
    PlaybackStarted,
    PlaybackStopped { reason: StopReason },
    RecordDropped {
        actuator: Option<u8>,
        reason: DropReason,
    },
    WriteRejected { message: String },
    SinkFault { actuator: u8, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorSnapshot {
    /// Slot currently draining, if any.
    pub playing_slot: Option<usize>,
    /// Samples left in the draining slot.
    pub remaining: usize,
    /// Stored sample count per slot; zero means free.
    pub slot_lens: [usize; 2],
}

impl ActuatorSnapshot {
    pub fn has_pending(&self) -> bool {
        match self.playing_slot {
            Some(active) => self.slot_lens[active ^ 1] > 0,
            None => self.slot_lens.iter().any(|&len| len > 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HapticSnapshot {
    pub is_playing: bool,
    pub stop_requested: bool,
    pub suspended: bool,
    pub open_sessions: usize,
    pub authorized_sessions: usize,
    pub actuators: Vec<ActuatorSnapshot>,
}

/// Engine settings.
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "num_actuators": 1, "tick_period_ms": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    pub num_actuators: u8,
    /// Capacity of one sample slot.
    pub max_samples_per_record: usize,
    /// Playback timer period; one sample per actuator per period.
    pub tick_period_ms: u64,
    /// Consecutive all-idle ticks tolerated before the timer shuts itself off.
    pub watchdog_ticks: u32,
    pub command_timeout_ms: u64,
    pub event_capacity: usize,
    /// Upper bound for a timed vibration request.
    pub max_timeout_ms: u64,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            num_actuators: 1,
            max_samples_per_record: VIBE_OUTPUT_SAMPLE_SIZE,
            tick_period_ms: 5,
            watchdog_ticks: 10,
            command_timeout_ms: 2_000,
            event_capacity: 64,
            max_timeout_ms: 10_000,
        }
    }
}

impl HapticConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, HapticError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, HapticError> {
        let raw = std::fs::read_to_string(path).map_err(|source| HapticError::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(self) -> Result<Self, HapticError> {
        if self.num_actuators == 0 {
            return Err(HapticError::InvalidConfig {
                reason: "num_actuators must be at least 1",
            });
        }
        if self.max_samples_per_record == 0 || self.max_samples_per_record > u8::MAX as usize {
            return Err(HapticError::InvalidConfig {
                reason: "max_samples_per_record must be within 1..=255",
            });
        }
        if self.tick_period_ms == 0 {
            return Err(HapticError::InvalidConfig {
                reason: "tick_period_ms must be non-zero",
            });
        }
        Ok(self)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms)
    }
}
