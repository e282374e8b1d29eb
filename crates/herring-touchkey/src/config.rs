use std::time::Duration;

use serde::Deserialize;

use crate::bus::RetryPolicy;
use crate::error::TouchkeyError;

pub const KEY_OFF_DELAY_MAX_MS: u64 = 1_000;

/// How the report byte encodes keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// Low bits carry a 1-based scancode, bit 3 flags a release.
    #[default]
    Scancode,
    /// One bit per key, set while pressed.
    Bitmask,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TouchkeyConfig {
    /// Key codes indexed by scancode.
    pub keycodes: Vec<u16>,
    pub key_mode: KeyMode,
    /// Backlight-off delay after a release while the backlight is off.
    pub key_off_delay_ms: u64,
    pub bus_retries: u32,
    pub retry_delay_ms: u64,
    pub recovery_attempts: u32,
    pub command_timeout_ms: u64,
}

impl Default for TouchkeyConfig {
    fn default() -> Self {
        Self {
            // menu, home, back, search
            keycodes: vec![139, 102, 158, 217],
            key_mode: KeyMode::Scancode,
            key_off_delay_ms: 750,
            bus_retries: 2,
            retry_delay_ms: 10,
            recovery_attempts: 10,
            command_timeout_ms: 2_000,
        }
    }
}

impl TouchkeyConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, TouchkeyError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, TouchkeyError> {
        if self.keycodes.is_empty() {
            return Err(TouchkeyError::InvalidConfig {
                reason: "keycodes must not be empty",
            });
        }
        if self.key_mode == KeyMode::Bitmask && self.keycodes.len() > 8 {
            return Err(TouchkeyError::InvalidConfig {
                reason: "bitmask reports carry at most 8 keys",
            });
        }
        if self.key_off_delay_ms > KEY_OFF_DELAY_MAX_MS {
            return Err(TouchkeyError::DelayOutOfRange {
                millis: self.key_off_delay_ms,
                max: KEY_OFF_DELAY_MAX_MS,
            });
        }
        Ok(self)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.bus_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
