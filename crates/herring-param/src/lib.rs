//! Small integer parameter store (USB switch selection, debug level, reboot
//! mode) with JSON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const REBOOT_MODE_NONE: i32 = 0;

/// USB_SAMSUNG_KIES_MASK | USB_SEL_MASK
pub const DEFAULT_SWITCH_SEL: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamIndex {
    SwitchSel,
    PhoneDebugOn,
    RebootMode,
}

impl ParamIndex {
    pub const fn raw(self) -> i32 {
        match self {
            Self::SwitchSel => 4,
            Self::PhoneDebugOn => 5,
            Self::RebootMode => 9,
        }
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            4 => Some(Self::SwitchSel),
            5 => Some(Self::PhoneDebugOn),
            9 => Some(Self::RebootMode),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("unknown parameter index {index}")]
    UnknownIndex { index: i32 },
    #[error("failed to access parameter file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed parameter file: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamStore {
    pub switch_sel: i32,
    pub debug_level: i32,
    pub reboot_mode: i32,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self {
            switch_sel: DEFAULT_SWITCH_SEL,
            debug_level: 0,
            reboot_mode: REBOOT_MODE_NONE,
        }
    }
}

impl ParamStore {
    pub fn get(&self, index: ParamIndex) -> i32 {
        match index {
            ParamIndex::SwitchSel => self.switch_sel,
            ParamIndex::PhoneDebugOn => self.debug_level,
            ParamIndex::RebootMode => self.reboot_mode,
        }
    }

    pub fn set(&mut self, index: ParamIndex, value: i32) {
        debug!(?index, value, "param set");
        let slot = match index {
            ParamIndex::SwitchSel => &mut self.switch_sel,
            ParamIndex::PhoneDebugOn => &mut self.debug_level,
            ParamIndex::RebootMode => &mut self.reboot_mode,
        };
        *slot = value;
    }

    /// Lookup by numeric index; unknown indices are logged and yield `None`.
    pub fn get_raw(&self, index: i32) -> Option<i32> {
        let Some(param) = ParamIndex::from_raw(index) else {
            warn!(index, "get: unknown param index");
            return None;
        };
        Some(self.get(param))
    }

    pub fn set_raw(&mut self, index: i32, value: i32) -> Result<(), ParamError> {
        let Some(param) = ParamIndex::from_raw(index) else {
            warn!(index, "set: unknown param index");
            return Err(ParamError::UnknownIndex { index });
        };
        self.set(param, value);
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ParamError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_string(&self) -> Result<String, ParamError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads the store; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ParamError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no parameter file, using defaults");
                Ok(Self::default())
            },
            Err(source) => Err(ParamError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ParamError> {
        let raw = self.to_json_string()?;
        std::fs::write(path, raw).map_err(|source| ParamError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
