#![deny(clippy::wildcard_imports)]

//! TouchSense haptic playback.
//!
//! A haptic service opens a [`HapticSession`], identifies itself with
//! [`command::TSPDRV_MAGIC_NUMBER`] and writes sample records; a periodic
//! timer hands one sample per actuator per period to the [`OutputSink`].
//! [`TimedVibrator`] covers the simpler "vibrate for N ms" motors.
//!
//! [`OutputSink`]: herring_haptic_core::OutputSink

pub mod command;
pub mod config;
mod device_info;
pub mod engine;
pub mod error;
mod infra;
mod scheduler;
pub mod timed;
mod workers;

pub use command::{Command, CommandReply};
pub use config::engine::{HapticConfig, HapticEvent, HapticSnapshot, SessionId, StopReason};
pub use engine::{HapticHandle, HapticSession, start_haptics, start_haptics_with_config};
pub use error::HapticError;
pub use timed::{MotorDriver, TimedVibrator};
