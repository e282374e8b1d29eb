//! Touch-key controller driver logic.
//!
//! [`TouchkeyController`] decodes interrupt reports into key events, runs
//! the power-cycle recovery when the controller glitches and tracks the
//! backlight. [`TouchkeyService`] runs a controller on its own thread and
//! owns the delayed backlight-off timer.

pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod report;
pub mod service;
#[cfg(test)]
pub(crate) mod testing;
mod timer;

pub use bus::TouchkeyBus;
pub use config::{KeyMode, TouchkeyConfig};
pub use controller::{KeyEvent, TouchkeyController, TouchkeyState};
pub use error::{BusError, TouchkeyError};
pub use service::TouchkeyService;
