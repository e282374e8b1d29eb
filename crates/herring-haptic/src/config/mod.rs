//! Runtime configuration and event models.
//!
//! This module contains the settings a board integration hands to the engine
//! and the event/snapshot payloads it reports back.

/// Engine settings, events and snapshots.
pub mod engine;
/// PWM duty model for the timed vibrator.
pub mod pwm;
