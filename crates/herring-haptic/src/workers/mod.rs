//! Worker threads that run beside the control actor.
//!
//! The tick worker paces playback; the control actor stays the only owner
//! of the scheduler and the output sink.

pub(crate) mod ticker;
