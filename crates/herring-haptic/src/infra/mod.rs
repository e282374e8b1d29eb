//! Internal infrastructure shared by the engine and its workers.
//!
//! Nothing in here is part of the public API of `herring-haptic`.

pub(crate) mod event_hub;
