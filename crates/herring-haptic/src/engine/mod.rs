mod actor;
mod handle;
mod handlers;
mod messages;
mod startup;

pub use handle::{HapticHandle, HapticSession};

use herring_haptic_core::OutputSink;

use crate::config::engine::HapticConfig;
use crate::error::HapticError;

/// Starts the engine with default settings.
pub fn start_haptics(sink: Box<dyn OutputSink>) -> Result<HapticHandle, HapticError> {
    startup::start_haptics(sink)
}

pub fn start_haptics_with_config(
    sink: Box<dyn OutputSink>,
    config: HapticConfig,
) -> Result<HapticHandle, HapticError> {
    startup::start_haptics_with_config(sink, config)
}
