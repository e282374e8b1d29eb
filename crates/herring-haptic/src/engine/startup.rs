use std::sync::Arc;

use herring_haptic_core::OutputSink;
use herring_runtime::thread_actor::spawn_actor_named;
use tracing::info;

use crate::config::engine::HapticConfig;
use crate::error::HapticError;
use crate::infra::event_hub::EventHub;

use crate::engine::actor::ControlActor;
use crate::engine::handle::HapticHandle;

pub(crate) fn start_haptics(sink: Box<dyn OutputSink>) -> Result<HapticHandle, HapticError> {
    start_haptics_with_config(sink, HapticConfig::default())
}

pub(crate) fn start_haptics_with_config(
    sink: Box<dyn OutputSink>,
    config: HapticConfig,
) -> Result<HapticHandle, HapticError> {
    let config = config.validate()?;
    let events = Arc::new(EventHub::new(config.event_capacity));
    let num_actuators = config.num_actuators;
    let timeout = config.command_timeout();
    let actor = ControlActor::new(sink, Arc::clone(&events), config);
    let (actor_ref, _join) = spawn_actor_named(actor, "herring-haptic-control").map_err(
        |source| HapticError::SpawnThread {
            name: "haptic control",
            source,
        },
    )?;
    info!(num_actuators, "haptic engine started");
    Ok(HapticHandle::new(actor_ref, events, num_actuators, timeout))
}
