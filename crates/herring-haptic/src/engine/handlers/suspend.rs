use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::{debug, warn};

use crate::engine::actor::ControlActor;
use crate::engine::messages::SuspendMessage;
use crate::error::HapticError;

impl Handler<SuspendMessage> for ControlActor {
    fn handle(
        &mut self,
        _message: SuspendMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), HapticError> {
        if self.scheduler.is_playing() {
            warn!("suspend refused, still playing effects");
            return Err(HapticError::Busy);
        }
        self.suspended = true;
        debug!("suspended");
        Ok(())
    }
}
