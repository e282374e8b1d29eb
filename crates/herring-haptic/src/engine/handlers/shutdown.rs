use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::info;

use crate::config::engine::StopReason;
use crate::engine::actor::ControlActor;
use crate::engine::messages::ShutdownMessage;

impl Handler<ShutdownMessage> for ControlActor {
    fn handle(&mut self, _message: ShutdownMessage, ctx: &mut ActorContext<Self>) {
        self.hard_stop(StopReason::Shutdown);
        self.sessions.clear();
        info!("haptic engine shut down");
        ctx.stop();
    }
}
