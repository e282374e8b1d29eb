use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::debug;

use crate::config::engine::StopReason;
use crate::engine::actor::ControlActor;
use crate::engine::messages::ReleaseSessionMessage;

impl Handler<ReleaseSessionMessage> for ControlActor {
    fn handle(&mut self, message: ReleaseSessionMessage, _ctx: &mut ActorContext<Self>) {
        if self.sessions.remove(&message.session).is_none() {
            return;
        }
        debug!(session = %message.session, "session released");
        self.hard_stop(StopReason::Released);
    }
}
