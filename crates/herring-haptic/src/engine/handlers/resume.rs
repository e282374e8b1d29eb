use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::debug;

use crate::engine::actor::ControlActor;
use crate::engine::messages::ResumeMessage;

impl Handler<ResumeMessage> for ControlActor {
    fn handle(&mut self, _message: ResumeMessage, _ctx: &mut ActorContext<Self>) {
        self.suspended = false;
        debug!("resumed");
    }
}
