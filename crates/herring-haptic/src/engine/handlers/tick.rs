use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::trace;

use crate::engine::actor::ControlActor;
#[cfg(test)]
use crate::engine::messages::StepMessage;
use crate::engine::messages::TickMessage;

impl Handler<TickMessage> for ControlActor {
    fn handle(&mut self, message: TickMessage, _ctx: &mut ActorContext<Self>) {
        let current = self.ticker.as_ref().map(|worker| worker.generation());
        if current != Some(message.generation) {
            trace!(generation = message.generation, "stale tick ignored");
            return;
        }
        self.run_tick();
    }
}

#[cfg(test)]
impl Handler<StepMessage> for ControlActor {
    fn handle(&mut self, _message: StepMessage, _ctx: &mut ActorContext<Self>) {
        self.run_tick();
    }
}
