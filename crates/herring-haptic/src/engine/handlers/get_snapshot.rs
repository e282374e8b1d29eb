use herring_runtime::thread_actor::{ActorContext, Handler};

use crate::config::engine::HapticSnapshot;
use crate::engine::actor::ControlActor;
use crate::engine::messages::GetSnapshotMessage;

impl Handler<GetSnapshotMessage> for ControlActor {
    fn handle(
        &mut self,
        _message: GetSnapshotMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> HapticSnapshot {
        HapticSnapshot {
            is_playing: self.scheduler.is_playing(),
            stop_requested: self.scheduler.stop_requested(),
            suspended: self.suspended,
            open_sessions: self.sessions.len(),
            authorized_sessions: self
                .sessions
                .values()
                .filter(|state| state.authorized)
                .count(),
            actuators: self.scheduler.snapshot(),
        }
    }
}
