use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::debug;

use crate::config::engine::SessionId;
use crate::engine::actor::{ControlActor, SessionState};
use crate::engine::messages::OpenSessionMessage;

impl Handler<OpenSessionMessage> for ControlActor {
    fn handle(
        &mut self,
        _message: OpenSessionMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> SessionId {
        self.next_session += 1;
        let session = SessionId(self.next_session);
        self.sessions.insert(session, SessionState::default());
        debug!(%session, "session opened");
        session
    }
}
