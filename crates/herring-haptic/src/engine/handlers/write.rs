use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::{debug, warn};

use crate::config::engine::HapticEvent;
use crate::engine::actor::ControlActor;
use crate::engine::messages::WriteMessage;
use crate::error::HapticError;

impl Handler<WriteMessage> for ControlActor {
    fn handle(
        &mut self,
        message: WriteMessage,
        ctx: &mut ActorContext<Self>,
    ) -> Result<usize, HapticError> {
        let session = message.session;
        let Some(state) = self.sessions.get(&session) else {
            return Err(HapticError::UnknownSession { session });
        };
        if !state.authorized {
            warn!(%session, "unauthorized write");
            self.events.emit(HapticEvent::UnauthorizedWrite { session });
            return Err(HapticError::Unauthorized { session });
        }

        let was_playing = self.scheduler.is_playing();
        let report = match self.scheduler.ingest(&message.bytes) {
            Ok(report) => report,
            Err(error) => {
                warn!(%session, len = message.bytes.len(), "write rejected: {error}");
                self.events.emit(HapticEvent::WriteRejected {
                    message: error.to_string(),
                });
                return Err(error);
            },
        };
        for dropped in report.dropped {
            self.events.emit(HapticEvent::RecordDropped {
                actuator: dropped.actuator,
                reason: dropped.reason,
            });
        }

        if self.scheduler.is_playing() {
            self.ensure_ticker(ctx);
            if !was_playing {
                debug!(%session, "playback started");
                self.events.emit(HapticEvent::PlaybackStarted);
            }
        }
        Ok(message.bytes.len())
    }
}
