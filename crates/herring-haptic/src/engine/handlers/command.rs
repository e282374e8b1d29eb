use herring_runtime::thread_actor::{ActorContext, Handler};
use tracing::{debug, info, warn};

use crate::command::{Command, CommandReply, TSPDRV_MAGIC_NUMBER};
use crate::config::engine::HapticEvent;
use crate::engine::actor::ControlActor;
use crate::engine::messages::CommandMessage;
use crate::error::HapticError;

impl Handler<CommandMessage> for ControlActor {
    fn handle(
        &mut self,
        message: CommandMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<CommandReply, HapticError> {
        let session = message.session;
        if !self.sessions.contains_key(&session) {
            return Err(HapticError::UnknownSession { session });
        }
        debug!(%session, command = message.command.name(), "command");

        match message.command {
            Command::StopKernelTimer => {
                if self.scheduler.request_stop() {
                    debug!("graceful stop requested");
                }
                Ok(CommandReply::Done)
            },
            Command::IdentifyCaller { magic } => {
                if magic != TSPDRV_MAGIC_NUMBER {
                    warn!(%session, magic, "identify with wrong magic number");
                    return Ok(CommandReply::Ignored);
                }
                if let Some(state) = self.sessions.get_mut(&session) {
                    state.authorized = true;
                }
                info!(%session, "caller identified");
                self.events.emit(HapticEvent::SessionAuthorized { session });
                Ok(CommandReply::Done)
            },
            Command::EnableAmp { actuator } => {
                self.check_actuator(actuator)?;
                if let Err(fault) = self.sink.amp_enable(actuator) {
                    self.emit_sink_faults(vec![(actuator, fault)]);
                }
                Ok(CommandReply::Done)
            },
            Command::DisableAmp { actuator } => {
                self.check_actuator(actuator)?;
                if let Err(fault) = self.sink.amp_disable(actuator) {
                    self.emit_sink_faults(vec![(actuator, fault)]);
                }
                Ok(CommandReply::Done)
            },
            Command::GetNumActuators => Ok(CommandReply::NumActuators(
                self.scheduler.num_actuators(),
            )),
        }
    }
}

impl ControlActor {
    fn check_actuator(&self, actuator: u8) -> Result<(), HapticError> {
        let num_actuators = self.scheduler.num_actuators();
        if actuator >= num_actuators {
            return Err(HapticError::InvalidActuator {
                actuator,
                num_actuators,
            });
        }
        Ok(())
    }
}
