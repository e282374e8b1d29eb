use std::time::Duration;

use herring_runtime::thread_actor::ActorRef;
use tracing::debug;

use crate::command::{Command, CommandReply};
use crate::config::engine::SessionId;
use crate::engine::actor::ControlActor;
use crate::engine::handle::HapticHandle;
use crate::engine::messages::{
    CommandMessage, ReadDeviceNameMessage, ReleaseSessionMessage, WriteMessage,
};
use crate::error::HapticError;

/// One open control session, the equivalent of an open device node.
///
/// Dropping the session releases it, which stops playback immediately.
pub struct HapticSession {
    id: SessionId,
    actor_ref: ActorRef<ControlActor>,
    timeout: Duration,
    released: bool,
}

impl HapticSession {
    pub(crate) fn new(id: SessionId, actor_ref: ActorRef<ControlActor>, timeout: Duration) -> Self {
        Self {
            id,
            actor_ref,
            timeout,
            released: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Authorizes this session for writes when `magic` matches.
    pub async fn identify(&self, magic: u32) -> Result<CommandReply, HapticError> {
        self.command(Command::IdentifyCaller { magic }).await
    }

    /// Queues one write buffer of sample records; returns the bytes consumed.
    pub async fn write(&self, bytes: &[u8]) -> Result<usize, HapticError> {
        self.actor_ref
            .call_async(
                WriteMessage {
                    session: self.id,
                    bytes: bytes.to_vec(),
                },
                self.timeout,
            )
            .await
            .map_err(|error| HapticHandle::map_call_error("write", self.timeout, error))?
    }

    pub async fn command(&self, command: Command) -> Result<CommandReply, HapticError> {
        self.actor_ref
            .call_async(
                CommandMessage {
                    session: self.id,
                    command,
                },
                self.timeout,
            )
            .await
            .map_err(|error| HapticHandle::map_call_error(command.name(), self.timeout, error))?
    }

    /// Raw ioctl entry; unknown request codes are ignored.
    pub async fn ioctl(&self, cmd: u32, arg: u64) -> Result<CommandReply, HapticError> {
        match Command::from_raw(cmd, arg) {
            Some(command) => self.command(command).await,
            None => {
                debug!(session = %self.id, cmd, "unknown ioctl ignored");
                Ok(CommandReply::Ignored)
            },
        }
    }

    /// Reads the device name text at `offset`.
    pub async fn read(&self, offset: usize, max: usize) -> Result<Vec<u8>, HapticError> {
        self.actor_ref
            .call_async(ReadDeviceNameMessage { offset, max }, self.timeout)
            .await
            .map_err(|error| HapticHandle::map_call_error("read_device_name", self.timeout, error))
    }

    /// Closes the session; playback stops and the authorization is gone.
    pub async fn release(mut self) -> Result<(), HapticError> {
        self.released = true;
        self.actor_ref
            .call_async(ReleaseSessionMessage { session: self.id }, self.timeout)
            .await
            .map_err(|error| HapticHandle::map_call_error("release_session", self.timeout, error))
    }
}

impl Drop for HapticSession {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.actor_ref.cast(ReleaseSessionMessage { session: self.id });
        }
    }
}
