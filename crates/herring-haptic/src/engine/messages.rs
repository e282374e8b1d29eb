use herring_runtime::thread_actor::Message;

use crate::command::{Command, CommandReply};
use crate::config::engine::{HapticSnapshot, SessionId};
use crate::error::HapticError;

pub(crate) struct OpenSessionMessage;

impl Message for OpenSessionMessage {
    type Response = SessionId;
}

pub(crate) struct ReleaseSessionMessage {
    pub(crate) session: SessionId,
}

impl Message for ReleaseSessionMessage {
    type Response = ();
}

pub(crate) struct WriteMessage {
    pub(crate) session: SessionId,
    pub(crate) bytes: Vec<u8>,
}

impl Message for WriteMessage {
    type Response = Result<usize, HapticError>;
}

pub(crate) struct CommandMessage {
    pub(crate) session: SessionId,
    pub(crate) command: Command,
}

impl Message for CommandMessage {
    type Response = Result<CommandReply, HapticError>;
}

/// Posted by the tick worker once per period.
pub(crate) struct TickMessage {
    pub(crate) generation: u64,
}

impl Message for TickMessage {
    type Response = ();
}

pub(crate) struct ReadDeviceNameMessage {
    pub(crate) offset: usize,
    pub(crate) max: usize,
}

impl Message for ReadDeviceNameMessage {
    type Response = Vec<u8>;
}

pub(crate) struct SuspendMessage;

impl Message for SuspendMessage {
    type Response = Result<(), HapticError>;
}

pub(crate) struct ResumeMessage;

impl Message for ResumeMessage {
    type Response = ();
}

pub(crate) struct GetSnapshotMessage;

impl Message for GetSnapshotMessage {
    type Response = HapticSnapshot;
}

pub(crate) struct ShutdownMessage;

impl Message for ShutdownMessage {
    type Response = ();
}

/// Runs one timer period regardless of the tick worker.
#[cfg(test)]
pub(crate) struct StepMessage;

#[cfg(test)]
impl Message for StepMessage {
    type Response = ();
}
