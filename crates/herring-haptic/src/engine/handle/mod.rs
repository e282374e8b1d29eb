use std::sync::Arc;
use std::time::Duration;

use herring_runtime::thread_actor::{ActorRef, CallError};
use tokio::sync::broadcast;

use crate::config::engine::{HapticEvent, HapticSnapshot};
use crate::engine::actor::ControlActor;
use crate::engine::messages::{
    GetSnapshotMessage, OpenSessionMessage, ResumeMessage, ShutdownMessage, SuspendMessage,
};
use crate::error::HapticError;

mod session;

pub use session::HapticSession;

/// Entry point for services talking to the haptic engine.
///
/// Cheap to clone; every clone talks to the same control actor.
#[derive(Clone)]
pub struct HapticHandle {
    actor_ref: ActorRef<ControlActor>,
    events: Arc<crate::infra::event_hub::EventHub>,
    num_actuators: u8,
    timeout: Duration,
}

impl HapticHandle {
    pub(crate) fn new(
        actor_ref: ActorRef<ControlActor>,
        events: Arc<crate::infra::event_hub::EventHub>,
        num_actuators: u8,
        timeout: Duration,
    ) -> Self {
        Self {
            actor_ref,
            events,
            num_actuators,
            timeout,
        }
    }

    pub(crate) fn map_call_error(
        operation: &'static str,
        timeout: Duration,
        err: CallError,
    ) -> HapticError {
        HapticError::from_call_error(operation, timeout, err)
    }

    /// Opens a control session. It may write samples once it identified
    /// itself with the service magic number.
    pub async fn open_session(&self) -> Result<HapticSession, HapticError> {
        let id = self
            .actor_ref
            .call_async(OpenSessionMessage, self.timeout)
            .await
            .map_err(|error| Self::map_call_error("open_session", self.timeout, error))?;
        Ok(HapticSession::new(id, self.actor_ref.clone(), self.timeout))
    }

    pub async fn snapshot(&self) -> Result<HapticSnapshot, HapticError> {
        self.actor_ref
            .call_async(GetSnapshotMessage, self.timeout)
            .await
            .map_err(|error| Self::map_call_error("get_snapshot", self.timeout, error))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<HapticEvent> {
        self.events.subscribe()
    }

    /// Refused with [`HapticError::Busy`] while effects are playing.
    pub async fn suspend(&self) -> Result<(), HapticError> {
        self.actor_ref
            .call_async(SuspendMessage, self.timeout)
            .await
            .map_err(|error| Self::map_call_error("suspend", self.timeout, error))?
    }

    pub async fn resume(&self) -> Result<(), HapticError> {
        self.actor_ref
            .call_async(ResumeMessage, self.timeout)
            .await
            .map_err(|error| Self::map_call_error("resume", self.timeout, error))
    }

    /// Silences every actuator and stops the control actor.
    pub async fn shutdown(&self) -> Result<(), HapticError> {
        self.actor_ref
            .call_async(ShutdownMessage, self.timeout)
            .await
            .map_err(|error| Self::map_call_error("shutdown", self.timeout, error))
    }

    pub fn num_actuators(&self) -> u8 {
        self.num_actuators
    }
}
