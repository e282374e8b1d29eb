//! Touch-key controller running on its own actor thread.
//!
//! Interrupts, backlight requests and the delayed backlight-off all go
//! through one mailbox, so they never interleave.

use std::thread::JoinHandle;
use std::time::Duration;

use herring_runtime::thread_actor::{ActorContext, ActorRef, Handler, Message, spawn_actor_named};
use tracing::{debug, error};

use crate::bus::TouchkeyBus;
use crate::config::TouchkeyConfig;
use crate::controller::{KeyEvent, TouchkeyController, TouchkeyState};
use crate::error::TouchkeyError;
use crate::timer::KeyOffTimer;

pub(crate) struct TouchkeyActor {
    controller: TouchkeyController<Box<dyn TouchkeyBus>>,
    key_off_generation: u64,
    key_off_timer: Option<KeyOffTimer>,
}

impl TouchkeyActor {
    fn arm_key_off(&mut self, ctx: &ActorContext<Self>) {
        if self.key_off_timer.is_none() {
            let Some(actor_ref) = ctx.actor_ref() else {
                return;
            };
            let callback = Box::new(move |generation: u64| {
                actor_ref.cast(KeyOffElapsedMessage { generation }).is_ok()
            });
            match KeyOffTimer::start(callback) {
                Ok(timer) => self.key_off_timer = Some(timer),
                Err(error) => {
                    error!("failed to arm key-off timer: {error}");
                    return;
                },
            }
        }
        self.key_off_generation += 1;
        let delay = Duration::from_millis(self.controller.key_off_delay_ms());
        if let Some(timer) = &self.key_off_timer {
            timer.arm(self.key_off_generation, delay);
        }
    }

    fn cancel_key_off(&mut self) {
        self.key_off_generation += 1;
        if let Some(timer) = &self.key_off_timer {
            timer.cancel();
        }
    }
}

struct InterruptMessage;

impl Message for InterruptMessage {
    type Response = Result<Vec<KeyEvent>, TouchkeyError>;
}

impl Handler<InterruptMessage> for TouchkeyActor {
    fn handle(
        &mut self,
        _message: InterruptMessage,
        ctx: &mut ActorContext<Self>,
    ) -> Result<Vec<KeyEvent>, TouchkeyError> {
        let result = self.controller.handle_interrupt();
        if self.controller.take_key_off_request() {
            // A newer release restarts the delay.
            self.arm_key_off(ctx);
        }
        let events = self.controller.take_events();
        result.map(|()| events)
    }
}

struct KeyOffElapsedMessage {
    generation: u64,
}

impl Message for KeyOffElapsedMessage {
    type Response = ();
}

impl Handler<KeyOffElapsedMessage> for TouchkeyActor {
    fn handle(&mut self, message: KeyOffElapsedMessage, _ctx: &mut ActorContext<Self>) {
        if message.generation != self.key_off_generation {
            debug!(generation = message.generation, "stale key-off timer");
            return;
        }
        self.controller.key_off_elapsed();
    }
}

struct SetBacklightMessage {
    on: bool,
}

impl Message for SetBacklightMessage {
    type Response = ();
}

impl Handler<SetBacklightMessage> for TouchkeyActor {
    fn handle(&mut self, message: SetBacklightMessage, _ctx: &mut ActorContext<Self>) {
        self.controller.set_backlight(message.on);
    }
}

struct SetBacklightDisabledMessage {
    disabled: bool,
}

impl Message for SetBacklightDisabledMessage {
    type Response = ();
}

impl Handler<SetBacklightDisabledMessage> for TouchkeyActor {
    fn handle(&mut self, message: SetBacklightDisabledMessage, _ctx: &mut ActorContext<Self>) {
        self.controller.set_backlight_disabled(message.disabled);
    }
}

struct SetKeyOffDelayMessage {
    millis: u64,
}

impl Message for SetKeyOffDelayMessage {
    type Response = Result<(), TouchkeyError>;
}

impl Handler<SetKeyOffDelayMessage> for TouchkeyActor {
    fn handle(
        &mut self,
        message: SetKeyOffDelayMessage,
        _ctx: &mut ActorContext<Self>,
    ) -> Result<(), TouchkeyError> {
        self.controller.set_key_off_delay_ms(message.millis)
    }
}

struct SetPowerMessage {
    on: bool,
}

impl Message for SetPowerMessage {
    type Response = Vec<KeyEvent>;
}

impl Handler<SetPowerMessage> for TouchkeyActor {
    fn handle(&mut self, message: SetPowerMessage, _ctx: &mut ActorContext<Self>) -> Vec<KeyEvent> {
        if message.on {
            self.controller.power_on();
        } else {
            self.cancel_key_off();
            self.controller.power_off();
        }
        self.controller.take_events()
    }
}

struct GetStateMessage;

impl Message for GetStateMessage {
    type Response = TouchkeyState;
}

impl Handler<GetStateMessage> for TouchkeyActor {
    fn handle(&mut self, _message: GetStateMessage, _ctx: &mut ActorContext<Self>) -> TouchkeyState {
        self.controller.state()
    }
}

struct ShutdownMessage;

impl Message for ShutdownMessage {
    type Response = ();
}

impl Handler<ShutdownMessage> for TouchkeyActor {
    fn handle(&mut self, _message: ShutdownMessage, ctx: &mut ActorContext<Self>) {
        self.cancel_key_off();
        self.key_off_timer = None;
        ctx.stop();
    }
}

/// Blocking handle to a touch-key controller thread.
pub struct TouchkeyService {
    actor_ref: ActorRef<TouchkeyActor>,
    join: Option<JoinHandle<()>>,
    timeout: Duration,
}

impl TouchkeyService {
    pub fn start(
        bus: Box<dyn TouchkeyBus>,
        config: TouchkeyConfig,
    ) -> Result<Self, TouchkeyError> {
        let config = config.validate()?;
        let actor = TouchkeyActor {
            controller: TouchkeyController::new(bus, &config),
            key_off_generation: 0,
            key_off_timer: None,
        };
        let (actor_ref, join) = spawn_actor_named(actor, "herring-touchkey").map_err(
            |source| TouchkeyError::SpawnThread {
                name: "touchkey",
                source,
            },
        )?;
        Ok(Self {
            actor_ref,
            join: Some(join),
            timeout: config.command_timeout(),
        })
    }

    fn call<M>(&self, operation: &'static str, message: M) -> Result<M::Response, TouchkeyError>
    where
        M: Message,
        TouchkeyActor: Handler<M>,
    {
        self.actor_ref
            .call(message, self.timeout)
            .map_err(|error| TouchkeyError::from_call_error(operation, self.timeout, error))
    }

    /// Services one controller interrupt and returns the key events it
    /// produced.
    pub fn interrupt(&self) -> Result<Vec<KeyEvent>, TouchkeyError> {
        self.call("interrupt", InterruptMessage)?
    }

    pub fn set_backlight(&self, on: bool) -> Result<(), TouchkeyError> {
        self.call("set_backlight", SetBacklightMessage { on })
    }

    pub fn set_backlight_disabled(&self, disabled: bool) -> Result<(), TouchkeyError> {
        self.call(
            "set_backlight_disabled",
            SetBacklightDisabledMessage { disabled },
        )
    }

    pub fn set_key_off_delay_ms(&self, millis: u64) -> Result<(), TouchkeyError> {
        self.call("set_key_off_delay", SetKeyOffDelayMessage { millis })?
    }

    /// Powers the controller down; returns the key-up events it forced.
    pub fn power_off(&self) -> Result<Vec<KeyEvent>, TouchkeyError> {
        self.call("power_off", SetPowerMessage { on: false })
    }

    pub fn power_on(&self) -> Result<(), TouchkeyError> {
        self.call("power_on", SetPowerMessage { on: true }).map(|_| ())
    }

    pub fn state(&self) -> Result<TouchkeyState, TouchkeyError> {
        self.call("get_state", GetStateMessage)
    }

    pub fn shutdown(mut self) -> Result<(), TouchkeyError> {
        let result = self.call("shutdown", ShutdownMessage);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
        result
    }
}

impl Drop for TouchkeyService {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.actor_ref.cast(ShutdownMessage);
            let _ = join.join();
        }
    }
}

#[cfg(test)]
#[path = "tests/service.rs"]
mod service_tests;
