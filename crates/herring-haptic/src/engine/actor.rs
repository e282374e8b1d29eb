use std::collections::HashMap;
use std::sync::Arc;

use herring_haptic_core::{OutputSink, SinkError};
use herring_runtime::thread_actor::{ActorContext, ActorRef};
use tracing::{debug, error, info, warn};

use crate::config::engine::{HapticConfig, HapticEvent, SessionId, StopReason};
use crate::device_info;
use crate::infra::event_hub::EventHub;
use crate::scheduler::PlaybackScheduler;
use crate::workers::ticker::{TickCallback, TickWorker};

use crate::engine::messages::TickMessage;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SessionState {
    pub(crate) authorized: bool,
}

pub(crate) struct ControlActor {
    pub(crate) events: Arc<EventHub>,
    pub(crate) config: HapticConfig,
    pub(crate) scheduler: PlaybackScheduler,
    pub(crate) sink: Box<dyn OutputSink>,
    pub(crate) sessions: HashMap<SessionId, SessionState>,
    pub(crate) next_session: u64,
    pub(crate) ticker: Option<TickWorker>,
    pub(crate) generation: u64,
    pub(crate) device_name: String,
    pub(crate) suspended: bool,
}

impl ControlActor {
    pub(crate) fn new(
        sink: Box<dyn OutputSink>,
        events: Arc<EventHub>,
        config: HapticConfig,
    ) -> Self {
        let device_name = device_info::device_name(sink.as_ref(), config.num_actuators);
        let scheduler = PlaybackScheduler::new(
            config.num_actuators,
            config.max_samples_per_record,
            config.watchdog_ticks,
        );
        Self {
            events,
            config,
            scheduler,
            sink,
            sessions: HashMap::new(),
            next_session: 0,
            ticker: None,
            generation: 0,
            device_name,
            suspended: false,
        }
    }

    pub(crate) fn emit_sink_faults(&self, faults: Vec<(u8, SinkError)>) {
        for (actuator, fault) in faults {
            warn!(actuator, "sink fault: {fault}");
            self.events.emit(HapticEvent::SinkFault {
                actuator,
                message: fault.to_string(),
            });
        }
    }

    /// Starts the playback timer if it is not running yet.
    pub(crate) fn ensure_ticker(&mut self, ctx: &ActorContext<Self>) {
        if self.ticker.is_some() {
            return;
        }
        let Some(actor_ref) = ctx.actor_ref() else {
            error!("tick worker requested outside of a handler");
            return;
        };
        self.generation += 1;
        match TickWorker::start(
            self.config.tick_period(),
            self.generation,
            tick_callback(actor_ref),
        ) {
            Ok(worker) => self.ticker = Some(worker),
            Err(error) => error!("failed to start playback timer: {error}"),
        }
    }

    pub(crate) fn stop_ticker(&mut self) {
        if let Some(worker) = self.ticker.take() {
            worker.stop();
        }
    }

    /// One timer period: drain a sample per actuator, stop the timer once
    /// the scheduler stopped itself.
    pub(crate) fn run_tick(&mut self) {
        let report = self.scheduler.tick(self.sink.as_mut());
        self.emit_sink_faults(report.faults);
        if let Some(reason) = report.stopped {
            self.stop_ticker();
            match reason {
                StopReason::Watchdog => warn!("playback watchdog fired, actuators silenced"),
                _ => debug!(?reason, "playback stopped"),
            }
            self.events.emit(HapticEvent::PlaybackStopped { reason });
        }
    }

    /// Drops every queued sample and stops the timer right away.
    pub(crate) fn hard_stop(&mut self, reason: StopReason) {
        let (was_playing, faults) = self.scheduler.stop_now(self.sink.as_mut());
        self.stop_ticker();
        self.emit_sink_faults(faults);
        if was_playing {
            info!(?reason, "playback stopped");
            self.events.emit(HapticEvent::PlaybackStopped { reason });
        }
    }
}

fn tick_callback(actor_ref: ActorRef<ControlActor>) -> TickCallback {
    Arc::new(move |generation| actor_ref.cast(TickMessage { generation }).is_ok())
}
