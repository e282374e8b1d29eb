//! Playback timer thread.
//!
//! The worker only paces; it never touches the scheduler. Each period it
//! reports its generation through the callback and the control actor does the
//! draining, so ingestion and draining stay on one thread.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace};

use crate::error::HapticError;

/// Called once per period with the worker generation; returning `false`
/// ends the worker.
pub(crate) type TickCallback = Arc<dyn Fn(u64) -> bool + Send + Sync + 'static>;

pub(crate) struct TickWorker {
    generation: u64,
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl TickWorker {
    pub(crate) fn start(
        period: Duration,
        generation: u64,
        callback: TickCallback,
    ) -> Result<Self, HapticError> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let join = std::thread::Builder::new()
            .name("herring-haptic-tick".to_string())
            .spawn(move || tick_thread_main(period, generation, stop_rx, callback))
            .map_err(|source| HapticError::SpawnThread {
                name: "tick worker",
                source,
            })?;
        debug!(generation, period_ms = period.as_millis() as u64, "tick worker started");
        Ok(Self {
            generation,
            stop_tx: Some(stop_tx),
            join: Some(join),
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        // Disconnecting the stop channel ends the select loop.
        self.stop_tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
            debug!(generation = self.generation, "tick worker stopped");
        }
    }
}

impl Drop for TickWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn tick_thread_main(
    period: Duration,
    generation: u64,
    stop_rx: Receiver<()>,
    callback: TickCallback,
) {
    let ticker = crossbeam_channel::tick(period);
    loop {
        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                trace!(generation, "tick");
                if !callback(generation) {
                    break;
                }
            },
        }
    }
}
