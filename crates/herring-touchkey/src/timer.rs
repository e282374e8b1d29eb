//! Delayed backlight-off timer thread.
//!
//! One thread lives as long as the service. Arming replaces any pending
//! deadline; expiry reports the generation it was armed with, and the
//! service drops expiries from an older generation.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, trace};

use crate::error::TouchkeyError;

/// Called with the armed generation on expiry; returning `false` ends the
/// worker.
pub(crate) type ExpiryCallback = Box<dyn Fn(u64) -> bool + Send + 'static>;

enum TimerRequest {
    Arm { generation: u64, delay: Duration },
    Cancel,
}

pub(crate) struct KeyOffTimer {
    request_tx: Option<Sender<TimerRequest>>,
    join: Option<JoinHandle<()>>,
}

impl KeyOffTimer {
    pub(crate) fn start(callback: ExpiryCallback) -> Result<Self, TouchkeyError> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let join = std::thread::Builder::new()
            .name("herring-touchkey-key-off".to_string())
            .spawn(move || timer_thread_main(request_rx, callback))
            .map_err(|source| TouchkeyError::SpawnThread {
                name: "key-off timer",
                source,
            })?;
        Ok(Self {
            request_tx: Some(request_tx),
            join: Some(join),
        })
    }

    pub(crate) fn arm(&self, generation: u64, delay: Duration) {
        self.send(TimerRequest::Arm { generation, delay });
    }

    pub(crate) fn cancel(&self) {
        self.send(TimerRequest::Cancel);
    }

    fn send(&self, request: TimerRequest) {
        if let Some(request_tx) = &self.request_tx {
            let _ = request_tx.send(request);
        }
    }

    fn stop_and_join(&mut self) {
        // Disconnecting the request channel ends the loop.
        self.request_tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
            debug!("key-off timer stopped");
        }
    }
}

impl Drop for KeyOffTimer {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn timer_thread_main(request_rx: Receiver<TimerRequest>, callback: ExpiryCallback) {
    let mut armed: Option<(u64, Instant)> = None;
    loop {
        let request = match armed {
            Some((generation, deadline)) => {
                let expiry = crossbeam_channel::at(deadline);
                crossbeam_channel::select! {
                    recv(request_rx) -> request => request,
                    recv(expiry) -> _ => {
                        armed = None;
                        trace!(generation, "key-off timer fired");
                        if !callback(generation) {
                            break;
                        }
                        continue;
                    },
                }
            },
            None => request_rx.recv(),
        };
        match request {
            Ok(TimerRequest::Arm { generation, delay }) => {
                armed = Some((generation, Instant::now() + delay));
            },
            Ok(TimerRequest::Cancel) => armed = None,
            Err(_) => break,
        }
    }
}
