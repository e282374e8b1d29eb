//! Timed-output vibrator: "buzz for N milliseconds".
//!
//! A dedicated worker thread owns the motor driver and the off deadline.
//! Every request cancels the running timer before applying the new value,
//! mirroring the timed_output contract (`enable(0)` turns the motor off).

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use herring_haptic_core::SinkError;
use tracing::{debug, info, warn};

use crate::config::engine::HapticConfig;
use crate::config::pwm::PwmDuty;
use crate::error::HapticError;

/// PWM motor behind the timed vibrator.
pub trait MotorDriver: Send {
    fn on(&mut self, duty: u32, period: u32) -> Result<(), SinkError>;

    fn off(&mut self) -> Result<(), SinkError>;
}

enum TimedControl {
    Enable {
        millis: u64,
        resp_tx: Sender<()>,
    },
    Remaining {
        resp_tx: Sender<Duration>,
    },
    SetDuty {
        percent: u32,
        resp_tx: Sender<Result<(), HapticError>>,
    },
    Duty {
        resp_tx: Sender<PwmDuty>,
    },
    Shutdown {
        resp_tx: Sender<()>,
    },
}

pub struct TimedVibrator {
    ctrl_tx: Sender<TimedControl>,
    timeout: Duration,
    join: Option<JoinHandle<()>>,
}

impl TimedVibrator {
    pub fn start(
        driver: Box<dyn MotorDriver>,
        config: &HapticConfig,
    ) -> Result<Self, HapticError> {
        let (ctrl_tx, ctrl_rx) = crossbeam_channel::unbounded();
        let state = VibratorState {
            driver,
            duty: PwmDuty::default(),
            deadline: None,
            max_timeout: config.max_timeout(),
        };
        let join = std::thread::Builder::new()
            .name("herring-timed-vibrator".to_string())
            .spawn(move || vibrator_thread_main(state, ctrl_rx))
            .map_err(|source| HapticError::SpawnThread {
                name: "timed vibrator",
                source,
            })?;
        Ok(Self {
            ctrl_tx,
            timeout: config.command_timeout(),
            join: Some(join),
        })
    }

    /// Runs the motor for `millis` (capped at the configured maximum);
    /// `0` stops it.
    pub fn enable(&self, millis: u64) -> Result<(), HapticError> {
        self.call(|resp_tx| TimedControl::Enable { millis, resp_tx })
    }

    /// Time left before the motor switches itself off.
    pub fn remaining(&self) -> Result<Duration, HapticError> {
        self.call(|resp_tx| TimedControl::Remaining { resp_tx })
    }

    /// Sets the strength used by the next `enable`.
    pub fn set_duty_percent(&self, percent: u32) -> Result<(), HapticError> {
        self.call(|resp_tx| TimedControl::SetDuty { percent, resp_tx })?
    }

    pub fn duty(&self) -> Result<PwmDuty, HapticError> {
        self.call(|resp_tx| TimedControl::Duty { resp_tx })
    }

    pub fn shutdown(mut self) -> Result<(), HapticError> {
        let result = self.call(|resp_tx| TimedControl::Shutdown { resp_tx });
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
        result
    }

    fn call<T>(
        &self,
        constructor: impl FnOnce(Sender<T>) -> TimedControl,
    ) -> Result<T, HapticError> {
        let (resp_tx, resp_rx) = crossbeam_channel::bounded(1);
        self.ctrl_tx
            .send(constructor(resp_tx))
            .map_err(|_| HapticError::VibratorExited)?;
        resp_rx
            .recv_timeout(self.timeout)
            .map_err(|error| match error {
                RecvTimeoutError::Timeout => HapticError::ControlCommandTimedOut {
                    operation: "timed_vibrator",
                    timeout_ms: self.timeout.as_millis(),
                },
                RecvTimeoutError::Disconnected => HapticError::VibratorExited,
            })
    }
}

impl Drop for TimedVibrator {
    fn drop(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let (resp_tx, resp_rx) = crossbeam_channel::bounded(1);
        let _ = self.ctrl_tx.send(TimedControl::Shutdown { resp_tx });
        let _ = resp_rx.recv_timeout(Duration::from_millis(100));
        let _ = join.join();
    }
}

struct VibratorState {
    driver: Box<dyn MotorDriver>,
    duty: PwmDuty,
    deadline: Option<Instant>,
    max_timeout: Duration,
}

impl VibratorState {
    fn enable(&mut self, millis: u64) {
        self.deadline = None;
        if millis == 0 {
            self.motor_off();
            return;
        }

        let requested = Duration::from_millis(millis);
        let run_for = requested.min(self.max_timeout);
        if run_for < requested {
            debug!(
                requested_ms = millis,
                capped_ms = run_for.as_millis() as u64,
                "vibration request capped"
            );
        }
        if let Err(error) = self.driver.on(self.duty.duty(), self.duty.period()) {
            warn!("vibrator enable failed: {error}");
        }
        self.deadline = Some(Instant::now() + run_for);
    }

    fn remaining(&self) -> Duration {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    fn motor_off(&mut self) {
        self.deadline = None;
        if let Err(error) = self.driver.off() {
            warn!("vibrator disable failed: {error}");
        }
    }
}

fn vibrator_thread_main(mut state: VibratorState, ctrl_rx: Receiver<TimedControl>) {
    info!("timed vibrator started");
    loop {
        let control = match state.deadline {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match ctrl_rx.recv_timeout(wait) {
                    Ok(control) => control,
                    Err(RecvTimeoutError::Timeout) => {
                        debug!("vibration timeout elapsed");
                        state.motor_off();
                        continue;
                    },
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            },
            None => match ctrl_rx.recv() {
                Ok(control) => control,
                Err(_) => break,
            },
        };

        match control {
            TimedControl::Enable { millis, resp_tx } => {
                state.enable(millis);
                let _ = resp_tx.send(());
            },
            TimedControl::Remaining { resp_tx } => {
                let _ = resp_tx.send(state.remaining());
            },
            TimedControl::SetDuty { percent, resp_tx } => {
                let result = PwmDuty::from_percent(percent).map(|duty| {
                    state.duty = duty;
                });
                let _ = resp_tx.send(result);
            },
            TimedControl::Duty { resp_tx } => {
                let _ = resp_tx.send(state.duty);
            },
            TimedControl::Shutdown { resp_tx } => {
                state.motor_off();
                let _ = resp_tx.send(());
                break;
            },
        }
    }
    info!("timed vibrator exited");
}

#[cfg(test)]
#[path = "../tests/timed/vibrator.rs"]
mod vibrator_tests;
