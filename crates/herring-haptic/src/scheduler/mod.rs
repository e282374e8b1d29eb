//! Double-buffered sample scheduler.
//!
//! Producers fill per-actuator slots through [`PlaybackScheduler::ingest`];
//! the playback timer calls [`PlaybackScheduler::tick`] once per period and
//! each call hands exactly one sample per active actuator to the sink.
//!
//! The scheduler is plain data. The control actor owns it, so ingestion and
//! draining never overlap.

mod buffer;

use herring_haptic_core::record::{DEFAULT_BIT_DEPTH, RecordReader, validate_write_len};
use herring_haptic_core::{OutputSink, RecordError, SinkError};
use tracing::{debug, warn};

use crate::config::engine::{ActuatorSnapshot, DropReason, StopReason};
use crate::error::HapticError;

use self::buffer::{ActuatorBuffer, Advance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DroppedRecord {
    pub(crate) actuator: Option<u8>,
    pub(crate) reason: DropReason,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct IngestReport {
    pub(crate) stored: usize,
    pub(crate) dropped: Vec<DroppedRecord>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct TickReport {
    pub(crate) delivered: usize,
    pub(crate) faults: Vec<(u8, SinkError)>,
    pub(crate) stopped: Option<StopReason>,
}

pub(crate) struct PlaybackScheduler {
    actuators: Vec<ActuatorBuffer>,
    slot_capacity: usize,
    is_playing: bool,
    stop_requested: bool,
    watchdog_ticks: u32,
    idle_ticks: u32,
    /// Actuators whose amp was already disabled during a graceful stop.
    amp_released: Vec<bool>,
}

impl PlaybackScheduler {
    pub(crate) fn new(num_actuators: u8, slot_capacity: usize, watchdog_ticks: u32) -> Self {
        Self {
            actuators: (0..num_actuators)
                .map(|_| ActuatorBuffer::new(slot_capacity))
                .collect(),
            slot_capacity,
            is_playing: false,
            stop_requested: false,
            watchdog_ticks,
            idle_ticks: 0,
            amp_released: vec![false; usize::from(num_actuators)],
        }
    }

    pub(crate) fn num_actuators(&self) -> u8 {
        self.actuators.len() as u8
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Stores every record of one write buffer.
    ///
    /// Records naming an unknown actuator are dropped and the rest of the
    /// buffer is still processed. A record that finds both slots of its
    /// actuator occupied fails the whole call; records stored before it stay
    /// queued but playback is not (re)started.
    pub(crate) fn ingest(&mut self, buf: &[u8]) -> Result<IngestReport, HapticError> {
        validate_write_len(buf.len(), self.actuators.len(), self.slot_capacity)?;

        let mut report = IngestReport::default();
        for item in RecordReader::new(buf) {
            let record = match item {
                Ok(record) => record,
                Err(error) => {
                    warn!("dropping write tail: {error}");
                    report.dropped.push(DroppedRecord {
                        actuator: None,
                        reason: DropReason::Truncated,
                    });
                    break;
                },
            };

            let actuator = record.actuator;
            let Some(buffer) = self.actuators.get_mut(actuator as usize) else {
                warn!(actuator, "invalid actuator index");
                report.dropped.push(DroppedRecord {
                    actuator: Some(actuator),
                    reason: DropReason::InvalidActuator,
                });
                continue;
            };
            if record.samples.is_empty() {
                debug!(actuator, "empty record ignored");
                report.dropped.push(DroppedRecord {
                    actuator: Some(actuator),
                    reason: DropReason::Empty,
                });
                continue;
            }
            if record.samples.len() > self.slot_capacity {
                warn!(
                    "{}",
                    RecordError::Oversized {
                        samples: record.samples.len(),
                        max: self.slot_capacity,
                    }
                );
                report.dropped.push(DroppedRecord {
                    actuator: Some(actuator),
                    reason: DropReason::Oversized,
                });
                continue;
            }

            let bit_depth = if record.bit_depth == DEFAULT_BIT_DEPTH {
                record.bit_depth
            } else {
                warn!(
                    actuator,
                    bit_depth = record.bit_depth,
                    "invalid bit depth, using {DEFAULT_BIT_DEPTH}"
                );
                DEFAULT_BIT_DEPTH
            };

            let Some(slot) = buffer.free_slot() else {
                warn!(actuator, "no room to store new samples");
                return Err(HapticError::NoFreeSlot { actuator });
            };
            if buffer.store(slot, bit_depth, record.samples) {
                debug!(actuator, slot, samples = record.samples.len(), "slot activated");
            }
            report.stored += 1;
        }

        if report.stored > 0 {
            self.is_playing = true;
            self.stop_requested = false;
            self.idle_ticks = 0;
        }
        Ok(report)
    }

    /// One timer period: one sample out per actuator with an active slot.
    pub(crate) fn tick(&mut self, sink: &mut dyn OutputSink) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_playing {
            return report;
        }

        let halt = self.stop_requested;
        let mut any_active = false;
        for (index, buffer) in self.actuators.iter_mut().enumerate() {
            let actuator = index as u8;
            let Some((bit_depth, sample)) = buffer.current() else {
                continue;
            };
            any_active = true;
            if let Err(error) = sink.set_sample(actuator, bit_depth, sample) {
                report.faults.push((actuator, error));
            }
            report.delivered += 1;

            if buffer.advance(halt) == Some(Advance::Drained) && halt {
                self.amp_released[index] = true;
                if let Err(error) = sink.amp_disable(actuator) {
                    report.faults.push((actuator, error));
                }
            }
        }

        if halt && self.actuators.iter().all(ActuatorBuffer::is_idle) {
            for (index, released) in self.amp_released.iter().enumerate() {
                if *released {
                    continue;
                }
                let actuator = index as u8;
                if let Err(error) = sink.amp_disable(actuator) {
                    report.faults.push((actuator, error));
                }
            }
            self.halt();
            report.stopped = Some(StopReason::Graceful);
            return report;
        }

        if any_active {
            self.idle_ticks = 0;
            return report;
        }

        self.idle_ticks += 1;
        if self.idle_ticks > self.watchdog_ticks {
            for actuator in 0..self.num_actuators() {
                if let Err(error) = sink.set_sample(actuator, DEFAULT_BIT_DEPTH, 0) {
                    report.faults.push((actuator, error));
                }
                if let Err(error) = sink.amp_disable(actuator) {
                    report.faults.push((actuator, error));
                }
            }
            self.halt();
            report.stopped = Some(StopReason::Watchdog);
        }
        report
    }

    /// Arms a graceful stop; ignored when nothing is playing.
    pub(crate) fn request_stop(&mut self) -> bool {
        if self.is_playing {
            self.stop_requested = true;
        }
        self.stop_requested
    }

    /// Drops every queued sample right away and silences actuators that were
    /// mid-playback.
    ///
    /// Returns whether playback was running.
    pub(crate) fn stop_now(&mut self, sink: &mut dyn OutputSink) -> (bool, Vec<(u8, SinkError)>) {
        let mut faults = Vec::new();
        for (index, buffer) in self.actuators.iter().enumerate() {
            if buffer.is_idle() {
                continue;
            }
            let actuator = index as u8;
            if let Err(error) = sink.set_sample(actuator, DEFAULT_BIT_DEPTH, 0) {
                faults.push((actuator, error));
            }
            if let Err(error) = sink.amp_disable(actuator) {
                faults.push((actuator, error));
            }
        }
        let was_playing = self.is_playing;
        self.halt();
        (was_playing, faults)
    }

    pub(crate) fn snapshot(&self) -> Vec<ActuatorSnapshot> {
        self.actuators.iter().map(ActuatorBuffer::snapshot).collect()
    }

    fn halt(&mut self) {
        for buffer in &mut self.actuators {
            buffer.reset();
        }
        self.is_playing = false;
        self.stop_requested = false;
        self.idle_ticks = 0;
        self.amp_released.fill(false);
    }
}

#[cfg(test)]
#[path = "../tests/scheduler/playback.rs"]
mod playback_tests;
