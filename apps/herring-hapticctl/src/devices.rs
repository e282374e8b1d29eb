//! Stand-in hardware for running the drivers from a shell: every call is
//! reported through tracing instead of touching a register.

use std::collections::VecDeque;

use herring_haptic::MotorDriver;
use herring_haptic_core::{OutputSink, SinkError};
use herring_touchkey::{BusError, TouchkeyBus};
use tracing::{debug, info};

pub struct LogSink {
    num_actuators: u8,
}

impl LogSink {
    pub fn new(num_actuators: u8) -> Self {
        Self { num_actuators }
    }

    fn check(&self, actuator: u8) -> Result<(), SinkError> {
        if actuator < self.num_actuators {
            Ok(())
        } else {
            Err(SinkError::UnknownActuator { actuator })
        }
    }
}

impl OutputSink for LogSink {
    fn set_sample(&mut self, actuator: u8, bit_depth: u8, sample: i8) -> Result<(), SinkError> {
        self.check(actuator)?;
        debug!(actuator, bit_depth, sample, "set sample");
        Ok(())
    }

    fn amp_enable(&mut self, actuator: u8) -> Result<(), SinkError> {
        self.check(actuator)?;
        info!(actuator, "amp enabled");
        Ok(())
    }

    fn amp_disable(&mut self, actuator: u8) -> Result<(), SinkError> {
        self.check(actuator)?;
        info!(actuator, "amp disabled");
        Ok(())
    }

    fn device_name(&self, actuator: u8) -> String {
        format!("LogActuator{actuator}")
    }
}

pub struct LogMotor;

impl MotorDriver for LogMotor {
    fn on(&mut self, duty: u32, period: u32) -> Result<(), SinkError> {
        info!(duty, period, "motor on");
        Ok(())
    }

    fn off(&mut self) -> Result<(), SinkError> {
        info!("motor off");
        Ok(())
    }
}

/// Replays a fixed list of report bytes; reads past the end fail.
pub struct ScriptedBus {
    reports: VecDeque<u8>,
    powered: bool,
}

impl ScriptedBus {
    pub fn new(reports: impl IntoIterator<Item = u8>) -> Self {
        Self {
            reports: reports.into_iter().collect(),
            powered: true,
        }
    }
}

impl TouchkeyBus for ScriptedBus {
    fn read_byte(&mut self) -> Result<u8, BusError> {
        if !self.powered {
            return Err(BusError::Other("controller is powered off".to_string()));
        }
        self.reports.pop_front().ok_or(BusError::Read)
    }

    fn write_byte(&mut self, value: u8) -> Result<(), BusError> {
        if !self.powered {
            return Err(BusError::Write { value });
        }
        info!(value, "backlight write");
        Ok(())
    }

    fn set_power(&mut self, on: bool) {
        debug!(on, "touchkey power");
        self.powered = on;
    }
}
