use crate::error::SinkError;

/// Hardware seam the playback timer drives.
///
/// Implementations translate one force sample into whatever the actuator
/// needs (PWM duty, SPI frame, ...). Calls arrive from the engine's control
/// thread only.
pub trait OutputSink: Send {
    fn set_sample(&mut self, actuator: u8, bit_depth: u8, sample: i8) -> Result<(), SinkError>;

    fn amp_enable(&mut self, actuator: u8) -> Result<(), SinkError>;

    fn amp_disable(&mut self, actuator: u8) -> Result<(), SinkError>;

    /// Human-readable actuator name reported through the device read path.
    fn device_name(&self, actuator: u8) -> String;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn set_sample(&mut self, actuator: u8, bit_depth: u8, sample: i8) -> Result<(), SinkError> {
        (**self).set_sample(actuator, bit_depth, sample)
    }

    fn amp_enable(&mut self, actuator: u8) -> Result<(), SinkError> {
        (**self).amp_enable(actuator)
    }

    fn amp_disable(&mut self, actuator: u8) -> Result<(), SinkError> {
        (**self).amp_disable(actuator)
    }

    fn device_name(&self, actuator: u8) -> String {
        (**self).device_name(actuator)
    }
}
