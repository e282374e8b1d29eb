//! Hardware-independent building blocks of the TouchSense haptic path.
//!
//! [`record`] decodes the sample records a haptic service writes to the
//! device, [`sink`] is the seam to the actuator hardware.

pub mod error;
pub mod record;
pub mod sink;

pub use error::{RecordError, SinkError};
pub use record::{RecordReader, RecordView, SampleRecord};
pub use sink::OutputSink;
