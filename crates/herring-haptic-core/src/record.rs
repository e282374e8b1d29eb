//! Sample record wire format.
//!
//! A write buffer is a concatenation of records:
//!
//! ```text
//! +----------------+-----------+--------------+------------------------+
//! | actuator index | bit depth | sample count | samples (count bytes)  |
//! |      u8        |    u8     |      u8      |  i8 each               |
//! +----------------+-----------+--------------+------------------------+
//! ```

use crate::error::RecordError;

pub const RECORD_HEADER_SIZE: usize = 3;

/// Largest number of samples a single record may carry.
pub const VIBE_OUTPUT_SAMPLE_SIZE: usize = 50;

pub const DEFAULT_BIT_DEPTH: u8 = 8;

/// Checks the overall size of one write call.
///
/// Mirrors the device contract: a write must hold more than a bare header
/// and stay below one full record per actuator.
pub fn validate_write_len(
    len: usize,
    num_actuators: usize,
    max_samples: usize,
) -> Result<(), RecordError> {
    let max_exclusive = num_actuators * (max_samples + RECORD_HEADER_SIZE);
    if len <= RECORD_HEADER_SIZE || len >= max_exclusive {
        return Err(RecordError::InvalidWriteSize {
            len,
            min_exclusive: RECORD_HEADER_SIZE,
            max_exclusive,
        });
    }
    Ok(())
}

/// Most samples one single-record write can carry and still pass
/// [`validate_write_len`]; zero when no such write exists.
pub fn max_samples_per_write(num_actuators: usize, max_samples: usize) -> usize {
    let max_exclusive = num_actuators * (max_samples + RECORD_HEADER_SIZE);
    max_exclusive
        .saturating_sub(RECORD_HEADER_SIZE + 1)
        .min(max_samples)
}

/// Borrowed view of one record inside a write buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordView<'a> {
    pub offset: usize,
    pub actuator: u8,
    pub bit_depth: u8,
    pub samples: &'a [u8],
}

impl RecordView<'_> {
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + self.samples.len()
    }

    pub fn to_owned(&self) -> SampleRecord {
        SampleRecord {
            actuator: self.actuator,
            bit_depth: self.bit_depth,
            samples: self.samples.iter().map(|&b| b as i8).collect(),
        }
    }
}

/// Iterates the records of a write buffer in order.
///
/// Stops after the first truncated record; whatever follows it cannot be
/// framed reliably.
pub struct RecordReader<'a> {
    buf: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<RecordView<'a>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buf.len() {
            return None;
        }
        let offset = self.offset;
        let available = self.buf.len() - offset;
        if available < RECORD_HEADER_SIZE {
            self.failed = true;
            return Some(Err(RecordError::Truncated {
                offset,
                needed: RECORD_HEADER_SIZE,
                available,
            }));
        }

        let header = &self.buf[offset..offset + RECORD_HEADER_SIZE];
        let needed = RECORD_HEADER_SIZE + header[2] as usize;
        if available < needed {
            self.failed = true;
            return Some(Err(RecordError::Truncated {
                offset,
                needed,
                available,
            }));
        }

        let view = RecordView {
            offset,
            actuator: header[0],
            bit_depth: header[1],
            samples: &self.buf[offset + RECORD_HEADER_SIZE..offset + needed],
        };
        self.offset += view.encoded_len();
        Some(Ok(view))
    }
}

/// Owned record, used by producers that build write buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRecord {
    pub actuator: u8,
    pub bit_depth: u8,
    pub samples: Vec<i8>,
}

impl SampleRecord {
    pub fn new(actuator: u8, samples: Vec<i8>) -> Self {
        Self {
            actuator,
            bit_depth: DEFAULT_BIT_DEPTH,
            samples,
        }
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), RecordError> {
        if self.samples.len() > u8::MAX as usize {
            return Err(RecordError::Oversized {
                samples: self.samples.len(),
                max: u8::MAX as usize,
            });
        }
        out.reserve(RECORD_HEADER_SIZE + self.samples.len());
        out.push(self.actuator);
        out.push(self.bit_depth);
        out.push(self.samples.len() as u8);
        out.extend(self.samples.iter().map(|&s| s as u8));
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }
}

/// Concatenates records into a single write buffer.
pub fn encode_records(records: &[SampleRecord]) -> Result<Vec<u8>, RecordError> {
    let mut out = Vec::new();
    for record in records {
        record.encode_into(&mut out)?;
    }
    Ok(out)
}
