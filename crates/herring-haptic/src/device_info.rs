use herring_haptic_core::OutputSink;

const VERSION_SUFFIX: &str = " v3.3.13.0\n";

/// Builds the text a service reads back from the device node: one line per
/// actuator, the actuator name followed by the driver version.
pub(crate) fn device_name(sink: &dyn OutputSink, num_actuators: u8) -> String {
    let mut name = String::new();
    for actuator in 0..num_actuators {
        name.push_str(&sink.device_name(actuator));
        name.push_str(VERSION_SUFFIX);
    }
    name
}

/// File-style read: at most `max` bytes from `offset`, empty past the end.
pub(crate) fn read_at(text: &str, offset: usize, max: usize) -> Vec<u8> {
    let bytes = text.as_bytes();
    if offset >= bytes.len() {
        return Vec::new();
    }
    let end = offset.saturating_add(max).min(bytes.len());
    bytes[offset..end].to_vec()
}
