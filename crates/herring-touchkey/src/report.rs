//! Interrupt report byte of the touch-key controller.

pub const SCANCODE_MASK: u8 = 0x07;
pub const UPDOWN_EVENT_MASK: u8 = 0x08;
pub const ESD_STATE_MASK: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReport {
    raw: u8,
}

impl KeyReport {
    pub fn new(raw: u8) -> Self {
        Self { raw }
    }

    pub fn raw(self) -> u8 {
        self.raw
    }

    /// Zero-based key index; `-1` when the controller reported no key.
    pub fn scancode(self) -> i32 {
        i32::from(self.raw & SCANCODE_MASK) - 1
    }

    pub fn is_release(self) -> bool {
        self.raw & UPDOWN_EVENT_MASK != 0
    }

    /// Set after an electrostatic discharge reset the controller.
    pub fn esd_detected(self) -> bool {
        self.raw & ESD_STATE_MASK != 0
    }

    /// Per-key state for controllers that report a bitmask.
    pub fn is_bit_set(self, index: usize) -> bool {
        index < 8 && self.raw & (1 << index) != 0
    }
}
