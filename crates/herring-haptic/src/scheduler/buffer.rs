use herring_haptic_core::record::DEFAULT_BIT_DEPTH;

use crate::config::engine::ActuatorSnapshot;

/// One fixed-capacity sample record. Free when empty.
#[derive(Debug, Clone)]
pub(crate) struct SampleSlot {
    samples: Vec<i8>,
    bit_depth: u8,
}

impl SampleSlot {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            bit_depth: DEFAULT_BIT_DEPTH,
        }
    }

    pub(crate) fn is_free(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    fn fill(&mut self, bit_depth: u8, samples: &[u8]) {
        self.samples.clear();
        self.samples.extend(samples.iter().map(|&b| b as i8));
        self.bit_depth = bit_depth;
    }

    fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Double buffer of one actuator: two slots and the index of the one
/// draining.
///
/// Invariant: `playing` points at a non-free slot, and `cursor` is strictly
/// below that slot's length.
#[derive(Debug, Clone)]
pub(crate) struct ActuatorBuffer {
    slots: [SampleSlot; 2],
    playing: Option<usize>,
    cursor: usize,
}

/// What one tick did to a single actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Sample handed out, slot still has data.
    Playing,
    /// Sample handed out, slot exhausted and the other slot took over.
    Swapped,
    /// Sample handed out, slot exhausted, nothing queued behind it.
    Drained,
}

impl ActuatorBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: [
                SampleSlot::with_capacity(capacity),
                SampleSlot::with_capacity(capacity),
            ],
            playing: None,
            cursor: 0,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.playing.is_none()
    }

    pub(crate) fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(SampleSlot::is_free)
    }

    /// Stores samples in `slot` and starts draining it when idle.
    ///
    /// Returns `true` when the slot became the active one.
    pub(crate) fn store(&mut self, slot: usize, bit_depth: u8, samples: &[u8]) -> bool {
        self.slots[slot].fill(bit_depth, samples);
        if self.playing.is_none() {
            self.playing = Some(slot);
            self.cursor = 0;
            return true;
        }
        false
    }

    /// Next sample of the active slot with the slot's bit depth.
    pub(crate) fn current(&self) -> Option<(u8, i8)> {
        let slot = &self.slots[self.playing?];
        slot.samples
            .get(self.cursor)
            .map(|&sample| (slot.bit_depth(), sample))
    }

    /// Moves past the sample returned by [`current`](Self::current).
    ///
    /// With `halt` set an exhausted slot leaves the actuator idle even if the
    /// other slot holds data.
    pub(crate) fn advance(&mut self, halt: bool) -> Option<Advance> {
        let active = self.playing?;
        self.cursor += 1;
        if self.cursor < self.slots[active].len() {
            return Some(Advance::Playing);
        }

        self.slots[active].clear();
        self.cursor = 0;
        let next = active ^ 1;
        if !halt && !self.slots[next].is_free() {
            self.playing = Some(next);
            return Some(Advance::Swapped);
        }
        self.playing = None;
        Some(Advance::Drained)
    }

    pub(crate) fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        self.playing = None;
        self.cursor = 0;
    }

    pub(crate) fn snapshot(&self) -> ActuatorSnapshot {
        ActuatorSnapshot {
            playing_slot: self.playing,
            remaining: self
                .playing
                .map(|active| self.slots[active].len() - self.cursor)
                .unwrap_or(0),
            slot_lens: [self.slots[0].len(), self.slots[1].len()],
        }
    }
}
