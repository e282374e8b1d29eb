use tokio::sync::broadcast;

use crate::config::engine::HapticEvent;

/// Fan-out of engine events; slow subscribers lag instead of blocking the
/// control thread.
pub(crate) struct EventHub {
    tx: broadcast::Sender<HapticEvent>,
}

impl EventHub {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn emit(&self, event: HapticEvent) {
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<HapticEvent> {
        self.tx.subscribe()
    }
}
