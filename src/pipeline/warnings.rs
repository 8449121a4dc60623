//! Side channel carrying warnings from workers back to the coordinator.

use crossbeam_channel::Sender;
use log::trace;

use crate::types::Warning;

/// Per-item handle for reporting warnings. Each message travels whole, tagged with the
/// index of the item that produced it.
#[derive(Clone, Debug)]
pub struct WarningSink {
    slot: usize,
    tx: Sender<(usize, Warning)>,
}

impl WarningSink {
    pub(crate) fn new(slot: usize, tx: Sender<(usize, Warning)>) -> Self {
        Self { slot, tx }
    }

    pub fn emit(&self, warning: Warning) {
        if self.tx.send((self.slot, warning)).is_err() {
            trace!("warning channel closed; dropping warning for item {}", self.slot);
        }
    }
}
