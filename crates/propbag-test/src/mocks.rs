//! Mock host stores.

use std::cell::Cell;

use propbag_core::EntryId;
use propbag_store::{Slot, VariableStore, Variables};

/// A variable store that counts every mutable access.
///
/// Wraps [`Variables`]; lets tests assert that a rejected operation never
/// reached the host store.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: Variables,
    writes: Cell<usize>,
}

impl RecordingStore {
    /// An empty store with no writes recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable accesses so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &Variables {
        &self.inner
    }

    fn record(&self) {
        self.writes.set(self.writes.get().saturating_add(1));
    }
}

impl VariableStore for RecordingStore {
    fn slot(&self, id: EntryId) -> Option<&Slot> {
        self.inner.slot(id)
    }

    fn slot_mut(&mut self, id: EntryId) -> Option<&mut Slot> {
        self.record();
        self.inner.slot_mut(id)
    }

    fn set_slot(&mut self, id: EntryId, slot: Slot) {
        self.record();
        self.inner.set_slot(id, slot);
    }

    fn slot_or_insert(&mut self, id: EntryId, slot: Slot) -> &mut Slot {
        self.record();
        self.inner.slot_or_insert(id, slot)
    }
}
