//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{Arena, Handle};

impl<T: ?Sized> Arena<T> {
    pub(crate) fn ensure_vacant(&mut self, handle: Handle) -> &mut Option<Box<T>> {
        let len = self.len();
        let slot = self
            .slot_mut(handle)
            .unwrap_or_else(|| panic!("Arena: handle {handle} out of range (len {len})"));
        if slot.is_some() {
            panic!("Arena: handle {handle} filled twice (slot was not reserved)");
        }
        slot
    }
}
