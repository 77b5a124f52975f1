//! Object identity and pending references.
//!
//! A handle is undiscovered, pending (referenced but not yet written, with the
//! pointer slots waiting for it) or resolved (written at a fixed offset).

use std::collections::HashMap;

use packfile_core::Handle;

use crate::invariants::ensure_unresolved;

#[derive(Debug, Default)]
pub(crate) struct IdentityTable {
    resolved: HashMap<Handle, u32>,
    pending: HashMap<Handle, Vec<u32>>,
}

/// Outcome of recording a reference to an unresolved object.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reference {
    /// First reference: the object must be scheduled.
    Discovered,
    /// Already scheduled by an earlier reference.
    Pending,
}

impl IdentityTable {
    pub fn offset(&self, handle: Handle) -> Option<u32> {
        self.resolved.get(&handle).copied()
    }

    pub fn is_resolved(&self, handle: Handle) -> bool {
        self.resolved.contains_key(&handle)
    }

    /// Record that the pointer slot at `src` waits for `handle`.
    pub fn add_pending(&mut self, handle: Handle, src: u32) -> Reference {
        let sources = self.pending.entry(handle).or_default();
        sources.push(src);
        if sources.len() == 1 {
            Reference::Discovered
        } else {
            Reference::Pending
        }
    }

    /// Fix `handle` at `offset`, returning the slots that were waiting for it.
    pub fn resolve(&mut self, handle: Handle, offset: u32) -> Vec<u32> {
        ensure_unresolved(&self.resolved, handle, offset);
        self.resolved.insert(handle, offset);
        self.pending.remove(&handle).unwrap_or_default()
    }

    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
