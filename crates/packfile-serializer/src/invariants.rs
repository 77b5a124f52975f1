//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;

use packfile_core::Handle;

pub(crate) fn ensure_unresolved(resolved: &HashMap<Handle, u32>, handle: Handle, offset: u32) {
    if let Some(&previous) = resolved.get(&handle) {
        panic!("IdentityTable: {handle} resolved twice ({previous:#x}, then {offset:#x})");
    }
}

pub(crate) fn ensure_local_resolved(src: u32, dst: Option<u32>) -> u32 {
    dst.unwrap_or_else(|| {
        panic!("FixupTables: local fixup at {src:#x} has no destination (payload never written)")
    })
}
