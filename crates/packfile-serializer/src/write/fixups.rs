//! Relocation records collected during a run.

use packfile_format::{GlobalFixup, LocalFixup, VirtualFixup};

use crate::invariants::ensure_local_resolved;

/// A local fixup whose destination is known only once its payload is written.
#[derive(Clone, Copy, Debug)]
struct PendingLocal {
    src: u32,
    dst: Option<u32>,
}

/// Index of a local fixup awaiting its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LocalSlot(usize);

#[derive(Debug, Default)]
pub(crate) struct FixupTables {
    local: Vec<PendingLocal>,
    global: Vec<GlobalFixup>,
    virtuals: Vec<VirtualFixup>,
}

impl FixupTables {
    pub fn add_local(&mut self, src: u32) -> LocalSlot {
        self.local.push(PendingLocal { src, dst: None });
        LocalSlot(self.local.len() - 1)
    }

    pub fn set_local_dst(&mut self, slot: LocalSlot, dst: u32) {
        self.local[slot.0].dst = Some(dst);
    }

    pub fn add_global(&mut self, src: u32, dst: u32) {
        self.global.push(GlobalFixup::to_data(src, dst));
    }

    pub fn add_virtual(&mut self, src: u32, class_name: u32) {
        self.virtuals.push(VirtualFixup::to_class_name(src, class_name));
    }

    /// Final tables: locals by destination, globals by source, virtuals in
    /// emission order. Both sorts are stable.
    pub fn sorted(self) -> SortedFixups {
        let mut local: Vec<LocalFixup> = self
            .local
            .into_iter()
            .map(|f| LocalFixup {
                src: f.src,
                dst: ensure_local_resolved(f.src, f.dst),
            })
            .collect();
        local.sort_by_key(|f| f.dst);

        let mut global = self.global;
        global.sort_by_key(|f| f.src);

        SortedFixups {
            local,
            global,
            virtuals: self.virtuals,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SortedFixups {
    pub local: Vec<LocalFixup>,
    pub global: Vec<GlobalFixup>,
    pub virtuals: Vec<VirtualFixup>,
}
