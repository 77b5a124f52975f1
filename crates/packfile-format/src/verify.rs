//! Structural checks over a parsed container.
//!
//! [`verify`] never fails on a well-formed-but-wrong file: it returns every
//! violation it finds. Parse errors (truncated tables, bad class-name entries)
//! are still reported as [`FormatError`](crate::FormatError).

use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::fixup::FixupKind;
use crate::packfile::PackFile;
use crate::section::{CLASS_NAMES_SECTION, DATA_SECTION};

/// Object boundary. Array payloads share it, but string payloads inside
/// string arrays only align to 2, so local destinations are not checked.
pub const OBJECT_ALIGN: u32 = 16;

/// A broken container invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("{kind} fixups not sorted at entry {index}")]
    Unsorted { kind: FixupKind, index: usize },
    #[error("object at {offset:#x} is not 16-byte aligned")]
    MisalignedObject { offset: u32 },
    #[error("{kind} fixup {src:#x} -> {dst:#x} points outside its section")]
    OutOfRange { kind: FixupKind, src: u32, dst: u32 },
    #[error("{kind} fixup targets section {section}")]
    WrongSection { kind: FixupKind, section: u32 },
    #[error("offset {src:#x} is patched more than once")]
    DuplicateSource { src: u32 },
    #[error("global fixup {src:#x} -> {dst:#x} does not point at an object")]
    DanglingGlobal { src: u32, dst: u32 },
    #[error("virtual fixup {src:#x} -> {dst:#x} does not name a class")]
    UnknownClassName { src: u32, dst: u32 },
    #[error("object at {offset:#x} has {count} virtual fixups")]
    DuplicateObject { offset: u32, count: usize },
    #[error("header names class at {offset:#x}, root object has {expected:#x}")]
    ContentsClassMismatch { offset: u32, expected: u32 },
}

/// Check sort order, alignment and fixup closure of the data section.
pub fn verify(file: &PackFile) -> Result<Vec<Violation>> {
    let data = file.data()?;
    let data_len = data.data().len() as u32;
    let class_names: HashSet<u32> = file.class_names()?.iter().map(|e| e.offset).collect();

    let locals = data.local_fixups();
    let globals = data.global_fixups();
    let virtuals = data.virtual_fixups();

    let mut out = Vec::new();

    if let Some(index) = first_unsorted(locals.iter().map(|f| f.dst)) {
        out.push(Violation::Unsorted {
            kind: FixupKind::Local,
            index,
        });
    }
    if let Some(index) = first_unsorted(globals.iter().map(|f| f.src)) {
        out.push(Violation::Unsorted {
            kind: FixupKind::Global,
            index,
        });
    }

    let mut objects: BTreeMap<u32, usize> = BTreeMap::new();
    for f in &virtuals {
        *objects.entry(f.src).or_default() += 1;
        if f.dst_section != CLASS_NAMES_SECTION {
            out.push(Violation::WrongSection {
                kind: FixupKind::Virtual,
                section: f.dst_section,
            });
        }
        if f.src >= data_len {
            out.push(Violation::OutOfRange {
                kind: FixupKind::Virtual,
                src: f.src,
                dst: f.dst,
            });
        }
        if !class_names.contains(&f.dst) {
            out.push(Violation::UnknownClassName {
                src: f.src,
                dst: f.dst,
            });
        }
    }
    for (&offset, &count) in &objects {
        if offset % OBJECT_ALIGN != 0 {
            out.push(Violation::MisalignedObject { offset });
        }
        if count > 1 {
            out.push(Violation::DuplicateObject { offset, count });
        }
    }

    let mut sources = HashSet::new();
    for f in &locals {
        if !sources.insert(f.src) {
            out.push(Violation::DuplicateSource { src: f.src });
        }
        if f.src >= data_len || f.dst > data_len {
            out.push(Violation::OutOfRange {
                kind: FixupKind::Local,
                src: f.src,
                dst: f.dst,
            });
        }
    }
    for f in &globals {
        if !sources.insert(f.src) {
            out.push(Violation::DuplicateSource { src: f.src });
        }
        if f.dst_section != DATA_SECTION {
            out.push(Violation::WrongSection {
                kind: FixupKind::Global,
                section: f.dst_section,
            });
            continue;
        }
        if f.src >= data_len || f.dst >= data_len {
            out.push(Violation::OutOfRange {
                kind: FixupKind::Global,
                src: f.src,
                dst: f.dst,
            });
        } else if !objects.contains_key(&f.dst) {
            out.push(Violation::DanglingGlobal {
                src: f.src,
                dst: f.dst,
            });
        }
    }

    if let Some(root) = virtuals.first() {
        let offset = file.header().contents_class_name_section_offset;
        if offset != root.dst {
            out.push(Violation::ContentsClassMismatch {
                offset,
                expected: root.dst,
            });
        }
    }

    Ok(out)
}

fn first_unsorted(keys: impl Iterator<Item = u32>) -> Option<usize> {
    let keys: Vec<u32> = keys.collect();
    keys.windows(2).position(|w| w[0] > w[1]).map(|i| i + 1)
}
