//! Fixup (relocation) records and their on-disk tables.
//!
//! Each table is a packed run of `u32` records padded to 16 bytes with `0xFF`.
//! A record whose source reads `0xFFFFFFFF` is filler and ends the table.

use std::fmt;

use crate::codec::{ByteReader, ByteWriter};
use crate::section::{CLASS_NAMES_SECTION, DATA_SECTION};

/// Source value marking table padding.
pub const FIXUP_FILLER: u32 = u32::MAX;

/// Alignment of every fixup table.
pub const FIXUP_TABLE_ALIGN: usize = 16;

/// Pointer into the same section (array and string payloads).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalFixup {
    pub src: u32,
    pub dst: u32,
}

/// Pointer to another object, possibly in another section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlobalFixup {
    pub src: u32,
    pub dst_section: u32,
    pub dst: u32,
}

impl GlobalFixup {
    /// Object pointer within the data section.
    pub fn to_data(src: u32, dst: u32) -> Self {
        Self {
            src,
            dst_section: DATA_SECTION,
            dst,
        }
    }
}

/// Runtime type of the object starting at `src`, as a class-name offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VirtualFixup {
    pub src: u32,
    pub dst_section: u32,
    pub dst: u32,
}

impl VirtualFixup {
    /// Type reference into the class-name section.
    pub fn to_class_name(src: u32, dst: u32) -> Self {
        Self {
            src,
            dst_section: CLASS_NAMES_SECTION,
            dst,
        }
    }
}

/// The three kinds of relocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixupKind {
    Local,
    Global,
    Virtual,
}

impl fmt::Display for FixupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Global => "global",
            Self::Virtual => "virtual",
        })
    }
}

pub fn write_local_fixups(w: &mut ByteWriter, fixups: &[LocalFixup]) {
    for f in fixups {
        w.write_u32(f.src);
        w.write_u32(f.dst);
    }
    w.pad_with(FIXUP_TABLE_ALIGN, 0xFF);
}

pub fn write_global_fixups(w: &mut ByteWriter, fixups: &[GlobalFixup]) {
    for f in fixups {
        w.write_u32(f.src);
        w.write_u32(f.dst_section);
        w.write_u32(f.dst);
    }
    w.pad_with(FIXUP_TABLE_ALIGN, 0xFF);
}

pub fn write_virtual_fixups(w: &mut ByteWriter, fixups: &[VirtualFixup]) {
    for f in fixups {
        w.write_u32(f.src);
        w.write_u32(f.dst_section);
        w.write_u32(f.dst);
    }
    w.pad_with(FIXUP_TABLE_ALIGN, 0xFF);
}

/// Decode a local-fixup table. The reader must span exactly the table.
pub fn read_local_fixups(r: &mut ByteReader<'_>) -> Vec<LocalFixup> {
    let mut out = Vec::with_capacity(r.remaining() / 8);
    while r.remaining() >= 8 {
        let (Ok(src), Ok(dst)) = (r.read_u32(), r.read_u32()) else {
            break;
        };
        if src == FIXUP_FILLER {
            break;
        }
        out.push(LocalFixup { src, dst });
    }
    out
}

/// Decode a global-fixup table. The reader must span exactly the table.
pub fn read_global_fixups(r: &mut ByteReader<'_>) -> Vec<GlobalFixup> {
    read_triples(r)
        .map(|(src, dst_section, dst)| GlobalFixup {
            src,
            dst_section,
            dst,
        })
        .collect()
}

/// Decode a virtual-fixup table. The reader must span exactly the table.
pub fn read_virtual_fixups(r: &mut ByteReader<'_>) -> Vec<VirtualFixup> {
    read_triples(r)
        .map(|(src, dst_section, dst)| VirtualFixup {
            src,
            dst_section,
            dst,
        })
        .collect()
}

fn read_triples<'r, 'a>(r: &'r mut ByteReader<'a>) -> impl Iterator<Item = (u32, u32, u32)> + 'r {
    std::iter::from_fn(move || {
        if r.remaining() < 12 {
            return None;
        }
        let src = r.read_u32().ok()?;
        if src == FIXUP_FILLER {
            return None;
        }
        Some((src, r.read_u32().ok()?, r.read_u32().ok()?))
    })
}
