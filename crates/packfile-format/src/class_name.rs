//! Class-name section entries.
//!
//! Entry layout: `signature:u32, 0x09, name, NUL`. Virtual fixups point at the
//! name, five bytes past the entry start.

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};

/// Marker byte between signature and name.
pub const CLASS_NAME_MARKER: u8 = 0x09;

/// Distance from an entry's start to its name.
pub const CLASS_NAME_PREFIX: usize = 5;

/// Reflection classes every class-name section starts with.
pub const BUILTIN_CLASSES: [(&str, u32); 4] = [
    ("hkClass", 0x33D4_2383),
    ("hkClassMember", 0xB0EF_A719),
    ("hkClassEnum", 0x8A36_09CF),
    ("hkClassEnumItem", 0xCE6F_8A6C),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassNameEntry {
    /// Offset of the name within the section (what virtual fixups point at).
    pub offset: u32,
    pub signature: u32,
    pub name: String,
}

/// Append an entry, returning the offset of its name.
pub fn write_class_name(w: &mut ByteWriter, name: &str, signature: u32) -> usize {
    let offset = w.position() + CLASS_NAME_PREFIX;
    w.write_u32(signature);
    w.write_u8(CLASS_NAME_MARKER);
    w.write_cstr(name);
    offset
}

/// Parse every entry of a class-name section payload. Trailing `0xFF` filler
/// ends the list.
pub fn read_class_names(r: &mut ByteReader<'_>) -> Result<Vec<ClassNameEntry>> {
    let mut entries = Vec::new();
    loop {
        let start = r.position();
        if r.remaining() == 0 || is_filler(r) {
            return Ok(entries);
        }
        let signature = r.read_u32()?;
        if r.read_u8()? != CLASS_NAME_MARKER {
            return Err(FormatError::MalformedClassName { offset: start });
        }
        let offset = (start + CLASS_NAME_PREFIX) as u32;
        let name = r
            .read_cstr()
            .map_err(|_| FormatError::MalformedClassName { offset: start })?;
        entries.push(ClassNameEntry {
            offset,
            signature,
            name,
        });
    }
}

fn is_filler(r: &ByteReader<'_>) -> bool {
    let mut probe = r.clone();
    let len = probe.remaining();
    probe
        .read_bytes(len)
        .is_ok_and(|rest| rest.iter().all(|&b| b == 0xFF))
}
