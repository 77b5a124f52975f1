//! Section headers.
//!
//! A packfile always carries three sections in fixed order. Each section header
//! stores a 19-byte tag, an absolute start, and six offsets relative to that
//! start which delimit the payload and its three fixup tables:
//!
//! ```text
//! start ── payload ── local ── global ── virtual ── exports = imports = end
//! ```

use std::ops::Range;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};

pub const CLASS_NAMES_SECTION: u32 = 0;
pub const TYPES_SECTION: u32 = 1;
pub const DATA_SECTION: u32 = 2;

pub const CLASS_NAMES_TAG: &str = "__classnames__";
pub const TYPES_TAG: &str = "__types__";
pub const DATA_TAG: &str = "__data__";

/// Tags in section order.
pub const SECTION_TAGS: [&str; 3] = [CLASS_NAMES_TAG, TYPES_TAG, DATA_TAG];

const TAG_LEN: usize = 19;

/// Section header size for a given file version.
pub fn section_header_size(file_version: u32) -> usize {
    if file_version >= 11 { 64 } else { 48 }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionHeader {
    pub tag: String,
    pub absolute_data_start: u32,
    pub local_fixups_offset: u32,
    pub global_fixups_offset: u32,
    pub virtual_fixups_offset: u32,
    pub exports_offset: u32,
    pub imports_offset: u32,
    pub end_offset: u32,
}

impl SectionHeader {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            ..Default::default()
        }
    }

    pub fn write(&self, w: &mut ByteWriter, file_version: u32) {
        let mut tag = [0u8; TAG_LEN];
        let len = self.tag.len().min(TAG_LEN - 1);
        tag[..len].copy_from_slice(&self.tag.as_bytes()[..len]);
        w.write_bytes(&tag);
        w.write_u8(0xFF);
        w.write_u32(self.absolute_data_start);
        w.write_u32(self.local_fixups_offset);
        w.write_u32(self.global_fixups_offset);
        w.write_u32(self.virtual_fixups_offset);
        w.write_u32(self.exports_offset);
        w.write_u32(self.imports_offset);
        w.write_u32(self.end_offset);
        if file_version >= 11 {
            w.write_bytes(&[0xFF; 16]);
        }
    }

    pub fn read(r: &mut ByteReader<'_>, file_version: u32) -> Result<Self> {
        let raw = r.read_bytes(TAG_LEN)?;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(TAG_LEN);
        let tag = String::from_utf8_lossy(&raw[..len]).into_owned();
        r.skip(1)?;

        let header = Self {
            tag,
            absolute_data_start: r.read_u32()?,
            local_fixups_offset: r.read_u32()?,
            global_fixups_offset: r.read_u32()?,
            virtual_fixups_offset: r.read_u32()?,
            exports_offset: r.read_u32()?,
            imports_offset: r.read_u32()?,
            end_offset: r.read_u32()?,
        };
        if file_version >= 11 {
            r.skip(16)?;
        }
        Ok(header)
    }

    /// Check that the relative offsets never go backwards.
    pub fn validate(&self) -> Result<()> {
        let offsets = [
            self.local_fixups_offset,
            self.global_fixups_offset,
            self.virtual_fixups_offset,
            self.exports_offset,
            self.imports_offset,
            self.end_offset,
        ];
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(FormatError::MalformedSection {
                tag: self.tag.clone(),
            });
        }
        Ok(())
    }

    /// Payload bytes, absolute.
    pub fn data_range(&self) -> Range<usize> {
        self.absolute(0, self.local_fixups_offset)
    }

    pub fn local_fixups_range(&self) -> Range<usize> {
        self.absolute(self.local_fixups_offset, self.global_fixups_offset)
    }

    pub fn global_fixups_range(&self) -> Range<usize> {
        self.absolute(self.global_fixups_offset, self.virtual_fixups_offset)
    }

    pub fn virtual_fixups_range(&self) -> Range<usize> {
        self.absolute(self.virtual_fixups_offset, self.exports_offset)
    }

    /// Whole section, absolute.
    pub fn range(&self) -> Range<usize> {
        self.absolute(0, self.end_offset)
    }

    fn absolute(&self, from: u32, to: u32) -> Range<usize> {
        let start = self.absolute_data_start as usize;
        start + from as usize..start + to as usize
    }
}
