//! Packfile header (64 bytes).
//!
//! Layout (all integers in the container's byte order):
//! - 0-7: magic (two `u32`)
//! - 8-15: user tag, file version
//! - 16-19: layout rules (pointer width, little-endian flag, padding policy,
//!   empty-base-class flag), single bytes so they can be read before the byte
//!   order is known
//! - 20-39: section count, contents section index/offset, contents class-name
//!   section index/offset
//! - 40-55: contents version string (NUL-terminated, `0xFF` filled)
//! - 56-63: flags, max predicate, predicate array size

use serde::{Deserialize, Serialize};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{FormatError, Result};
use crate::layout::Layout;

/// Magic words at the start of every packfile.
pub const MAGIC: [u32; 2] = [0x57E0_E057, 0x10C0_C010];

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 64;

const CONTENTS_VERSION_LEN: usize = 16;

/// Header fields the caller chooses. Everything else is derived at assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    pub file_version: u32,
    pub user_tag: u32,
    /// At most 15 bytes are stored.
    pub contents_version: String,
    pub flags: u32,
    pub max_predicate: i16,
    pub predicate_array_size_plus_padding: i16,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            file_version: 8,
            user_tag: 0,
            contents_version: "hk_2010.2.0-r1".to_owned(),
            flags: 0,
            max_predicate: -1,
            predicate_array_size_plus_padding: -1,
        }
    }
}

impl HeaderOptions {
    /// Size of each section header for this file version.
    pub fn section_header_size(&self) -> usize {
        crate::section::section_header_size(self.file_version)
    }
}

/// Decoded file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub layout: Layout,
    pub options: HeaderOptions,
    pub num_sections: u32,
    pub contents_section_index: u32,
    pub contents_section_offset: u32,
    pub contents_class_name_section_index: u32,
    /// Offset of the root object's class name inside the class-name section.
    pub contents_class_name_section_offset: u32,
}

impl Header {
    /// Header for a standard three-section container.
    pub fn new(layout: Layout, options: HeaderOptions) -> Self {
        Self {
            layout,
            options,
            num_sections: 3,
            contents_section_index: crate::section::DATA_SECTION,
            contents_section_offset: 0,
            contents_class_name_section_index: crate::section::CLASS_NAMES_SECTION,
            contents_class_name_section_offset: 0,
        }
    }

    /// Encode the header (exactly [`HEADER_SIZE`] bytes).
    pub fn write(&self, w: &mut ByteWriter) {
        let start = w.position();
        w.write_u32(MAGIC[0]);
        w.write_u32(MAGIC[1]);
        w.write_u32(self.options.user_tag);
        w.write_u32(self.options.file_version);
        w.write_bytes(&self.layout.to_rules());
        w.write_u32(self.num_sections);
        w.write_u32(self.contents_section_index);
        w.write_u32(self.contents_section_offset);
        w.write_u32(self.contents_class_name_section_index);
        w.write_u32(self.contents_class_name_section_offset);
        w.write_bytes(&encode_contents_version(&self.options.contents_version));
        w.write_u32(self.options.flags);
        w.write_i16(self.options.max_predicate);
        w.write_i16(self.options.predicate_array_size_plus_padding);
        debug_assert_eq!(w.position() - start, HEADER_SIZE);
    }

    /// Decode the header from the start of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::FileTooSmall(bytes.len()));
        }

        let layout = Layout::from_rules([bytes[16], bytes[17], bytes[18], bytes[19]])?;
        let mut r = ByteReader::new(&bytes[..HEADER_SIZE], &layout);

        let magic = [r.read_u32()?, r.read_u32()?];
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic(magic[0], magic[1]));
        }
        let user_tag = r.read_u32()?;
        let file_version = r.read_u32()?;
        r.skip(4)?;

        let num_sections = r.read_u32()?;
        let contents_section_index = r.read_u32()?;
        let contents_section_offset = r.read_u32()?;
        let contents_class_name_section_index = r.read_u32()?;
        let contents_class_name_section_offset = r.read_u32()?;
        let contents_version = decode_contents_version(r.read_bytes(CONTENTS_VERSION_LEN)?);
        let flags = r.read_u32()?;
        let max_predicate = r.read_i16()?;
        let predicate_array_size_plus_padding = r.read_i16()?;

        Ok(Self {
            layout,
            options: HeaderOptions {
                file_version,
                user_tag,
                contents_version,
                flags,
                max_predicate,
                predicate_array_size_plus_padding,
            },
            num_sections,
            contents_section_index,
            contents_section_offset,
            contents_class_name_section_index,
            contents_class_name_section_offset,
        })
    }
}

fn encode_contents_version(version: &str) -> [u8; CONTENTS_VERSION_LEN] {
    let mut out = [0xFF; CONTENTS_VERSION_LEN];
    let mut len = version.len().min(CONTENTS_VERSION_LEN - 1);
    while !version.is_char_boundary(len) {
        len -= 1;
    }
    out[..len].copy_from_slice(&version.as_bytes()[..len]);
    out[len] = 0;
    out
}

fn decode_contents_version(raw: &[u8]) -> String {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len]).into_owned()
}
