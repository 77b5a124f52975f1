#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Packfile container wire format.
//!
//! This crate contains:
//! - Layout rules and header options ([`Layout`], [`HeaderOptions`])
//! - The endian-aware primitive codec ([`ByteWriter`], [`ByteReader`])
//! - Header, section, fixup and class-name table encodings
//! - A parsed container ([`PackFile`]) with a verifier and a text dump

pub mod class_name;
pub mod codec;
pub mod dump;
mod error;
pub mod fixup;
pub mod header;
pub mod layout;
pub mod packfile;
pub mod section;
pub mod verify;

#[cfg(test)]
mod packfile_tests;
#[cfg(test)]
mod test_utils;

pub use class_name::{
    BUILTIN_CLASSES, CLASS_NAME_MARKER, CLASS_NAME_PREFIX, ClassNameEntry,
};
pub use codec::{ARRAY_DONT_DEALLOCATE, ByteReader, ByteWriter, Primitive, align_up};
pub use dump::{DumpOptions, dump};
pub use error::{FormatError, Result};
pub use fixup::{FixupKind, GlobalFixup, LocalFixup, VirtualFixup};
pub use header::{HEADER_SIZE, Header, HeaderOptions, MAGIC};
pub use layout::{Endianness, Layout, PaddingPolicy, PointerWidth};
pub use packfile::{PackFile, SectionView};
pub use section::{
    CLASS_NAMES_SECTION, CLASS_NAMES_TAG, DATA_SECTION, DATA_TAG, SECTION_TAGS, SectionHeader,
    TYPES_SECTION, TYPES_TAG,
};
pub use verify::{Violation, verify};
