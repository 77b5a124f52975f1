//! Parsed packfile container.
//!
//! [`PackFile`] validates the header and section bounds once on load. Section
//! payloads and fixup tables are then read through [`SectionView`]s, decoded on
//! demand.

use std::path::Path;

use crate::class_name::{ClassNameEntry, read_class_names};
use crate::codec::ByteReader;
use crate::error::{FormatError, Result};
use crate::fixup::{
    GlobalFixup, LocalFixup, VirtualFixup, read_global_fixups, read_local_fixups,
    read_virtual_fixups,
};
use crate::header::{HEADER_SIZE, Header};
use crate::layout::Layout;
use crate::section::{CLASS_NAMES_TAG, DATA_TAG, SectionHeader, section_header_size};

/// A loaded packfile.
#[derive(Debug)]
pub struct PackFile {
    storage: Vec<u8>,
    header: Header,
    sections: Vec<SectionHeader>,
}

impl PackFile {
    /// Parse a container from owned bytes.
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        let header = Header::read(&bytes)?;
        let file_version = header.options.file_version;

        let table_end = (header.num_sections as usize)
            .checked_mul(section_header_size(file_version))
            .and_then(|len| len.checked_add(HEADER_SIZE))
            .filter(|&end| end <= bytes.len())
            .ok_or(FormatError::BadSectionCount {
                count: header.num_sections,
                len: bytes.len(),
            })?;

        let mut r = ByteReader::new(&bytes, &header.layout);
        r.seek(HEADER_SIZE);
        let mut sections = Vec::with_capacity(header.num_sections as usize);
        for _ in 0..header.num_sections {
            let section = SectionHeader::read(&mut r, file_version)?;
            section.validate()?;
            let range = section.range();
            if range.end > bytes.len() {
                return Err(FormatError::SectionOutOfBounds {
                    tag: section.tag.clone(),
                    start: range.start,
                    end: range.end,
                    len: bytes.len(),
                });
            }
            sections.push(section);
        }

        if let Some(overlap) = sections
            .iter()
            .find(|s| (s.absolute_data_start as usize) < table_end)
        {
            return Err(FormatError::SectionOutOfBounds {
                tag: overlap.tag.clone(),
                start: overlap.absolute_data_start as usize,
                end: overlap.range().end,
                len: bytes.len(),
            });
        }

        Ok(Self {
            storage: bytes,
            header,
            sections,
        })
    }

    /// Read and parse a container from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(std::fs::read(path)?)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn layout(&self) -> &Layout {
        &self.header.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    /// Sections in file order.
    pub fn sections(&self) -> impl Iterator<Item = SectionView<'_>> {
        (0..self.sections.len()).map(|i| self.view(i))
    }

    pub fn section_by_index(&self, index: u32) -> Option<SectionView<'_>> {
        let i = index as usize;
        (i < self.sections.len()).then(|| self.view(i))
    }

    pub fn section(&self, tag: &str) -> Option<SectionView<'_>> {
        let i = self.sections.iter().position(|s| s.tag == tag)?;
        Some(self.view(i))
    }

    /// The `__data__` section holding the objects.
    pub fn data(&self) -> Result<SectionView<'_>> {
        self.section(DATA_TAG)
            .ok_or(FormatError::MissingSection(DATA_TAG))
    }

    /// The `__classnames__` section.
    pub fn class_name_section(&self) -> Result<SectionView<'_>> {
        self.section(CLASS_NAMES_TAG)
            .ok_or(FormatError::MissingSection(CLASS_NAMES_TAG))
    }

    /// Every entry of the class-name section.
    pub fn class_names(&self) -> Result<Vec<ClassNameEntry>> {
        let section = self.class_name_section()?;
        read_class_names(&mut section.reader())
    }

    fn view(&self, index: usize) -> SectionView<'_> {
        SectionView {
            index: index as u32,
            header: &self.sections[index],
            file: &self.storage,
            layout: &self.header.layout,
        }
    }
}

/// Borrowed view of one section.
#[derive(Clone, Copy, Debug)]
pub struct SectionView<'a> {
    index: u32,
    header: &'a SectionHeader,
    file: &'a [u8],
    layout: &'a Layout,
}

impl<'a> SectionView<'a> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn tag(&self) -> &'a str {
        &self.header.tag
    }

    pub fn header(&self) -> &'a SectionHeader {
        self.header
    }

    /// Section payload (without fixup tables).
    pub fn data(&self) -> &'a [u8] {
        &self.file[self.header.data_range()]
    }

    /// Cursor over the payload; positions are section-relative.
    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.data(), self.layout)
    }

    pub fn local_fixups(&self) -> Vec<LocalFixup> {
        read_local_fixups(&mut self.table(self.header.local_fixups_range()))
    }

    pub fn global_fixups(&self) -> Vec<GlobalFixup> {
        read_global_fixups(&mut self.table(self.header.global_fixups_range()))
    }

    pub fn virtual_fixups(&self) -> Vec<VirtualFixup> {
        read_virtual_fixups(&mut self.table(self.header.virtual_fixups_range()))
    }

    fn table(&self, range: std::ops::Range<usize>) -> ByteReader<'a> {
        ByteReader::new(&self.file[range], self.layout)
    }
}
