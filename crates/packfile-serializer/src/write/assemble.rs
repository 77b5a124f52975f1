//! Final container assembly.
//!
//! ```text
//! header (64) | 3 section headers | __classnames__ | __types__ | __data__ + tables
//! ```

use packfile_format::fixup::{write_global_fixups, write_local_fixups, write_virtual_fixups};
use packfile_format::{
    ByteWriter, CLASS_NAMES_TAG, DATA_TAG, HEADER_SIZE, Header, HeaderOptions, Layout,
    SectionHeader, TYPES_TAG,
};

use super::fixups::SortedFixups;
use crate::error::{Result, SerializeError};

/// Lay out header, section headers and section bodies.
pub(crate) fn assemble(
    layout: &Layout,
    options: &HeaderOptions,
    class_names: &[u8],
    data: &[u8],
    fixups: &SortedFixups,
) -> Result<Vec<u8>> {
    let mut header = Header::new(*layout, options.clone());
    header.contents_class_name_section_offset = fixups.virtuals.first().map_or(0, |f| f.dst);

    let base = HEADER_SIZE + header.num_sections as usize * options.section_header_size();
    let mut body = ByteWriter::new(layout);
    let sections = [
        emit_section(&mut body, base, CLASS_NAMES_TAG, class_names, None)?,
        emit_section(&mut body, base, TYPES_TAG, &[], None)?,
        emit_section(&mut body, base, DATA_TAG, data, Some(fixups))?,
    ];

    let mut out = ByteWriter::new(layout);
    header.write(&mut out);
    for section in &sections {
        section.write(&mut out, options.file_version);
    }
    out.write_bytes(body.as_slice());
    Ok(out.into_inner())
}

fn emit_section(
    body: &mut ByteWriter,
    base: usize,
    tag: &str,
    payload: &[u8],
    fixups: Option<&SortedFixups>,
) -> Result<SectionHeader> {
    let start = body.position();
    let relative = |body: &ByteWriter| to_offset(body.position() - start);

    let mut section = SectionHeader::new(tag);
    section.absolute_data_start = to_offset(base + start)?;
    body.write_bytes(payload);

    let empty = SortedFixups::default();
    let fixups = fixups.unwrap_or(&empty);
    section.local_fixups_offset = relative(body)?;
    write_local_fixups(body, &fixups.local);
    section.global_fixups_offset = relative(body)?;
    write_global_fixups(body, &fixups.global);
    section.virtual_fixups_offset = relative(body)?;
    write_virtual_fixups(body, &fixups.virtuals);

    let end = relative(body)?;
    section.exports_offset = end;
    section.imports_offset = end;
    section.end_offset = end;
    Ok(section)
}

fn to_offset(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| SerializeError::OffsetOverflow(value))
}
