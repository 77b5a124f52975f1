//! Hand-assembled containers for reader tests.

use crate::class_name::{BUILTIN_CLASSES, write_class_name};
use crate::codec::ByteWriter;
use crate::fixup::{
    GlobalFixup, LocalFixup, VirtualFixup, write_global_fixups, write_local_fixups,
    write_virtual_fixups,
};
use crate::header::{HEADER_SIZE, Header, HeaderOptions};
use crate::layout::Layout;
use crate::section::{SECTION_TAGS, SectionHeader, section_header_size};

pub struct Fixture {
    pub layout: Layout,
    pub options: HeaderOptions,
    pub classes: Vec<(&'static str, u32)>,
    pub data: Vec<u8>,
    pub locals: Vec<LocalFixup>,
    pub globals: Vec<GlobalFixup>,
    pub virtuals: Vec<VirtualFixup>,
}

impl Fixture {
    /// Two objects: `Root` at 0x00 points at `Leaf` at 0x20 and owns a
    /// two-element `u32` array at 0x10.
    ///
    /// Class-name offsets: `Root` = 0x4b, `Leaf` = 0x55.
    pub fn two_objects(layout: Layout) -> Self {
        let mut data = ByteWriter::new(&layout);
        data.write_null_pointer();
        data.write_array_header(2);
        data.pad(16);
        let array_at = data.position() as u32;
        data.write_u32(7);
        data.write_u32(9);
        data.pad(16);
        let leaf_at = data.position() as u32;
        data.write_u32(0xDEAD_BEEF);
        data.pad(16);

        let ptr = layout.pointer_size() as u32;
        Self {
            layout,
            options: HeaderOptions::default(),
            classes: vec![("Root", 1), ("Leaf", 2)],
            data: data.into_inner(),
            locals: vec![LocalFixup {
                src: ptr,
                dst: array_at,
            }],
            globals: vec![GlobalFixup::to_data(0, leaf_at)],
            virtuals: vec![
                VirtualFixup::to_class_name(0, 0x4b),
                VirtualFixup::to_class_name(leaf_at, 0x55),
            ],
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut names = ByteWriter::new(&self.layout);
        for &(name, sig) in BUILTIN_CLASSES.iter().chain(&self.classes) {
            write_class_name(&mut names, name, sig);
        }
        names.pad_with(16, 0xFF);

        let mut data = ByteWriter::new(&self.layout);
        data.write_bytes(&self.data);
        let payloads = [names, ByteWriter::new(&self.layout), data];

        let mut header = Header::new(self.layout, self.options.clone());
        header.contents_class_name_section_offset =
            self.virtuals.first().map(|f| f.dst).unwrap_or(0);

        let mut body = ByteWriter::new(&self.layout);
        let mut sections = Vec::new();
        let base = HEADER_SIZE + 3 * section_header_size(self.options.file_version);
        for (i, payload) in payloads.iter().enumerate() {
            let start = body.position();
            let mut section = SectionHeader::new(SECTION_TAGS[i]);
            section.absolute_data_start = (base + start) as u32;
            body.write_bytes(payload.as_slice());
            section.local_fixups_offset = (body.position() - start) as u32;
            if i == 2 {
                write_local_fixups(&mut body, &self.locals);
            }
            section.global_fixups_offset = (body.position() - start) as u32;
            if i == 2 {
                write_global_fixups(&mut body, &self.globals);
            }
            section.virtual_fixups_offset = (body.position() - start) as u32;
            if i == 2 {
                write_virtual_fixups(&mut body, &self.virtuals);
            }
            let end = (body.position() - start) as u32;
            section.exports_offset = end;
            section.imports_offset = end;
            section.end_offset = end;
            sections.push(section);
        }

        let mut out = ByteWriter::new(&self.layout);
        header.write(&mut out);
        for section in &sections {
            section.write(&mut out, self.options.file_version);
        }
        out.write_bytes(body.as_slice());
        out.into_inner()
    }
}
