//! Human-readable container dump.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::Result;
use crate::layout::{Endianness, Layout, PaddingPolicy};
use crate::packfile::PackFile;

/// What to include beyond header, sections, class names and objects.
#[derive(Clone, Copy, Debug, Default)]
pub struct DumpOptions {
    pub fixups: bool,
}

/// Render a parsed container as text.
pub fn dump(file: &PackFile, options: DumpOptions) -> Result<String> {
    let mut out = String::new();
    let class_names = file.class_names()?;
    let names: HashMap<u32, &str> = class_names
        .iter()
        .map(|e| (e.offset, e.name.as_str()))
        .collect();

    dump_header(&mut out, file);
    dump_sections(&mut out, file);

    writeln!(out, "[classnames]").unwrap();
    for entry in &class_names {
        writeln!(out, "{:#06x} {:08x} {}", entry.offset, entry.signature, entry.name).unwrap();
    }
    out.push('\n');

    let data = file.data()?;
    let virtuals = data.virtual_fixups();
    writeln!(out, "[objects]").unwrap();
    for f in &virtuals {
        let name = names.get(&f.dst).copied().unwrap_or("<unknown>");
        writeln!(out, "{:#06x} {name}", f.src).unwrap();
    }

    if options.fixups {
        out.push('\n');
        writeln!(out, "[fixups.local]").unwrap();
        for f in data.local_fixups() {
            writeln!(out, "{:#06x} -> {:#06x}", f.src, f.dst).unwrap();
        }
        out.push('\n');
        writeln!(out, "[fixups.global]").unwrap();
        for f in data.global_fixups() {
            writeln!(out, "{:#06x} -> {}:{:#06x}", f.src, f.dst_section, f.dst).unwrap();
        }
        out.push('\n');
        writeln!(out, "[fixups.virtual]").unwrap();
        for f in &virtuals {
            let name = names.get(&f.dst).copied().unwrap_or("<unknown>");
            writeln!(
                out,
                "{:#06x} -> {}:{:#06x}  ; {name}",
                f.src, f.dst_section, f.dst
            )
            .unwrap();
        }
    }

    Ok(out)
}

fn dump_header(out: &mut String, file: &PackFile) {
    let header = file.header();
    let options = &header.options;
    writeln!(out, "[header]").unwrap();
    writeln!(out, "file_version = {}", options.file_version).unwrap();
    writeln!(out, "user_tag = {}", options.user_tag).unwrap();
    writeln!(out, "contents_version = {:?}", options.contents_version).unwrap();
    writeln!(out, "layout = {}", describe_layout(&header.layout)).unwrap();
    writeln!(
        out,
        "contents = {}:{:#x}",
        header.contents_section_index, header.contents_section_offset
    )
    .unwrap();
    writeln!(
        out,
        "contents_class = {}:{:#x}",
        header.contents_class_name_section_index, header.contents_class_name_section_offset
    )
    .unwrap();
    writeln!(out, "flags = {:#x}", options.flags).unwrap();
    writeln!(
        out,
        "predicates = {} {}",
        options.max_predicate, options.predicate_array_size_plus_padding
    )
    .unwrap();
    out.push('\n');
}

fn dump_sections(out: &mut String, file: &PackFile) {
    writeln!(out, "[sections]").unwrap();
    for section in file.sections() {
        let h = section.header();
        writeln!(
            out,
            "{} {:<14} start={:#x} size={:#x} local={} global={} virtual={}",
            section.index(),
            section.tag(),
            h.absolute_data_start,
            h.local_fixups_offset,
            section.local_fixups().len(),
            section.global_fixups().len(),
            section.virtual_fixups().len(),
        )
        .unwrap();
    }
    out.push('\n');
}

/// One-line summary of a layout, e.g. `little-endian, 4-byte pointers`.
pub fn describe_layout(layout: &Layout) -> String {
    let order = match layout.endianness {
        Endianness::Big => "big-endian",
        Endianness::Little => "little-endian",
    };
    let mut text = format!("{order}, {}-byte pointers", layout.pointer_size());
    if layout.padding_policy == PaddingPolicy::PadToPointerWidth {
        text.push_str(", padded");
    }
    if !layout.empty_base_class {
        text.push_str(", no empty base");
    }
    text
}
