use crate::test_utils::Fixture;
use crate::{
    DATA_TAG, FormatError, GlobalFixup, HeaderOptions, Layout, LocalFixup, PackFile, SECTION_TAGS,
};

#[test]
fn parse_sections() {
    let file = PackFile::parse(Fixture::two_objects(Layout::WIN32).build()).unwrap();

    let tags: Vec<&str> = file.sections().map(|s| s.tag()).collect();
    assert_eq!(tags, SECTION_TAGS);

    let class_names = file.section_by_index(0).unwrap();
    assert_eq!(class_names.header().absolute_data_start, 0xD0);
    assert_eq!(class_names.data().len(), 0x60);
    assert!(class_names.local_fixups().is_empty());

    let types = file.section("__types__").unwrap();
    assert!(types.data().is_empty());

    let data = file.data().unwrap();
    assert_eq!(data.index(), 2);
    assert_eq!(data.header().absolute_data_start, 0x130);
    assert_eq!(data.data().len(), 0x30);
}

#[test]
fn parse_fixup_tables() {
    let file = PackFile::parse(Fixture::two_objects(Layout::WIN32).build()).unwrap();
    let data = file.data().unwrap();

    assert_eq!(data.local_fixups(), [LocalFixup { src: 4, dst: 0x10 }]);
    assert_eq!(data.global_fixups(), [GlobalFixup::to_data(0, 0x20)]);
    let virtuals = data.virtual_fixups();
    assert_eq!(virtuals.len(), 2);
    assert_eq!(virtuals[1].src, 0x20);
    assert_eq!(virtuals[1].dst, 0x55);

    let h = data.header();
    assert_eq!(h.local_fixups_offset, 0x30);
    assert_eq!(h.global_fixups_offset, 0x40);
    assert_eq!(h.virtual_fixups_offset, 0x50);
    assert_eq!(h.end_offset, 0x70);
    assert_eq!(h.exports_offset, h.end_offset);
    assert_eq!(h.imports_offset, h.end_offset);
}

#[test]
fn class_names_include_builtins() {
    let file = PackFile::parse(Fixture::two_objects(Layout::XBOX360).build()).unwrap();
    let names: Vec<String> = file.class_names().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        [
            "hkClass",
            "hkClassMember",
            "hkClassEnum",
            "hkClassEnumItem",
            "Root",
            "Leaf"
        ]
    );
}

#[test]
fn wide_pointers_shift_payload() {
    let file = PackFile::parse(Fixture::two_objects(Layout::WIN64).build()).unwrap();
    let data = file.data().unwrap();
    assert_eq!(data.local_fixups(), [LocalFixup { src: 8, dst: 0x20 }]);

    let mut r = data.reader();
    r.seek(8);
    r.skip(8).unwrap();
    assert_eq!(r.read_u32().unwrap(), 2);
    assert_eq!(r.read_u32().unwrap(), 0x8000_0002);
}

#[test]
fn version_11_section_headers() {
    let mut fixture = Fixture::two_objects(Layout::WIN32);
    fixture.options = HeaderOptions {
        file_version: 11,
        ..HeaderOptions::default()
    };
    let file = PackFile::parse(fixture.build()).unwrap();
    assert_eq!(file.header().options.file_version, 11);
    assert_eq!(file.data().unwrap().header().absolute_data_start, 0x100 + 0x60);
}

#[test]
fn rejects_truncated_file() {
    let mut bytes = Fixture::two_objects(Layout::WIN32).build();
    bytes.truncate(bytes.len() - 16);
    let err = PackFile::parse(bytes).unwrap_err();
    assert!(matches!(err, FormatError::SectionOutOfBounds { ref tag, .. } if tag == DATA_TAG));
}

#[test]
fn missing_data_section() {
    let mut bytes = Fixture::two_objects(Layout::WIN32).build();
    // Rename the third section header's tag.
    let tag_at = 64 + 2 * 48;
    bytes[tag_at..tag_at + 8].copy_from_slice(b"__junk__");
    let file = PackFile::parse(bytes).unwrap();
    assert!(matches!(file.data(), Err(FormatError::MissingSection("__data__"))));
}

#[test]
fn rejects_section_count_past_end_of_file() {
    let mut bytes = Fixture::two_objects(Layout::WIN32).build();
    let len = bytes.len();
    bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());

    let err = PackFile::parse(bytes).unwrap_err();
    assert!(matches!(
        err,
        FormatError::BadSectionCount { count: u32::MAX, len: l } if l == len
    ));
}

#[test]
fn rejects_section_table_in_header_only_file() {
    let mut bytes = Fixture::two_objects(Layout::WIN32).build();
    bytes.truncate(64);

    let err = PackFile::parse(bytes).unwrap_err();
    assert!(matches!(err, FormatError::BadSectionCount { count: 3, len: 64 }));
}
