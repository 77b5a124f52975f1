use packfile_core::{Handle, Vector4};
use packfile_format::{
    BUILTIN_CLASSES, DumpOptions, Endianness, HeaderOptions, Layout, PackFile, PaddingPolicy,
    PointerWidth, dump, verify,
};

use crate::class::{Class, ClassRegistry};
use crate::error::SerializeError;
use crate::graph::ObjectGraph;
use crate::test_classes::{Bag, Flag, Node, Point, Span, Triple, pack, registry};
use crate::write::Serializer;

const FIRST_CLASS: u32 = 0x4b;

fn locals(file: &PackFile) -> Vec<(u32, u32)> {
    let data = file.data().unwrap();
    data.local_fixups().iter().map(|f| (f.src, f.dst)).collect()
}

fn globals(file: &PackFile) -> Vec<(u32, u32)> {
    let data = file.data().unwrap();
    data.global_fixups().iter().map(|f| (f.src, f.dst)).collect()
}

fn virtuals(file: &PackFile) -> Vec<(u32, u32)> {
    let data = file.data().unwrap();
    data.virtual_fixups().iter().map(|f| (f.src, f.dst)).collect()
}

fn data(file: &PackFile) -> Vec<u8> {
    file.data().unwrap().data().to_vec()
}

fn serialize_err(
    graph: &ObjectGraph,
    registry: &ClassRegistry,
    root: Handle,
) -> SerializeError {
    Serializer::new(Layout::WIN32)
        .serialize(graph, registry, root)
        .unwrap_err()
}

/// Root `Bag` holding every deferred kind, shared children and a cycle.
fn mixed_graph() -> (ObjectGraph, Handle) {
    let mut graph = ObjectGraph::new();
    // The tail points back at `top`, added last.
    let tail = graph.add(Node {
        value: 3,
        next: Some(Handle::from_raw(6)),
    });
    let shared = graph.add(Node {
        value: 2,
        next: Some(tail),
    });
    let nested = graph.add(Bag {
        name: Some("nested".into()),
        values: vec![10, 20, 30],
        children: vec![Some(shared), None],
        ..Default::default()
    });
    let root = graph.add(Bag {
        name: Some("root".into()),
        values: vec![1],
        children: vec![Some(shared), Some(nested), None, Some(shared)],
        tags: vec![Some("a".into()), None, Some("".into()), Some("longer tag".into())],
        points: vec![
            Point {
                position: Vector4::new(1.0, 2.0, 3.0, 4.0),
                weight: 0.5,
                label: Some("p0".into()),
            },
            Point::default(),
        ],
    });
    let flag = graph.add(Flag {
        enabled: true,
        target: Some(root),
    });
    let pair = graph.add(Triple {
        first: Some(flag),
        second: Some(root),
        third: None,
    });
    let top = graph.add(Bag {
        children: vec![Some(pair), Some(root)],
        ..Default::default()
    });
    assert_eq!(top.as_u32(), 6);
    (graph, top)
}

#[test]
fn shared_object_written_once() {
    let mut graph = ObjectGraph::new();
    let a = graph.add(Node {
        value: 1,
        next: None,
    });
    let b = graph.add(Node {
        value: 2,
        next: Some(a),
    });
    let r = graph.add(Triple {
        first: None,
        second: Some(a),
        third: Some(b),
    });

    let file = pack(&graph, r, Layout::WIN32);

    // R at 0x00, A at 0x10, B at 0x20; Triple at 0x4b, Node at 0x57.
    assert_eq!(virtuals(&file), [(0x00, 0x4b), (0x10, 0x57), (0x20, 0x57)]);
    assert_eq!(globals(&file), [(0x04, 0x10), (0x08, 0x20), (0x24, 0x10)]);
    assert!(locals(&file).is_empty());
    assert_eq!(data(&file).len(), 0x30);

    let to_a = globals(&file).iter().filter(|&&(_, dst)| dst == 0x10).count();
    assert_eq!(to_a, 2);
}

#[test]
fn dump_shared_object() {
    let mut graph = ObjectGraph::new();
    let a = graph.add(Node {
        value: 1,
        next: None,
    });
    let b = graph.add(Node {
        value: 2,
        next: Some(a),
    });
    let r = graph.add(Triple {
        first: None,
        second: Some(a),
        third: Some(b),
    });

    let file = pack(&graph, r, Layout::WIN32);
    let out = dump(&file, DumpOptions { fixups: true }).unwrap();

    insta::assert_snapshot!(out, @r#"
    [header]
    file_version = 8
    user_tag = 0
    contents_version = "hk_2010.2.0-r1"
    layout = little-endian, 4-byte pointers
    contents = 2:0x0
    contents_class = 0:0x4b
    flags = 0x0
    predicates = -1 -1

    [sections]
    0 __classnames__ start=0xd0 size=0x60 local=0 global=0 virtual=0
    1 __types__      start=0x130 size=0x0 local=0 global=0 virtual=0
    2 __data__       start=0x130 size=0x30 local=0 global=3 virtual=3

    [classnames]
    0x0005 33d42383 hkClass
    0x0012 b0efa719 hkClassMember
    0x0025 8a3609cf hkClassEnum
    0x0036 ce6f8a6c hkClassEnumItem
    0x004b 54524950 Triple
    0x0057 4e4f4445 Node

    [objects]
    0x0000 Triple
    0x0010 Node
    0x0020 Node

    [fixups.local]

    [fixups.global]
    0x0004 -> 2:0x0010
    0x0008 -> 2:0x0020
    0x0024 -> 2:0x0010

    [fixups.virtual]
    0x0000 -> 0:0x004b  ; Triple
    0x0010 -> 0:0x0057  ; Node
    0x0020 -> 0:0x0057  ; Node
    "#);
}

#[test]
fn cycle_resolves_both_ways() {
    let mut graph = ObjectGraph::new();
    let a = graph.add(Node {
        value: 1,
        next: Some(Handle::from_raw(1)),
    });
    let _b = graph.add(Node {
        value: 2,
        next: Some(a),
    });

    let file = pack(&graph, a, Layout::WIN32);

    assert_eq!(virtuals(&file), [(0x00, FIRST_CLASS), (0x10, FIRST_CLASS)]);
    assert_eq!(globals(&file), [(0x04, 0x10), (0x14, 0x00)]);
}

#[test]
fn self_reference() {
    let mut graph = ObjectGraph::new();
    let node = graph.add(Node {
        value: 7,
        next: Some(Handle::from_raw(0)),
    });

    let file = pack(&graph, node, Layout::WIN32);

    assert_eq!(globals(&file), [(0x04, 0x00)]);
    assert_eq!(virtuals(&file).len(), 1);
}

#[test]
fn array_of_objects_with_empty_arrays() {
    let mut graph = ObjectGraph::new();
    let children: Vec<_> = (0..3).map(|_| Some(graph.add(Bag::default()))).collect();
    let root = graph.add(Bag {
        children,
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);

    // Bag is 0x34 bytes, padded to 0x40. The pointer payload sits at 0x40
    // and the children follow at 0x50, 0x90, 0xd0.
    assert_eq!(locals(&file), [(0x10, 0x40)]);
    assert_eq!(globals(&file), [(0x40, 0x50), (0x44, 0x90), (0x48, 0xd0)]);
    assert_eq!(
        virtuals(&file),
        [
            (0x00, FIRST_CLASS),
            (0x50, FIRST_CLASS),
            (0x90, FIRST_CLASS),
            (0xd0, FIRST_CLASS),
        ]
    );
    assert_eq!(data(&file).len(), 0x110);
}

#[test]
fn null_and_empty_fields() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag::default());

    let file = pack(&graph, root, Layout::WIN32);
    let bytes = data(&file);

    let mut expected = vec![0u8; 0x40];
    for flags in [0x0c, 0x18, 0x24, 0x30] {
        expected[flags + 3] = 0x80;
    }
    assert_eq!(bytes, expected);
    assert!(locals(&file).is_empty());
    assert!(globals(&file).is_empty());
    assert_eq!(virtuals(&file), [(0x00, FIRST_CLASS)]);
}

#[test]
fn empty_string_still_has_payload() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        name: Some(String::new()),
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);

    assert_eq!(locals(&file), [(0x00, 0x40)]);
    let bytes = data(&file);
    assert_eq!(bytes.len(), 0x50);
    assert_eq!(bytes[0x40], 0);
}

#[test]
fn string_field_payload() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        name: Some("hi".into()),
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);
    let bytes = data(&file);

    assert_eq!(locals(&file), [(0x00, 0x40)]);
    assert_eq!(&bytes[0x40..0x43], b"hi\0");
    assert_eq!(bytes.len(), 0x50);
}

#[test]
fn string_array_elements_are_two_aligned() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        tags: vec![Some("a".into()), None, Some("bc".into())],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);
    let bytes = data(&file);

    // Element pointers at 0x40..0x4c, then "a" at 0x4c and "bc" at 0x4e.
    assert_eq!(locals(&file), [(0x1c, 0x40), (0x40, 0x4c), (0x48, 0x4e)]);
    assert_eq!(&bytes[0x4c..0x4e], b"a\0");
    assert_eq!(&bytes[0x4e..0x51], b"bc\0");
    assert_eq!(&bytes[0x44..0x48], [0; 4]);
    assert_eq!(bytes.len(), 0x60);
}

#[test]
fn primitive_array_payload() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        values: vec![1, 2],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);
    let bytes = data(&file);

    assert_eq!(locals(&file), [(0x04, 0x40)]);
    assert_eq!(&bytes[0x08..0x0c], 2u32.to_le_bytes());
    assert_eq!(&bytes[0x0c..0x10], 0x8000_0002u32.to_le_bytes());
    assert_eq!(&bytes[0x40..0x48], [1, 0, 0, 0, 2, 0, 0, 0]);
    assert_eq!(bytes.len(), 0x50);
}

#[test]
fn local_fixups_sorted_by_destination() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        tags: vec![Some("a".into())],
        points: vec![Point {
            label: Some("p".into()),
            ..Default::default()
        }],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);

    // Emitted as 0x1c, 0x28, 0x40, 0x64; the tag string lands before the
    // point array.
    assert_eq!(
        locals(&file),
        [(0x1c, 0x40), (0x40, 0x44), (0x28, 0x50), (0x64, 0x68)]
    );
    assert_eq!(data(&file).len(), 0x70);
}

#[test]
fn inline_elements_have_no_identity() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        points: vec![Point::default(), Point::default()],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);

    assert_eq!(virtuals(&file).len(), 1);
    let names: Vec<_> = file
        .class_names()
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert!(!names.iter().any(|name| name == Point::NAME));
    // Two 0x18-byte elements from 0x40, then the trailing pad.
    assert_eq!(data(&file).len(), 0x70);
}

#[test]
fn class_names_deduplicated() {
    let mut graph = ObjectGraph::new();
    let second = graph.add(Node {
        value: 2,
        next: None,
    });
    let first = graph.add(Node {
        value: 1,
        next: Some(second),
    });
    let root = graph.add(Bag {
        children: vec![Some(first), Some(second)],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN32);

    let names: Vec<_> = file
        .class_names()
        .unwrap()
        .into_iter()
        .skip(BUILTIN_CLASSES.len())
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["Bag", "Node"]);

    let fixups = virtuals(&file);
    assert_eq!(fixups.len(), 3);
    assert_eq!(fixups[1].1, fixups[2].1);
    assert_ne!(fixups[0].1, fixups[1].1);
}

#[test]
fn header_points_at_root() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag::default());

    let file = pack(&graph, root, Layout::WIN32);

    let header = file.header();
    assert_eq!(header.contents_section_offset, 0);
    assert_eq!(header.contents_class_name_section_offset, FIRST_CLASS);
    assert_eq!(header.options, HeaderOptions::default());
    let starts: Vec<_> = file
        .sections()
        .map(|s| s.header().absolute_data_start)
        .collect();
    assert_eq!(starts[0], 0xd0);
}

#[test]
fn header_options_carried() {
    let options = HeaderOptions {
        file_version: 11,
        user_tag: 42,
        contents_version: "hk_2014.1.0-r1".into(),
        ..Default::default()
    };
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag::default());

    let bytes = Serializer::new(Layout::WIN32)
        .with_options(options.clone())
        .serialize(&graph, &registry(), root)
        .unwrap();
    let file = PackFile::parse(bytes).unwrap();

    assert_eq!(file.header().options, options);
    assert!(verify(&file).unwrap().is_empty());
}

#[test]
fn big_endian_layout() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        values: vec![1, 2],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::XBOX360);
    let bytes = data(&file);

    assert_eq!(locals(&file), [(0x04, 0x40)]);
    assert_eq!(&bytes[0x08..0x0c], [0, 0, 0, 2]);
    assert_eq!(&bytes[0x0c..0x10], [0x80, 0, 0, 2]);
    assert_eq!(&bytes[0x40..0x48], [0, 0, 0, 1, 0, 0, 0, 2]);
}

#[test]
fn wide_pointer_layout() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag {
        values: vec![1, 2],
        ..Default::default()
    });

    let file = pack(&graph, root, Layout::WIN64);
    let bytes = data(&file);

    // Bag is 0x48 bytes with 8-byte pointers.
    assert_eq!(locals(&file), [(0x08, 0x50)]);
    assert_eq!(&bytes[0x08..0x10], [0; 8]);
    assert_eq!(&bytes[0x10..0x14], 2u32.to_le_bytes());
    assert_eq!(&bytes[0x14..0x18], 0x8000_0002u32.to_le_bytes());
    assert_eq!(bytes.len(), 0x60);
}

#[test]
fn pointers_padded_when_layout_requires() {
    let mut graph = ObjectGraph::new();
    let flag = graph.add(Flag {
        enabled: true,
        target: Some(Handle::from_raw(0)),
    });
    let padded_wide = Layout::new(
        Endianness::Little,
        PointerWidth::Eight,
        PaddingPolicy::PadToPointerWidth,
    );

    let cases = [
        (Layout::WIN32, 1),
        (Layout::WIN64, 1),
        (Layout::PS3, 4),
        (padded_wide, 8),
    ];
    for (layout, src) in cases {
        let file = pack(&graph, flag, layout);
        assert_eq!(globals(&file), [(src, 0)], "{layout:?}");
        assert_eq!(data(&file)[0], 1);
    }
}

#[test]
fn pointer_width_overflow() {
    let mut graph = ObjectGraph::new();
    let span = graph.add(Span { length: 1 << 32 });

    let err = serialize_err(&graph, &registry(), span);
    assert!(matches!(
        err,
        SerializeError::PointerWidthMismatch {
            value: 0x1_0000_0000,
            width: 4
        }
    ));

    let file = pack(&graph, span, Layout::WIN64);
    assert_eq!(&data(&file)[..8], (1u64 << 32).to_le_bytes());
}

#[test]
fn unregistered_class() {
    let mut graph = ObjectGraph::new();
    let root = graph.add(Bag::default());
    let registry = ClassRegistry::new().with::<Node>();

    let err = serialize_err(&graph, &registry, root);
    assert!(matches!(err, SerializeError::UnregisteredClass("Bag")));
    assert_eq!(err.to_string(), r#"class "Bag" is not registered"#);
}

#[test]
fn unregistered_class_below_root() {
    let mut graph = ObjectGraph::new();
    let bag = graph.add(Bag::default());
    let root = graph.add(Node {
        value: 0,
        next: Some(bag),
    });
    let registry = ClassRegistry::new().with::<Node>();

    let err = serialize_err(&graph, &registry, root);
    assert!(matches!(err, SerializeError::UnregisteredClass("Bag")));
}

#[test]
fn dangling_handles() {
    let mut graph = ObjectGraph::new();
    let err = serialize_err(&graph, &registry(), Handle::from_raw(5));
    assert!(matches!(err, SerializeError::DanglingHandle(h) if h.as_u32() == 5));

    let root = graph.add(Node {
        value: 0,
        next: Some(Handle::from_raw(7)),
    });
    let err = serialize_err(&graph, &registry(), root);
    assert!(matches!(err, SerializeError::DanglingHandle(h) if h.as_u32() == 7));
}

#[test]
fn output_is_deterministic() {
    let (graph, root) = mixed_graph();
    let serializer = Serializer::new(Layout::WIN32);

    let first = serializer.serialize(&graph, &registry(), root).unwrap();
    let second = serializer.serialize(&graph, &registry(), root).unwrap();

    assert_eq!(first, second);
}

#[test]
fn outputs_pass_verification() {
    let (graph, root) = mixed_graph();

    for (name, layout) in Layout::PRESETS {
        let file = pack(&graph, root, layout);

        assert!(verify(&file).unwrap().is_empty(), "{name}");
        assert_eq!(virtuals(&file).len(), 7, "{name}");
        for (src, _) in virtuals(&file) {
            assert_eq!(src % 16, 0, "{name}: object at {src:#x}");
        }
        let local = locals(&file);
        assert!(local.windows(2).all(|w| w[0].1 <= w[1].1), "{name}");
        let global = globals(&file);
        assert!(global.windows(2).all(|w| w[0].0 <= w[1].0), "{name}");
    }
}
