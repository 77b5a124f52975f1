//! Object types and helpers shared by the serializer tests.

use std::collections::HashMap;

use packfile_core::{Handle, QsTransform, Vector4};
use packfile_format::{Layout, PackFile};

use crate::class::{Class, ClassRegistry, Encodable};
use crate::error::{DecodeError, Result};
use crate::graph::ObjectGraph;
use crate::read::ReadContext;
use crate::write::{Serializer, WriteContext};

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Singly linked: a value and one pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub value: u32,
    pub next: Option<Handle>,
}

/// Three pointer fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triple {
    pub first: Option<Handle>,
    pub second: Option<Handle>,
    pub third: Option<Handle>,
}

/// One field of every deferred kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bag {
    pub name: Option<String>,
    pub values: Vec<u32>,
    pub children: Vec<Option<Handle>>,
    pub tags: Vec<Option<String>>,
    pub points: Vec<Point>,
}

/// Stored by value inside [`Bag::points`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub position: Vector4,
    pub weight: f32,
    pub label: Option<String>,
}

/// A byte-sized field followed by a pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flag {
    pub enabled: bool,
    pub target: Option<Handle>,
}

/// A pointer-width integer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Span {
    pub length: u64,
}

/// Fixed-layout math values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pose {
    pub transform: QsTransform,
    pub offsets: Vec<Vector4>,
}

macro_rules! impl_class {
    ($ty:ty, $name:literal, $sig:literal) => {
        impl Class for $ty {
            const NAME: &'static str = $name;
            const SIGNATURE: u32 = $sig;

            fn read(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
                <$ty>::decode(ctx)
            }
        }
    };
}

impl_class!(Node, "Node", 0x4E4F_4445);
impl_class!(Triple, "Triple", 0x5452_4950);
impl_class!(Bag, "Bag", 0x4241_4700);
impl_class!(Point, "Point", 0x504F_494E);
impl_class!(Flag, "Flag", 0x464C_4147);
impl_class!(Span, "Span", 0x5350_414E);
impl_class!(Pose, "Pose", 0x504F_5345);

impl Encodable for Node {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_u32(self.value);
        ctx.write_class_pointer(self.next)
    }
}

impl Node {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            value: ctx.read_u32()?,
            next: ctx.read_class_pointer()?,
        })
    }
}

impl Encodable for Triple {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_class_pointer(self.first)?;
        ctx.write_class_pointer(self.second)?;
        ctx.write_class_pointer(self.third)
    }
}

impl Triple {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            first: ctx.read_class_pointer()?,
            second: ctx.read_class_pointer()?,
            third: ctx.read_class_pointer()?,
        })
    }
}

impl Encodable for Bag {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_string(self.name.as_deref())?;
        ctx.write_primitive_array(&self.values)?;
        ctx.write_class_pointer_array(&self.children)?;
        ctx.write_string_array(&self.tags)?;
        ctx.write_class_array(&self.points)
    }
}

impl Bag {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            name: ctx.read_string()?,
            values: ctx.read_primitive_array()?,
            children: ctx.read_class_pointer_array()?,
            tags: ctx.read_string_array()?,
            points: ctx.read_class_array()?,
        })
    }
}

impl Encodable for Point {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_vector4(self.position);
        ctx.write_f32(self.weight);
        ctx.write_string(self.label.as_deref())
    }
}

impl Point {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            position: ctx.read_vector4()?,
            weight: ctx.read_f32()?,
            label: ctx.read_string()?,
        })
    }
}

impl Encodable for Flag {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_bool(self.enabled);
        ctx.write_class_pointer(self.target)
    }
}

impl Flag {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            enabled: ctx.read_bool()?,
            target: ctx.read_class_pointer()?,
        })
    }
}

impl Encodable for Span {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_usize(self.length)
    }
}

impl Span {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            length: ctx.read_usize()?,
        })
    }
}

impl Encodable for Pose {
    fn class_name(&self) -> &'static str {
        Self::NAME
    }

    fn signature(&self) -> u32 {
        Self::SIGNATURE
    }

    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()> {
        ctx.write_qs_transform(self.transform);
        ctx.write_primitive_array(&self.offsets)
    }
}

impl Pose {
    fn decode(ctx: &mut ReadContext<'_>) -> DecodeResult<Self> {
        Ok(Self {
            transform: ctx.read_qs_transform()?,
            offsets: ctx.read_primitive_array()?,
        })
    }
}

/// Every pointer-holding class; [`Point`] is only ever stored inline.
pub fn registry() -> ClassRegistry {
    ClassRegistry::new()
        .with::<Node>()
        .with::<Triple>()
        .with::<Bag>()
        .with::<Flag>()
        .with::<Span>()
        .with::<Pose>()
}

pub fn pack(graph: &ObjectGraph, root: Handle, layout: Layout) -> PackFile {
    let bytes = Serializer::new(layout)
        .serialize(graph, &registry(), root)
        .unwrap();
    PackFile::parse(bytes).unwrap()
}

/// Object value with handles removed, plus its outgoing handles in field order.
fn split(graph: &ObjectGraph, handle: Handle) -> (String, Vec<Option<Handle>>) {
    if let Some(node) = graph.downcast::<Node>(handle) {
        let stripped = Node {
            next: None,
            ..node.clone()
        };
        return (format!("{stripped:?}"), vec![node.next]);
    }
    if let Some(triple) = graph.downcast::<Triple>(handle) {
        return (
            "Triple".to_owned(),
            vec![triple.first, triple.second, triple.third],
        );
    }
    if let Some(bag) = graph.downcast::<Bag>(handle) {
        let stripped = Bag {
            children: Vec::new(),
            ..bag.clone()
        };
        return (format!("{stripped:?}"), bag.children.clone());
    }
    if let Some(flag) = graph.downcast::<Flag>(handle) {
        return (format!("Flag {}", flag.enabled), vec![flag.target]);
    }
    if let Some(span) = graph.downcast::<Span>(handle) {
        return (format!("{span:?}"), Vec::new());
    }
    if let Some(pose) = graph.downcast::<Pose>(handle) {
        return (format!("{pose:?}"), Vec::new());
    }
    panic!("unknown object at {handle}");
}

/// Assert both graphs have the same shape and values from their roots.
pub fn assert_same_graph(
    left: &ObjectGraph,
    left_root: Handle,
    right: &ObjectGraph,
    right_root: Handle,
) {
    let mut seen: HashMap<Handle, Handle> = HashMap::new();
    let mut work = vec![(left_root, right_root)];
    while let Some((l, r)) = work.pop() {
        if let Some(&mapped) = seen.get(&l) {
            assert_eq!(mapped, r, "{l} maps to two objects");
            continue;
        }
        seen.insert(l, r);

        let (left_value, left_edges) = split(left, l);
        let (right_value, right_edges) = split(right, r);
        assert_eq!(left_value, right_value);
        assert_eq!(left_edges.len(), right_edges.len());
        for (a, b) in left_edges.into_iter().zip(right_edges) {
            match (a, b) {
                (Some(a), Some(b)) => work.push((a, b)),
                (None, None) => {}
                _ => panic!("pointer nullness differs below {l}"),
            }
        }
    }
}
