//! Per-run deserialization state and the field readers decoders call.

use std::collections::{HashMap, VecDeque};

use packfile_core::{
    Handle, Matrix3, Matrix4, QsTransform, Quaternion, Transform, Vector2, Vector3, Vector4,
};
use packfile_format::{ByteReader, Layout, PaddingPolicy, Primitive, SectionView};

use crate::class::Class;
use crate::error::DecodeError;
use crate::graph::ObjectGraph;

type Result<T> = std::result::Result<T, DecodeError>;

/// Cursor over the data section plus the fixup maps needed to follow
/// pointers, arrays and strings.
///
/// Pointers are never followed recursively: the first pointer to an offset
/// reserves a handle and queues the object, which is decoded once the current
/// one is done. Cycles therefore need no special handling.
pub struct ReadContext<'f> {
    reader: ByteReader<'f>,
    len: usize,
    layout: Layout,
    locals: HashMap<u32, u32>,
    globals: HashMap<u32, u32>,
    handles: HashMap<u32, Handle>,
    pub(super) graph: ObjectGraph,
    pub(super) queue: VecDeque<(Handle, u32)>,
}

macro_rules! forward {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                Ok(self.reader.$name()?)
            }
        )*
    };
}

impl<'f> ReadContext<'f> {
    pub(super) fn new(data: &SectionView<'f>, layout: Layout) -> Self {
        Self {
            reader: data.reader(),
            len: data.data().len(),
            layout,
            locals: data.local_fixups().iter().map(|f| (f.src, f.dst)).collect(),
            globals: data.global_fixups().iter().map(|f| (f.src, f.dst)).collect(),
            handles: HashMap::new(),
            graph: ObjectGraph::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Current offset in the data section.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    forward! {
        read_u8: u8,
        read_i8: i8,
        read_bool: bool,
        read_u16: u16,
        read_i16: i16,
        read_u32: u32,
        read_i32: i32,
        read_u64: u64,
        read_i64: i64,
        read_f32: f32,
        read_usize: u64,
        read_vector2: Vector2,
        read_vector3: Vector3,
        read_vector4: Vector4,
        read_quaternion: Quaternion,
        read_matrix3: Matrix3,
        read_matrix4: Matrix4,
        read_transform: Transform,
        read_qs_transform: QsTransform,
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'f [u8]> {
        Ok(self.reader.read_bytes(len)?)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        Ok(self.reader.skip(len)?)
    }

    /// Advance to the next multiple of `align`.
    pub fn pad(&mut self, align: usize) {
        self.reader.align(align);
    }

    pub fn read_void_pointer(&mut self) -> Result<()> {
        self.pad_pointer();
        self.skip(self.layout.pointer_size())
    }

    pub fn read_void_array(&mut self) -> Result<()> {
        self.pad_pointer();
        self.reader.read_array_header()?;
        Ok(())
    }

    /// Pointer to another object; `None` when the slot has no global fixup.
    pub fn read_class_pointer(&mut self) -> Result<Option<Handle>> {
        self.pad_pointer();
        let src = self.here();
        self.skip(self.layout.pointer_size())?;
        let dst = self.globals.get(&src).copied();
        Ok(dst.map(|dst| self.handle_for(dst)))
    }

    pub fn read_class_pointer_array(&mut self) -> Result<Vec<Option<Handle>>> {
        self.read_array(Self::read_class_pointer)
    }

    /// Array of objects stored by value.
    pub fn read_class_array<T: Class>(&mut self) -> Result<Vec<T>> {
        self.read_array(T::read)
    }

    /// String field; `None` when the slot has no local fixup.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        self.pad_pointer();
        let src = self.here();
        self.skip(self.layout.pointer_size())?;
        let Some(&dst) = self.locals.get(&src) else {
            return Ok(None);
        };
        self.at(dst, |ctx| Ok(ctx.reader.read_cstr()?)).map(Some)
    }

    pub fn read_string_array(&mut self) -> Result<Vec<Option<String>>> {
        self.read_array(Self::read_string)
    }

    pub fn read_primitive_array<P: Primitive>(&mut self) -> Result<Vec<P>> {
        self.read_array(|ctx| Ok(ctx.reader.read::<P>()?))
    }

    /// Read an array header, then its elements at the local fixup's target.
    pub fn read_array<T>(
        &mut self,
        mut element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.pad_pointer();
        let src = self.here();
        let count = self.reader.read_array_header()?;
        if count == 0 {
            return Ok(Vec::new());
        }
        let &dst = self
            .locals
            .get(&src)
            .ok_or(DecodeError::MissingLocalFixup(src))?;
        self.at(dst, |ctx| {
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(element(ctx)?);
            }
            Ok(items)
        })
    }

    /// Run `f` with the cursor at `offset`, then restore it.
    fn at<T>(&mut self, offset: u32, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let resume = self.reader.position();
        self.seek(offset)?;
        let value = f(self);
        self.reader.seek(resume);
        value
    }

    pub(super) fn seek(&mut self, offset: u32) -> Result<()> {
        if offset as usize > self.len {
            return Err(DecodeError::OutOfRange {
                offset,
                len: self.len,
            });
        }
        self.reader.seek(offset as usize);
        Ok(())
    }

    /// Handle of the object at `offset`, queueing it on first sight.
    pub(super) fn handle_for(&mut self, offset: u32) -> Handle {
        if let Some(&handle) = self.handles.get(&offset) {
            return handle;
        }
        let handle = self.graph.reserve();
        self.handles.insert(offset, handle);
        self.queue.push_back((handle, offset));
        handle
    }

    fn pad_pointer(&mut self) {
        if self.layout.padding_policy == PaddingPolicy::PadToPointerWidth {
            self.reader.align(self.layout.pointer_size());
        }
    }

    fn here(&self) -> u32 {
        self.reader.position() as u32
    }
}
